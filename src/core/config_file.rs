//! Persisted configuration document formats and migration.
//!
//! The repository stores one JSON document in one of two incompatible shapes:
//!
//! - **Legacy (v1)**: flat settings with `paths`, `settings` and `commits` groups
//! - **Workspace (v2)**: shared settings, commit messages and a `collections` list
//!
//! A document is treated as v2 only when it carries a non-empty `collections`
//! array. The `version` field is not consulted, so a hand-edited file with
//! `"version": 2` and no collections is read as legacy.
//!
//! Writing always reflects the in-memory model: a workspace with collections is
//! written as v2, a workspace without collections as v1.

use crate::core::error::{GitCmsError, Result};
use crate::core::schema::{validate, validate_all, Field, Settings, SettingsPatch};
use crate::core::workspace::{Collection, CollectionLayout, Workspace};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const LEGACY_VERSION: u32 = 1;
pub const WORKSPACE_VERSION: u32 = 2;
pub const DEFAULT_COLLECTION_NAME: &str = "Posts";

/// Key of a commit template inside `commits` / `commitMessages`
fn commit_key(field: Field) -> Option<&'static str> {
    match field {
        Field::CommitNewPost => Some("newPost"),
        Field::CommitUpdatePost => Some("updatePost"),
        Field::CommitDeletePost => Some("deletePost"),
        Field::CommitUploadImage => Some("uploadImage"),
        _ => None,
    }
}

/// A collection path is either unset (empty) or a valid repository path
fn collection_path_ok(field: Field, path: &str) -> bool {
    path.is_empty() || validate(field, &Value::from(path))
}

fn commit_messages_to_patch(messages: &Map<String, Value>, patch: &mut SettingsPatch) {
    for field in Field::COMMIT_TEMPLATES {
        if let Some(value) = commit_key(field).and_then(|key| messages.get(key)) {
            patch.insert(field, value.clone());
        }
    }
}

fn commit_messages_from_settings(settings: &Settings) -> Map<String, Value> {
    Field::COMMIT_TEMPLATES
        .iter()
        .filter_map(|field| commit_key(*field).map(|key| (key.to_string(), settings.get(*field))))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyPaths {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyTemplates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyUi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<BTreeMap<String, u32>>,
}

/// Flat v1 document. Every value is kept raw so fields can be validated one by one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<Value>,
    pub paths: LegacyPaths,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_url: Option<Value>,
    pub settings: Map<String, Value>,
    pub commits: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<LegacyTemplates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<LegacyUi>,
}

impl LegacyConfig {
    pub fn from_settings(settings: &Settings, layout: &CollectionLayout) -> Self {
        let mut media = Map::new();
        for field in [
            Field::PostFileTypes,
            Field::ImageFileTypes,
            Field::OptimizeImages,
            Field::ImageQuality,
            Field::MaxImageWidth,
        ] {
            media.insert(field.key().to_string(), settings.get(field));
        }

        let ui = (layout.table_columns.is_some() || layout.column_widths.is_some()).then(|| {
            LegacyUi {
                table_columns: layout.table_columns.clone(),
                column_widths: layout.column_widths.clone(),
            }
        });

        Self {
            version: Some(Value::from(LEGACY_VERSION)),
            project_type: Some(settings.get(Field::ProjectType)),
            paths: LegacyPaths {
                posts: Some(settings.get(Field::PostsPath)),
                images: Some(settings.get(Field::ImagesPath)),
            },
            domain_url: Some(settings.get(Field::DomainUrl)),
            settings: media,
            commits: commit_messages_from_settings(settings),
            templates: layout.template.clone().map(|frontmatter| LegacyTemplates {
                frontmatter: Some(frontmatter),
            }),
            ui,
        }
    }

    /// Every settings value the document carries, valid or not
    pub fn to_patch(&self) -> SettingsPatch {
        let mut patch = SettingsPatch::from_json_object(&self.settings);
        if let Some(project_type) = &self.project_type {
            patch.insert(Field::ProjectType, project_type.clone());
        }
        if let Some(posts) = &self.paths.posts {
            patch.insert(Field::PostsPath, posts.clone());
        }
        if let Some(images) = &self.paths.images {
            patch.insert(Field::ImagesPath, images.clone());
        }
        if let Some(domain) = &self.domain_url {
            patch.insert(Field::DomainUrl, domain.clone());
        }
        commit_messages_to_patch(&self.commits, &mut patch);
        patch
    }

    pub fn layout(&self) -> CollectionLayout {
        CollectionLayout {
            template: self.templates.as_ref().and_then(|t| t.frontmatter.clone()),
            table_columns: self.ui.as_ref().and_then(|ui| ui.table_columns.clone()),
            column_widths: self.ui.as_ref().and_then(|ui| ui.column_widths.clone()),
        }
    }
}

/// Multi-collection v2 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub commit_messages: Map<String, Value>,
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub active_collection_id: Option<String>,
}

impl WorkspaceConfig {
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let settings = Field::ALL
            .iter()
            .filter(|field| !field.is_commit_template())
            .map(|field| (field.key().to_string(), workspace.settings.get(*field)))
            .collect();

        Self {
            version: Some(Value::from(WORKSPACE_VERSION)),
            settings,
            commit_messages: commit_messages_from_settings(&workspace.settings),
            collections: workspace.collections.clone(),
            active_collection_id: workspace.active_collection_id.clone(),
        }
    }

    pub fn to_patch(&self) -> SettingsPatch {
        let mut patch = SettingsPatch::from_json_object(&self.settings);
        commit_messages_to_patch(&self.commit_messages, &mut patch);
        patch
    }

    /// True when every collection path is empty or valid
    pub fn collection_paths_valid(&self) -> bool {
        self.collections.iter().all(|c| {
            collection_path_ok(Field::PostsPath, &c.posts_path)
                && collection_path_ok(Field::ImagesPath, &c.images_path)
        })
    }

    /// Build a workspace; invalid settings values fall back to defaults and
    /// invalid collection paths are cleared so the shared paths apply
    pub fn to_workspace(&self, repository_id: &str) -> Workspace {
        let mut workspace = Workspace::new(repository_id);
        workspace.update_settings(&self.to_patch());
        workspace.active_collection_id = self.active_collection_id.clone();

        let collections = self
            .collections
            .iter()
            .cloned()
            .map(|mut c| {
                if !collection_path_ok(Field::PostsPath, &c.posts_path) {
                    log::warn!(
                        "Ignoring invalid posts path '{}' of collection {}",
                        c.posts_path,
                        c.id
                    );
                    c.posts_path.clear();
                }
                if !collection_path_ok(Field::ImagesPath, &c.images_path) {
                    log::warn!(
                        "Ignoring invalid images path '{}' of collection {}",
                        c.images_path,
                        c.id
                    );
                    c.images_path.clear();
                }
                c
            })
            .collect();
        workspace.set_collections(collections);
        workspace
    }
}

/// Synthesize a single default collection from a v1 document's paths.
///
/// Layout already cached locally wins over layout embedded in the document.
pub fn upgrade_v1_to_v2(
    legacy: &LegacyConfig,
    settings: &Settings,
    cached_layout: &CollectionLayout,
) -> WorkspaceConfig {
    let mut upgraded = Settings::default();
    upgraded.apply(&settings.to_patch());
    upgraded.apply(&legacy.to_patch().valid_subset());

    let layout = cached_layout.clone().or(legacy.layout());
    let collection = Collection::new(
        DEFAULT_COLLECTION_NAME,
        upgraded.posts_path.clone(),
        upgraded.images_path.clone(),
    )
    .with_layout(layout);

    log::debug!(
        "Upgrading legacy config to v2 with collection {} ({} / {})",
        collection.id,
        collection.posts_path,
        collection.images_path
    );

    let mut workspace = Workspace::new("");
    workspace.settings = settings.clone();
    workspace.add_collection(collection);
    WorkspaceConfig::from_workspace(&workspace)
}

/// A parsed configuration document
#[derive(Debug, Clone, PartialEq)]
pub enum PersistedConfig {
    Legacy(LegacyConfig),
    Workspace(WorkspaceConfig),
}

/// True when the document carries a non-empty `collections` array
pub fn is_workspace_shaped(document: &Value) -> bool {
    document
        .get("collections")
        .and_then(Value::as_array)
        .is_some_and(|collections| !collections.is_empty())
}

impl PersistedConfig {
    /// Interpret a JSON document. A workspace-shaped document that fails to
    /// parse as v2 is read as legacy so its flat fields can still be merged.
    pub fn parse(document: &Value) -> Result<Self> {
        if !document.is_object() {
            return Err(GitCmsError::InvalidConfig(
                "expected a JSON object at the top level".to_string(),
            ));
        }

        if is_workspace_shaped(document) {
            match serde_json::from_value::<WorkspaceConfig>(document.clone()) {
                Ok(config) => return Ok(Self::Workspace(config)),
                Err(e) => log::warn!("Collections present but v2 parse failed, reading as legacy: {e}"),
            }
        }

        serde_json::from_value::<LegacyConfig>(document.clone())
            .map(Self::Legacy)
            .map_err(|e| GitCmsError::InvalidConfig(e.to_string()))
    }

    pub fn parse_str(content: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)
            .map_err(|e| GitCmsError::InvalidConfig(e.to_string()))?;
        Self::parse(&document)
    }

    /// Serialize the current in-memory model: v2 once any collection exists
    pub fn from_workspace(workspace: &Workspace, layout: &CollectionLayout) -> Self {
        if workspace.has_collections() {
            Self::Workspace(WorkspaceConfig::from_workspace(workspace))
        } else {
            Self::Legacy(LegacyConfig::from_settings(&workspace.settings, layout))
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Self::Legacy(_) => LEGACY_VERSION,
            Self::Workspace(_) => WORKSPACE_VERSION,
        }
    }

    pub fn to_patch(&self) -> SettingsPatch {
        match self {
            Self::Legacy(config) => config.to_patch(),
            Self::Workspace(config) => config.to_patch(),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        let json = match self {
            Self::Legacy(config) => serde_json::to_string_pretty(config)?,
            Self::Workspace(config) => serde_json::to_string_pretty(config)?,
        };
        Ok(format!("{json}\n"))
    }
}

/// Structural check used before importing a document
pub fn validate_document(document: &Value) -> bool {
    match PersistedConfig::parse(document) {
        Ok(PersistedConfig::Workspace(config)) if !config.collection_paths_valid() => false,
        Ok(config) => validate_all(&config.to_patch().to_json_object()),
        Err(_) => false,
    }
}
