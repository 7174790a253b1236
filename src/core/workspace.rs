//! Workspace and collection model.
//!
//! A [`Workspace`] is the per-repository aggregate of shared [`Settings`] and an
//! ordered list of [`Collection`]s. The first collection is the default; one
//! collection is always active while the list is non-empty.
//!
//! # Public API
//! - [`Collection`]: A named posts/images path override with optional layout
//! - [`CollectionPatch`]: Partial update for a collection
//! - [`CollectionLayout`]: Template and table layout carried by a collection
//! - [`Workspace`]: Settings + collections + active selection
//! - [`WorkspaceStore`]: Holder of the currently open workspace
//!
//! # Path Resolution
//! Collections override, never replace, the shared settings: the effective
//! posts/images path is the active collection's path when set, otherwise the
//! shared setting.

use crate::core::cache::LocalCache;
use crate::core::error::{GitCmsError, Result};
use crate::core::schema::{Settings, SettingsPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Frontmatter template and table layout for a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionLayout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<BTreeMap<String, u32>>,
}

impl CollectionLayout {
    pub fn is_empty(&self) -> bool {
        self.template.is_none() && self.table_columns.is_none() && self.column_widths.is_none()
    }

    /// Take each field from `self`, falling back to `other`
    pub fn or(self, other: CollectionLayout) -> CollectionLayout {
        CollectionLayout {
            template: self.template.or(other.template),
            table_columns: self.table_columns.or(other.table_columns),
            column_widths: self.column_widths.or(other.column_widths),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub posts_path: String,
    pub images_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<BTreeMap<String, u32>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    /// Create a collection with a fresh time-ordered id
    pub fn new(
        name: impl Into<String>,
        posts_path: impl Into<String>,
        images_path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.into(),
            posts_path: posts_path.into(),
            images_path: images_path.into(),
            template: None,
            table_columns: None,
            column_widths: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_layout(mut self, layout: CollectionLayout) -> Self {
        self.template = layout.template;
        self.table_columns = layout.table_columns;
        self.column_widths = layout.column_widths;
        self
    }

    pub fn layout(&self) -> CollectionLayout {
        CollectionLayout {
            template: self.template.clone(),
            table_columns: self.table_columns.clone(),
            column_widths: self.column_widths.clone(),
        }
    }
}

/// Partial update for a [`Collection`]; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub posts_path: Option<String>,
    pub images_path: Option<String>,
    pub template: Option<Value>,
    pub table_columns: Option<Vec<String>>,
    pub column_widths: Option<BTreeMap<String, u32>>,
}

impl CollectionPatch {
    pub fn is_empty(&self) -> bool {
        *self == CollectionPatch::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub repository_id: String,
    pub settings: Settings,
    pub collections: Vec<Collection>,
    pub active_collection_id: Option<String>,
}

impl Workspace {
    pub fn new(repository_id: impl Into<String>) -> Self {
        Self {
            repository_id: repository_id.into(),
            settings: Settings::default(),
            collections: Vec::new(),
            active_collection_id: None,
        }
    }

    pub fn has_collections(&self) -> bool {
        !self.collections.is_empty()
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Replace the collection list, keeping the active id only if it still exists
    pub fn set_collections(&mut self, collections: Vec<Collection>) {
        self.collections = collections;
        self.repair_active();
    }

    pub fn add_collection(&mut self, collection: Collection) {
        log::debug!("Adding collection '{}' ({})", collection.name, collection.id);
        self.collections.push(collection);
        self.repair_active();
    }

    pub fn update_collection(&mut self, id: &str, patch: CollectionPatch) -> Result<&Collection> {
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GitCmsError::collection_not_found(id))?;

        if let Some(name) = patch.name {
            collection.name = name;
        }
        if let Some(posts_path) = patch.posts_path {
            collection.posts_path = posts_path;
        }
        if let Some(images_path) = patch.images_path {
            collection.images_path = images_path;
        }
        if patch.template.is_some() {
            collection.template = patch.template;
        }
        if patch.table_columns.is_some() {
            collection.table_columns = patch.table_columns;
        }
        if patch.column_widths.is_some() {
            collection.column_widths = patch.column_widths;
        }
        collection.updated_at = Utc::now();

        Ok(collection)
    }

    /// Remove a collection, reassigning the active id to the first remaining
    /// collection (or clearing it) when the active one is deleted
    pub fn delete_collection(&mut self, id: &str) -> Result<Collection> {
        let position = self
            .collections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| GitCmsError::collection_not_found(id))?;
        let removed = self.collections.remove(position);

        if self.active_collection_id.as_deref() == Some(id) {
            self.active_collection_id = None;
        }
        self.repair_active();

        log::debug!(
            "Deleted collection '{}', active is now {:?}",
            removed.name,
            self.active_collection_id
        );
        Ok(removed)
    }

    pub fn set_active_collection(&mut self, id: &str) -> Result<()> {
        if self.collection(id).is_none() {
            return Err(GitCmsError::collection_not_found(id));
        }
        self.active_collection_id = Some(id.to_string());
        Ok(())
    }

    /// Shallow, validated merge into the shared settings
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> usize {
        self.settings.apply(patch)
    }

    pub fn active_collection(&self) -> Option<&Collection> {
        self.active_collection_id
            .as_deref()
            .and_then(|id| self.collection(id))
            .or_else(|| self.collections.first())
    }

    pub fn effective_posts_path(&self) -> &str {
        match self.active_collection() {
            Some(c) if !c.posts_path.is_empty() => &c.posts_path,
            _ => &self.settings.posts_path,
        }
    }

    pub fn effective_images_path(&self) -> &str {
        match self.active_collection() {
            Some(c) if !c.images_path.is_empty() => &c.images_path,
            _ => &self.settings.images_path,
        }
    }

    fn repair_active(&mut self) {
        let valid = self
            .active_collection_id
            .as_deref()
            .is_some_and(|id| self.collection(id).is_some());
        if !valid {
            self.active_collection_id = self.collections.first().map(|c| c.id.clone());
        }
    }
}

/// Holds the workspace of the currently open repository
#[derive(Debug, Default)]
pub struct WorkspaceStore {
    current: Option<Workspace>,
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a workspace for `repository_id`. A no-op when that repository
    /// is already open; any other workspace is replaced.
    pub fn init_workspace(&mut self, repository_id: &str) -> &mut Workspace {
        let reuse = self
            .current
            .as_ref()
            .is_some_and(|ws| ws.repository_id == repository_id);
        if !reuse {
            log::debug!("Initializing workspace for {repository_id}");
            self.current = Some(Workspace::new(repository_id));
        }
        self.current.get_or_insert_with(|| Workspace::new(repository_id))
    }

    pub fn workspace(&self) -> Result<&Workspace> {
        self.current.as_ref().ok_or(GitCmsError::NoWorkspace)
    }

    pub fn workspace_mut(&mut self) -> Result<&mut Workspace> {
        self.current.as_mut().ok_or(GitCmsError::NoWorkspace)
    }

    pub fn replace(&mut self, workspace: Workspace) {
        self.current = Some(workspace);
    }

    /// Clear the in-memory workspace and its persisted copy
    pub fn reset_workspace(&mut self, cache: &LocalCache) -> Result<()> {
        self.current = None;
        cache.clear_workspace()
    }
}
