//! Settings schema, per-field validators and defaults.
//!
//! Every settings field is described by a [`Field`] variant carrying its
//! persisted key and value kind. Values travel as `serde_json::Value` between
//! the cache, the remote document and the typed [`Settings`] record, and are
//! only ever applied after passing [`validate`].
//!
//! # Public API
//! - [`Field`]: The closed set of known settings fields
//! - [`Settings`]: The typed, always-valid settings record
//! - [`SettingsPatch`]: A partial set of field values (may contain invalid values)
//! - [`validate`], [`validate_all`], [`defaults`]: Schema operations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const MAX_PATH_LENGTH: usize = 256;
pub const MAX_FILE_TYPES_LENGTH: usize = 100;
pub const MAX_COMMIT_TEMPLATE_LENGTH: usize = 200;

pub const PROJECT_TYPES: &[&str] = &[
    "astro", "next", "hugo", "jekyll", "gatsby", "eleventy", "other",
];

pub const LANGUAGES: &[&str] = &["en", "es", "fr", "de", "pt", "it", "ja", "zh"];
pub const DEFAULT_LANGUAGE: &str = "en";

/// How a field's value is typed when decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
    Integer,
}

/// A repository-scoped settings field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    ProjectType,
    PostsPath,
    ImagesPath,
    DomainUrl,
    PostFileTypes,
    ImageFileTypes,
    OptimizeImages,
    ImageQuality,
    MaxImageWidth,
    CommitNewPost,
    CommitUpdatePost,
    CommitDeletePost,
    CommitUploadImage,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::ProjectType,
        Field::PostsPath,
        Field::ImagesPath,
        Field::DomainUrl,
        Field::PostFileTypes,
        Field::ImageFileTypes,
        Field::OptimizeImages,
        Field::ImageQuality,
        Field::MaxImageWidth,
        Field::CommitNewPost,
        Field::CommitUpdatePost,
        Field::CommitDeletePost,
        Field::CommitUploadImage,
    ];

    /// Fields a cache or remote document must supply before setup counts as done
    pub const MANDATORY: [Field; 3] = [Field::ProjectType, Field::PostsPath, Field::ImagesPath];

    pub const COMMIT_TEMPLATES: [Field; 4] = [
        Field::CommitNewPost,
        Field::CommitUpdatePost,
        Field::CommitDeletePost,
        Field::CommitUploadImage,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::ProjectType => "projectType",
            Field::PostsPath => "postsPath",
            Field::ImagesPath => "imagesPath",
            Field::DomainUrl => "domainUrl",
            Field::PostFileTypes => "postFileTypes",
            Field::ImageFileTypes => "imageFileTypes",
            Field::OptimizeImages => "optimizeImages",
            Field::ImageQuality => "imageQuality",
            Field::MaxImageWidth => "maxImageWidth",
            Field::CommitNewPost => "commitNewPost",
            Field::CommitUpdatePost => "commitUpdatePost",
            Field::CommitDeletePost => "commitDeletePost",
            Field::CommitUploadImage => "commitUploadImage",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|field| field.key() == key)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::OptimizeImages => FieldKind::Flag,
            Field::ImageQuality | Field::MaxImageWidth => FieldKind::Integer,
            _ => FieldKind::Text,
        }
    }

    pub fn is_commit_template(self) -> bool {
        Field::COMMIT_TEMPLATES.contains(&self)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && n.fract() == 0.0)
            .map(|n| n as i64)
    })
}

fn is_valid_repo_path(path: &str) -> bool {
    let trimmed = path.trim();
    !trimmed.is_empty()
        && trimmed.len() <= MAX_PATH_LENGTH
        && !trimmed.starts_with('/')
        && !trimmed.split('/').any(|segment| segment == "..")
}

fn is_valid_file_types(list: &str) -> bool {
    list.len() <= MAX_FILE_TYPES_LENGTH
        && !list.trim().is_empty()
        && list.split(',').all(|ext| {
            let ext = ext.trim();
            ext.len() > 1 && ext.starts_with('.')
        })
}

fn is_valid_domain(url: &str) -> bool {
    url.len() <= MAX_PATH_LENGTH
        && (url.is_empty() || url.starts_with("http://") || url.starts_with("https://"))
}

fn is_valid_commit_template(template: &str) -> bool {
    !template.trim().is_empty() && template.len() <= MAX_COMMIT_TEMPLATE_LENGTH
}

/// Check a single value against its field's type and domain
pub fn validate(field: Field, value: &Value) -> bool {
    match field {
        Field::ProjectType => value
            .as_str()
            .is_some_and(|v| PROJECT_TYPES.contains(&v)),
        Field::PostsPath | Field::ImagesPath => value.as_str().is_some_and(is_valid_repo_path),
        Field::DomainUrl => value.as_str().is_some_and(is_valid_domain),
        Field::PostFileTypes | Field::ImageFileTypes => {
            value.as_str().is_some_and(is_valid_file_types)
        }
        Field::OptimizeImages => value.is_boolean(),
        Field::ImageQuality => as_integer(value).is_some_and(|n| (1..=100).contains(&n)),
        Field::MaxImageWidth => as_integer(value).is_some_and(|n| (100..=4096).contains(&n)),
        Field::CommitNewPost
        | Field::CommitUpdatePost
        | Field::CommitDeletePost
        | Field::CommitUploadImage => value.as_str().is_some_and(is_valid_commit_template),
    }
}

/// True only if every present, known key passes its validator.
/// Unknown keys are ignored so newer documents stay readable.
pub fn validate_all(partial: &Map<String, Value>) -> bool {
    partial.iter().all(|(key, value)| match Field::from_key(key) {
        Some(field) => validate(field, value),
        None => true,
    })
}

pub fn is_valid_language(language: &str) -> bool {
    LANGUAGES.contains(&language)
}

pub fn defaults() -> Settings {
    Settings::default()
}

/// Typed settings record. Only mutated through validated setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub project_type: String,
    pub posts_path: String,
    pub images_path: String,
    pub domain_url: String,
    pub post_file_types: String,
    pub image_file_types: String,
    pub optimize_images: bool,
    pub image_quality: u8,
    pub max_image_width: u32,
    pub commit_new_post: String,
    pub commit_update_post: String,
    pub commit_delete_post: String,
    pub commit_upload_image: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_type: "astro".to_string(),
            posts_path: "src/content/blog".to_string(),
            images_path: "public/images".to_string(),
            domain_url: String::new(),
            post_file_types: ".md,.mdx".to_string(),
            image_file_types: ".jpg,.jpeg,.png,.gif,.webp,.svg".to_string(),
            optimize_images: true,
            image_quality: 80,
            max_image_width: 1920,
            commit_new_post: "Create post {filename}".to_string(),
            commit_update_post: "Update post {filename}".to_string(),
            commit_delete_post: "Delete post {filename}".to_string(),
            commit_upload_image: "Upload image {filename}".to_string(),
        }
    }
}

impl Settings {
    pub fn get(&self, field: Field) -> Value {
        match field {
            Field::ProjectType => Value::from(self.project_type.as_str()),
            Field::PostsPath => Value::from(self.posts_path.as_str()),
            Field::ImagesPath => Value::from(self.images_path.as_str()),
            Field::DomainUrl => Value::from(self.domain_url.as_str()),
            Field::PostFileTypes => Value::from(self.post_file_types.as_str()),
            Field::ImageFileTypes => Value::from(self.image_file_types.as_str()),
            Field::OptimizeImages => Value::from(self.optimize_images),
            Field::ImageQuality => Value::from(self.image_quality),
            Field::MaxImageWidth => Value::from(self.max_image_width),
            Field::CommitNewPost => Value::from(self.commit_new_post.as_str()),
            Field::CommitUpdatePost => Value::from(self.commit_update_post.as_str()),
            Field::CommitDeletePost => Value::from(self.commit_delete_post.as_str()),
            Field::CommitUploadImage => Value::from(self.commit_upload_image.as_str()),
        }
    }

    /// Apply one value if it validates. Returns whether it was applied.
    pub fn set(&mut self, field: Field, value: &Value) -> bool {
        if !validate(field, value) {
            log::debug!("Rejected invalid value for {field}: {value}");
            return false;
        }

        let text = || value.as_str().map(|s| s.trim().to_string()).unwrap_or_default();
        match field {
            Field::ProjectType => self.project_type = text(),
            Field::PostsPath => self.posts_path = text(),
            Field::ImagesPath => self.images_path = text(),
            Field::DomainUrl => self.domain_url = text(),
            Field::PostFileTypes => self.post_file_types = text(),
            Field::ImageFileTypes => self.image_file_types = text(),
            Field::OptimizeImages => self.optimize_images = value.as_bool().unwrap_or_default(),
            Field::ImageQuality => {
                self.image_quality = as_integer(value).unwrap_or_default() as u8
            }
            Field::MaxImageWidth => {
                self.max_image_width = as_integer(value).unwrap_or_default() as u32
            }
            Field::CommitNewPost => self.commit_new_post = text(),
            Field::CommitUpdatePost => self.commit_update_post = text(),
            Field::CommitDeletePost => self.commit_delete_post = text(),
            Field::CommitUploadImage => self.commit_upload_image = text(),
        }
        true
    }

    /// Shallow, validated merge. Returns the number of fields applied.
    pub fn apply(&mut self, patch: &SettingsPatch) -> usize {
        patch
            .iter()
            .filter(|(field, value)| self.set(*field, value))
            .count()
    }

    pub fn to_patch(&self) -> SettingsPatch {
        let mut patch = SettingsPatch::new();
        for field in Field::ALL {
            patch.insert(field, self.get(field));
        }
        patch
    }

    pub fn from_patch(patch: &SettingsPatch) -> Self {
        let mut settings = Settings::default();
        settings.apply(patch);
        settings
    }
}

/// A partial set of settings values keyed by field.
///
/// A patch may hold values that fail validation; they are dropped when the
/// patch is applied to [`Settings`] or filtered through [`SettingsPatch::valid_subset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    values: BTreeMap<Field, Value>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.insert(field, value.into());
        self
    }

    pub fn insert(&mut self, field: Field, value: Value) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    /// Build a patch from a JSON object, skipping unknown keys
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut patch = Self::new();
        for (key, value) in object {
            if let Some(field) = Field::from_key(key) {
                patch.insert(field, value.clone());
            }
        }
        patch
    }

    pub fn to_json_object(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(field, value)| (field.key().to_string(), value.clone()))
            .collect()
    }

    pub fn valid_subset(&self) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|(field, value)| validate(**field, value))
                .map(|(field, value)| (*field, value.clone()))
                .collect(),
        }
    }

    /// Overlay `other` on top of `self`, taking only values that validate.
    /// Returns the number of fields taken from `other`.
    pub fn overlay_valid(&mut self, other: &SettingsPatch) -> usize {
        let mut applied = 0;
        for (field, value) in other.iter() {
            if validate(field, value) {
                self.insert(field, value.clone());
                applied += 1;
            } else {
                log::debug!("Skipping invalid remote value for {field}: {value}");
            }
        }
        applied
    }

    /// Fill only the fields `self` does not already hold
    pub fn fill_missing(&mut self, other: &SettingsPatch) {
        for (field, value) in other.iter() {
            self.values.entry(field).or_insert_with(|| value.clone());
        }
    }

    /// True when every mandatory field is present with a valid value
    pub fn has_mandatory(&self) -> bool {
        Field::MANDATORY
            .iter()
            .all(|field| self.get(*field).is_some_and(|value| validate(*field, value)))
    }
}
