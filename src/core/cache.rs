//! Local cache adapter.
//!
//! Settings are mirrored into a namespaced key/value store so a repository can
//! be reopened without waiting on the remote file. Repository fields live under
//! `{field}_{repositoryId}`; global preferences such as the UI language live
//! under a bare key.
//!
//! # Public API
//! - [`KeyValueStore`]: Injected string key/value persistence
//! - [`FileKeyValueStore`]: JSON file backed store in the cache directory
//! - [`MemoryKeyValueStore`]: In-memory store, shared between clones
//! - [`LocalCache`]: Typed, per-repository view over a store
//!
//! # Cache Strategy
//! - **String encoding**: every value is stored as a string
//! - **Type inference**: booleans and numbers are recovered on read, then validated
//! - **Independent fields**: one bad entry never invalidates the others

use crate::core::error::{GitCmsError, Result};
use crate::core::schema::{self, Field, FieldKind, Settings, SettingsPatch};
use crate::core::workspace::{CollectionLayout, Workspace};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const STORE_FILE_NAME: &str = "store.json";
pub const LANGUAGE_KEY: &str = "language";
pub const WORKSPACE_BLOB_KEY: &str = "workspace-storage";
pub const SETTINGS_BLOB_KEY: &str = "settings-storage";

const TEMPLATE_KEY: &str = "frontmatterTemplate";
const TABLE_COLUMNS_KEY: &str = "tableColumns";
const COLUMN_WIDTHS_KEY: &str = "columnWidths";
const LAYOUT_KEYS: [&str; 3] = [TEMPLATE_KEY, TABLE_COLUMNS_KEY, COLUMN_WIDTHS_KEY];
const GLOBAL_BLOB_KEYS: [&str; 2] = [WORKSPACE_BLOB_KEY, SETTINGS_BLOB_KEY];

/// String key/value persistence, scoped by the caller
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Vec<String>;
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

/// Store persisted as a single JSON object on disk.
///
/// The whole map is rewritten on every mutation through a temporary file and
/// a rename, so a crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    pub fn open(cache_dir: &Path) -> Result<Self> {
        if let Err(e) = fs::create_dir_all(cache_dir) {
            log::error!(
                "Failed to create cache directory '{}': {}",
                cache_dir.display(),
                e
            );
            return Err(GitCmsError::cache_directory_creation_failed(cache_dir, e));
        }

        let path = cache_dir.join(STORE_FILE_NAME);
        log::debug!("Using cache store: {}", path.display());

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| GitCmsError::cache_read_failed(&path, e))?;
            match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    // A corrupt store is discarded rather than blocking the engine
                    log::warn!("Ignoring unreadable cache store '{}': {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&*self.entries.borrow())?;
        let tmp = self.path.with_extension("json.tmp");

        if let Err(e) = fs::write(&tmp, json) {
            log::error!("Failed to write cache file '{}': {}", tmp.display(), e);
            return Err(GitCmsError::cache_write_failed(&tmp, e));
        }
        fs::rename(&tmp, &self.path).map_err(|e| GitCmsError::cache_write_failed(&self.path, e))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed {
            self.flush()?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

pub fn scoped_key(key: &str, repository_id: &str) -> String {
    format!("{key}_{repository_id}")
}

/// Recover a typed value from its string form: boolean literal, number, else string
pub fn infer_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = raw.parse::<i64>() {
                Value::from(n)
            } else if let Some(n) = raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                Value::Number(n)
            } else {
                Value::String(raw.to_string())
            }
        }
    }
}

/// Decode a cached value for `field`. Text fields keep the raw string even
/// when it looks like a number or boolean (a path named `2024` stays a path).
pub fn decode_field(field: Field, raw: &str) -> Value {
    match (field.kind(), infer_value(raw)) {
        (FieldKind::Text, Value::String(s)) => Value::String(s),
        (FieldKind::Text, _) => Value::String(raw.to_string()),
        (_, value) => value,
    }
}

pub fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Typed view over a [`KeyValueStore`]
pub struct LocalCache {
    store: Box<dyn KeyValueStore>,
}

impl LocalCache {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryKeyValueStore::new()))
    }

    /// Read every known field, keeping only values that decode and validate
    pub fn load(&self, repository_id: &str) -> SettingsPatch {
        let mut patch = SettingsPatch::new();
        for field in Field::ALL {
            let key = scoped_key(field.key(), repository_id);
            let Some(raw) = self.store.get(&key) else {
                continue;
            };
            let value = decode_field(field, &raw);
            if schema::validate(field, &value) {
                patch.insert(field, value);
            } else {
                log::warn!("Ignoring invalid cached value for {key}: {raw:?}");
            }
        }
        log::debug!("Loaded {} cached fields for {repository_id}", patch.len());
        patch
    }

    pub fn save(&self, repository_id: &str, settings: &Settings) -> Result<()> {
        self.save_patch(repository_id, &settings.to_patch())
    }

    /// Write only the valid fields `patch` holds, leaving other keys untouched
    pub fn save_patch(&self, repository_id: &str, patch: &SettingsPatch) -> Result<()> {
        let valid = patch.valid_subset();
        for (field, value) in valid.iter() {
            let key = scoped_key(field.key(), repository_id);
            self.store.set(&key, &encode_value(value))?;
        }
        log::debug!("Cached {} fields for {repository_id}", valid.len());
        Ok(())
    }

    /// Purge every trace of a repository: keys containing its id, the known
    /// namespaced keys and the global workspace/settings blobs. Returns how
    /// many entries were removed.
    pub fn clear(&self, repository_id: &str) -> Result<usize> {
        let mut doomed: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter(|key| !repository_id.is_empty() && key.contains(repository_id))
            .collect();

        doomed.extend(
            Field::ALL
                .iter()
                .map(|field| field.key())
                .chain(LAYOUT_KEYS)
                .map(|key| scoped_key(key, repository_id)),
        );
        doomed.extend(GLOBAL_BLOB_KEYS.iter().map(|key| key.to_string()));
        doomed.sort();
        doomed.dedup();

        let mut removed = 0;
        for key in &doomed {
            if self.store.get(key).is_some() {
                self.store.remove(key)?;
                removed += 1;
            }
        }
        log::debug!("Cleared {removed} cache entries for {repository_id}");
        Ok(removed)
    }

    pub fn load_layout(&self, repository_id: &str) -> CollectionLayout {
        fn read<T: serde::de::DeserializeOwned>(
            store: &dyn KeyValueStore,
            key: &str,
        ) -> Option<T> {
            let raw = store.get(key)?;
            serde_json::from_str(&raw)
                .map_err(|e| log::warn!("Ignoring unreadable cached layout {key}: {e}"))
                .ok()
        }

        let store = self.store.as_ref();
        CollectionLayout {
            template: read(store, &scoped_key(TEMPLATE_KEY, repository_id)),
            table_columns: read(store, &scoped_key(TABLE_COLUMNS_KEY, repository_id)),
            column_widths: read(store, &scoped_key(COLUMN_WIDTHS_KEY, repository_id)),
        }
    }

    pub fn save_layout(&self, repository_id: &str, layout: &CollectionLayout) -> Result<()> {
        let entries = [
            (TEMPLATE_KEY, layout.template.as_ref().map(serde_json::to_string)),
            (
                TABLE_COLUMNS_KEY,
                layout.table_columns.as_ref().map(serde_json::to_string),
            ),
            (
                COLUMN_WIDTHS_KEY,
                layout.column_widths.as_ref().map(serde_json::to_string),
            ),
        ];
        for (key, encoded) in entries {
            if let Some(encoded) = encoded {
                self.store.set(&scoped_key(key, repository_id), &encoded?)?;
            }
        }
        Ok(())
    }

    /// The persisted workspace, if it belongs to `repository_id`
    pub fn load_workspace(&self, repository_id: &str) -> Option<Workspace> {
        let raw = self.store.get(WORKSPACE_BLOB_KEY)?;
        match serde_json::from_str::<Workspace>(&raw) {
            Ok(ws) if ws.repository_id == repository_id => Some(ws),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Ignoring unreadable persisted workspace: {e}");
                None
            }
        }
    }

    pub fn save_workspace(&self, workspace: &Workspace) -> Result<()> {
        let json = serde_json::to_string(workspace)?;
        self.store.set(WORKSPACE_BLOB_KEY, &json)
    }

    pub fn clear_workspace(&self) -> Result<()> {
        self.store.remove(WORKSPACE_BLOB_KEY)
    }

    pub fn language(&self) -> String {
        self.store
            .get(LANGUAGE_KEY)
            .filter(|lang| schema::is_valid_language(lang))
            .unwrap_or_else(|| schema::DEFAULT_LANGUAGE.to_string())
    }

    pub fn set_language(&self, language: &str) -> Result<()> {
        if !schema::is_valid_language(language) {
            return Err(GitCmsError::validation(LANGUAGE_KEY, language));
        }
        self.store.set(LANGUAGE_KEY, language)
    }
}
