//! Session facade over the reconciled workspace.
//!
//! [`CmsSession`] is the interface consumed by the UI layer: a read-only
//! workspace snapshot, setup/scan/sync state and the actions that change the
//! configuration.
//!
//! # Write Discipline
//! Every remote write runs under the [`SyncLock`]. The change is computed on a
//! copy of the workspace and committed to memory and cache only after the
//! remote write succeeds. The token observed at the last read or write is sent
//! with each update; a stale token fails with `ConcurrencyConflict` and is
//! never retried.

use crate::core::cache::{decode_field, LocalCache};
use crate::core::capability::RepoScanner;
use crate::core::config_file::{upgrade_v1_to_v2, LegacyConfig, PersistedConfig};
use crate::core::error::{GitCmsError, Result};
use crate::core::progress::{ProgressTracker, ScanProgress};
use crate::core::reconcile::{BootstrapOutcome, BootstrapReport, Reconciler, ScanSuggestions};
use crate::core::remote::ConfigBackend;
use crate::core::schema::{validate, Field, SettingsPatch};
use crate::core::sync_lock::{SyncLock, SyncStatus};
use crate::core::workspace::{
    Collection, CollectionLayout, CollectionPatch, Workspace, WorkspaceStore,
};
use serde_json::Value;
use std::rc::Rc;

pub struct CmsSession {
    repository_id: String,
    store: WorkspaceStore,
    cache: LocalCache,
    backend: Box<dyn ConfigBackend>,
    scanner: Rc<dyn RepoScanner>,
    lock: SyncLock,
    progress: ProgressTracker,
    setup_complete: bool,
    scanning: bool,
    token: Option<String>,
    suggestions: Option<ScanSuggestions>,
    outcome: Option<BootstrapOutcome>,
}

impl CmsSession {
    pub fn new(
        repository_id: impl Into<String>,
        backend: Box<dyn ConfigBackend>,
        scanner: Rc<dyn RepoScanner>,
        cache: LocalCache,
        lock: SyncLock,
    ) -> Self {
        Self {
            repository_id: repository_id.into(),
            store: WorkspaceStore::new(),
            cache,
            backend,
            scanner,
            lock,
            progress: ProgressTracker::default(),
            setup_complete: false,
            scanning: false,
            token: None,
            suggestions: None,
            outcome: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressTracker) -> Self {
        self.progress = progress;
        self
    }

    /// Reconcile cache, remote config and scan into the session workspace
    pub fn bootstrap(&mut self) -> BootstrapReport {
        self.scanning = true;
        let report = Reconciler::new(
            &self.repository_id,
            self.backend.as_ref(),
            &self.cache,
            self.scanner.as_ref(),
            &mut self.progress,
        )
        .run(&mut self.store);
        self.scanning = false;

        self.setup_complete = report.setup_complete;
        self.token = report.token.clone();
        self.suggestions = report.suggestions.clone();
        self.outcome = Some(report.outcome.clone());
        report
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    pub fn snapshot(&self) -> Result<&Workspace> {
        self.store.workspace()
    }

    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn progress(&self) -> &ScanProgress {
        self.progress.current()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.lock.status()
    }

    pub fn suggestions(&self) -> Option<&ScanSuggestions> {
        self.suggestions.as_ref()
    }

    pub fn outcome(&self) -> Option<&BootstrapOutcome> {
        self.outcome.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn config_location(&self) -> &str {
        self.backend.location()
    }

    pub fn language(&self) -> String {
        self.cache.language()
    }

    pub fn set_language(&self, language: &str) -> Result<()> {
        self.cache.set_language(language)
    }

    /// Parse a raw CLI value for `key` into a settings patch
    pub fn parse_setting(key: &str, raw: &str) -> Result<SettingsPatch> {
        let field = Field::from_key(key).ok_or_else(|| GitCmsError::UnknownField(key.to_string()))?;
        let value = decode_field(field, raw);
        if !validate(field, &value) {
            return Err(GitCmsError::validation(key, raw));
        }
        Ok(SettingsPatch::new().with(field, value))
    }

    /// Apply valid values locally and mirror them into the cache, without a
    /// remote write. Returns the number of fields applied.
    pub fn set_settings(&mut self, patch: &SettingsPatch) -> Result<usize> {
        let workspace = self.store.workspace_mut()?;
        let applied = workspace.update_settings(patch);
        let settings = workspace.settings.clone();
        if let Err(e) = self.cache.save(&self.repository_id, &settings) {
            log::warn!("Failed to cache settings: {e}");
        }
        Ok(applied)
    }

    pub fn save_settings(&mut self, patch: &SettingsPatch) -> Result<usize> {
        let mut next = self.store.workspace()?.clone();
        let applied = next.update_settings(patch);
        self.write_remote(next, "Update gitcms settings", "Saving settings")?;
        Ok(applied)
    }

    /// Persist the working settings and mark setup as done
    pub fn complete_setup(&mut self, patch: &SettingsPatch) -> Result<()> {
        let mut next = self.store.workspace()?.clone();
        next.update_settings(patch);
        self.write_remote(next, "Configure gitcms", "Completing setup")?;
        self.setup_complete = true;
        Ok(())
    }

    /// Add a collection. The first collection upgrades a flat configuration:
    /// a default collection is synthesized from the shared paths first.
    pub fn create_collection(
        &mut self,
        name: &str,
        posts_path: &str,
        images_path: &str,
    ) -> Result<Collection> {
        validate_collection_paths(Some(posts_path), Some(images_path))?;
        let current = self.store.workspace()?;

        let mut next = if current.has_collections() {
            current.clone()
        } else {
            let layout = self.cache.load_layout(&self.repository_id);
            let legacy = LegacyConfig::from_settings(&current.settings, &layout);
            upgrade_v1_to_v2(&legacy, &current.settings, &layout).to_workspace(&self.repository_id)
        };

        let collection = Collection::new(name, posts_path, images_path);
        next.add_collection(collection.clone());
        self.write_remote(
            next,
            &format!("Create collection {name}"),
            "Saving collection",
        )?;
        Ok(collection)
    }

    pub fn update_collection(&mut self, id: &str, patch: CollectionPatch) -> Result<Collection> {
        validate_collection_paths(patch.posts_path.as_deref(), patch.images_path.as_deref())?;
        let mut next = self.store.workspace()?.clone();
        let updated = next.update_collection(id, patch)?.clone();
        self.write_remote(
            next,
            &format!("Update collection {}", updated.name),
            "Saving collection",
        )?;
        Ok(updated)
    }

    pub fn delete_collection(&mut self, id: &str) -> Result<Collection> {
        let mut next = self.store.workspace()?.clone();
        let removed = next.delete_collection(id)?;
        self.write_remote(
            next,
            &format!("Delete collection {}", removed.name),
            "Deleting collection",
        )?;
        Ok(removed)
    }

    /// Local selection only; persisted with the workspace blob
    pub fn set_active_collection(&mut self, id: &str) -> Result<()> {
        let workspace = self.store.workspace_mut()?;
        workspace.set_active_collection(id)?;
        if let Err(e) = self.cache.save_workspace(workspace) {
            log::warn!("Failed to persist workspace: {e}");
        }
        Ok(())
    }

    /// Store a frontmatter template on a collection. Without `collection_id`
    /// the template goes to the flat configuration, or to the active
    /// collection once collections exist. Returns the collection name used.
    pub fn save_template(
        &mut self,
        collection_id: Option<&str>,
        template: Value,
    ) -> Result<Option<String>> {
        let mut next = self.store.workspace()?.clone();
        let target = match collection_id {
            Some(id) => Some(id.to_string()),
            None => next.active_collection().map(|c| c.id.clone()),
        };

        match target {
            Some(id) => {
                let patch = CollectionPatch {
                    template: Some(template),
                    ..Default::default()
                };
                let name = next.update_collection(&id, patch)?.name.clone();
                self.write_remote(
                    next,
                    &format!("Update template for {name}"),
                    "Saving template",
                )?;
                Ok(Some(name))
            }
            None => {
                let mut layout = self.cache.load_layout(&self.repository_id);
                layout.template = Some(template);
                self.write_with_layout(
                    next,
                    Some(layout),
                    "Update frontmatter template",
                    "Saving template",
                )?;
                Ok(None)
            }
        }
    }

    /// The configuration document as it would be written now
    pub fn export_config(&self) -> Result<String> {
        let workspace = self.store.workspace()?;
        let layout = self.cache.load_layout(&self.repository_id);
        self.backend
            .export(&PersistedConfig::from_workspace(workspace, &layout))
    }

    /// Validate, write and adopt an external configuration document
    pub fn import_config(&mut self, content: &str) -> Result<()> {
        let imported = self.backend.import(content)?;
        let current = self.store.workspace()?;

        let (next, layout) = match &imported {
            PersistedConfig::Workspace(config) => (config.to_workspace(&self.repository_id), None),
            PersistedConfig::Legacy(config) => {
                let mut next = Workspace::new(self.repository_id.clone());
                next.settings = current.settings.clone();
                next.update_settings(&config.to_patch());
                let layout = config
                    .layout()
                    .or(self.cache.load_layout(&self.repository_id));
                (next, Some(layout))
            }
        };

        self.write_with_layout(
            next,
            layout,
            "Import gitcms configuration",
            "Importing configuration",
        )?;
        self.setup_complete = true;
        Ok(())
    }

    /// Remove the remote document and every local trace of this repository
    pub fn delete_config(&mut self) -> Result<()> {
        let backend = self.backend.as_ref();
        let token = self.token.as_deref();
        self.lock.with_lock(Some("Deleting configuration"), || {
            backend.remove("Remove gitcms configuration", token)
        })?;

        self.token = None;
        self.setup_complete = false;
        self.suggestions = None;
        if let Err(e) = self.cache.clear(&self.repository_id) {
            log::warn!("Failed to clear cache: {e}");
        }
        self.store.reset_workspace(&self.cache)?;
        self.store.init_workspace(&self.repository_id);
        Ok(())
    }

    /// Purge the local cache for this repository; memory is untouched
    pub fn clear_cache(&self) -> Result<usize> {
        self.cache.clear(&self.repository_id)
    }

    fn write_remote(&mut self, next: Workspace, message: &str, status: &str) -> Result<()> {
        self.write_with_layout(next, None, message, status)
    }

    /// Write `next` with `layout`, or the cached layout when `None`. Cache and
    /// memory are only touched once the remote write succeeded.
    fn write_with_layout(
        &mut self,
        next: Workspace,
        layout: Option<CollectionLayout>,
        message: &str,
        status: &str,
    ) -> Result<()> {
        let changed_layout = layout.is_some();
        let layout = layout.unwrap_or_else(|| self.cache.load_layout(&self.repository_id));
        let config = PersistedConfig::from_workspace(&next, &layout);
        self.write_config(&config, message, status)?;

        if let Err(e) = self.cache.save(&self.repository_id, &next.settings) {
            log::warn!("Failed to cache settings: {e}");
        }
        if changed_layout {
            if let Err(e) = self.cache.save_layout(&self.repository_id, &layout) {
                log::warn!("Failed to cache layout: {e}");
            }
        }
        if let Err(e) = self.cache.save_workspace(&next) {
            log::warn!("Failed to persist workspace: {e}");
        }
        self.store.replace(next);
        Ok(())
    }

    fn write_config(&mut self, config: &PersistedConfig, message: &str, status: &str) -> Result<()> {
        let backend = self.backend.as_ref();
        let token = self.token.as_deref();
        let new_token = self
            .lock
            .with_lock(Some(status), || backend.save(config, message, token))?;
        log::debug!("Wrote v{} config to {}", config.version(), backend.location());
        self.token = Some(new_token);
        Ok(())
    }
}

fn validate_collection_paths(posts_path: Option<&str>, images_path: Option<&str>) -> Result<()> {
    for (field, path) in [(Field::PostsPath, posts_path), (Field::ImagesPath, images_path)] {
        if let Some(path) = path {
            if !path.is_empty() && !validate(field, &Value::from(path)) {
                return Err(GitCmsError::validation(field.key(), path));
            }
        }
    }
    Ok(())
}
