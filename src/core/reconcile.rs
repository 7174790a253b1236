//! Bootstrap reconciliation of cache, remote config and repository scan.
//!
//! Opening a repository runs the phases below in order. Each phase produces an
//! immutable [`PhaseResult`]; any phase may end the run early.
//!
//! 1. **Init**: attach the workspace, restoring a persisted workspace blob
//! 2. **Remote load**: read the remote document; a v2 document wins outright
//! 3. **Cache merge**: cached values seed the working draft (10% -> 20%)
//! 4. **Remote v1 merge**: valid remote values override the draft (40%);
//!    complete when the three mandatory fields are present
//! 5. **Cache sufficiency**: no usable remote file, cache holds the mandatory fields
//! 6. **Scan**: production URL (60%), content (75%) and image (90%) discovery;
//!    suggestions become working defaults but setup stays incomplete
//!
//! # Public API
//! - [`Reconciler`]: Runs the phases against injected capabilities
//! - [`BootstrapReport`]: Final workspace, setup flag, token and phase log
//! - [`ScanSuggestions`]: Discovery results exposed for user choice

use crate::core::cache::LocalCache;
use crate::core::capability::RepoScanner;
use crate::core::config_file::{LegacyConfig, PersistedConfig, WorkspaceConfig};
use crate::core::error::{GitCmsError, Result};
use crate::core::progress::ProgressTracker;
use crate::core::remote::{ConfigBackend, RemoteRead};
use crate::core::schema::{Field, Settings, SettingsPatch};
use crate::core::workspace::{CollectionLayout, Workspace, WorkspaceStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSuggestions {
    pub production_url: Option<String>,
    pub project_type: Option<String>,
    pub content_directories: Vec<String>,
    pub image_directories: Vec<String>,
}

impl ScanSuggestions {
    /// First suggestion for each field, valid values only
    pub fn to_patch(&self) -> SettingsPatch {
        let mut patch = SettingsPatch::new();
        if let Some(url) = &self.production_url {
            patch.insert(Field::DomainUrl, url.as_str().into());
        }
        if let Some(project_type) = &self.project_type {
            patch.insert(Field::ProjectType, project_type.as_str().into());
        }
        if let Some(posts) = self.content_directories.first() {
            patch.insert(Field::PostsPath, posts.as_str().into());
        }
        if let Some(images) = self.image_directories.first() {
            patch.insert(Field::ImagesPath, images.as_str().into());
        }
        patch.valid_subset()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    /// A v2 remote document was loaded
    RemoteWorkspace,
    /// A v1 remote document merged over the cache supplied the mandatory fields
    RemoteMerged,
    /// No usable remote document; the cache alone was enough
    CacheSufficient,
    /// Discovery ran; the user still has to confirm setup
    Scanned,
    ScanFailed { message: String },
}

/// Snapshot recorded at the end of each phase
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseResult {
    Init { restored_collections: usize },
    RemoteLoad { version: Option<u32>, unavailable: Option<String> },
    CacheMerge { cached_fields: usize },
    RemoteMerge { applied: usize, sufficient: bool },
    CacheSufficiency { sufficient: bool },
    Scan { suggestions: ScanSuggestions },
    ScanFailed { message: String },
}

#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub workspace: Workspace,
    pub setup_complete: bool,
    pub outcome: BootstrapOutcome,
    pub token: Option<String>,
    pub remote_version: Option<u32>,
    pub suggestions: Option<ScanSuggestions>,
    pub phases: Vec<PhaseResult>,
}

enum RemoteState {
    Workspace(WorkspaceConfig),
    Legacy(LegacyConfig),
    Missing,
    Unavailable(String),
}

struct RemoteSnapshot {
    state: RemoteState,
    token: Option<String>,
}

impl RemoteSnapshot {
    fn version(&self) -> Option<u32> {
        match self.state {
            RemoteState::Workspace(_) => Some(crate::core::config_file::WORKSPACE_VERSION),
            RemoteState::Legacy(_) => Some(crate::core::config_file::LEGACY_VERSION),
            _ => None,
        }
    }

    fn result(&self) -> PhaseResult {
        PhaseResult::RemoteLoad {
            version: self.version(),
            unavailable: match &self.state {
                RemoteState::Unavailable(reason) => Some(reason.clone()),
                _ => None,
            },
        }
    }
}

pub struct Reconciler<'a> {
    repository_id: &'a str,
    backend: &'a dyn ConfigBackend,
    cache: &'a LocalCache,
    scanner: &'a dyn RepoScanner,
    progress: &'a mut ProgressTracker,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        repository_id: &'a str,
        backend: &'a dyn ConfigBackend,
        cache: &'a LocalCache,
        scanner: &'a dyn RepoScanner,
        progress: &'a mut ProgressTracker,
    ) -> Self {
        Self {
            repository_id,
            backend,
            cache,
            scanner,
            progress,
        }
    }

    /// Run every phase and leave the reconciled workspace in `store`
    pub fn run(mut self, store: &mut WorkspaceStore) -> BootstrapReport {
        log::debug!("Bootstrapping workspace for {}", self.repository_id);
        let mut phases = Vec::new();

        let base = self.init(store);
        phases.push(PhaseResult::Init {
            restored_collections: base.collections.len(),
        });

        self.progress.advance("Reading remote configuration", 5);
        let remote = self.load_remote();
        phases.push(remote.result());

        let mut report = BootstrapReport {
            workspace: base,
            setup_complete: false,
            outcome: BootstrapOutcome::Scanned,
            token: remote.token.clone(),
            remote_version: remote.version(),
            suggestions: None,
            phases: Vec::new(),
        };

        if let RemoteState::Workspace(config) = &remote.state {
            let local_active = report.workspace.active_collection_id.take();
            report.workspace = config.to_workspace(self.repository_id);
            // A local selection wins while it still names a remote collection
            if let Some(id) = local_active {
                if report.workspace.collection(&id).is_some() {
                    report.workspace.active_collection_id = Some(id);
                }
            }
            self.mirror(&report.workspace.settings.to_patch());
            self.progress.complete("Configuration loaded");
            report.setup_complete = true;
            report.outcome = BootstrapOutcome::RemoteWorkspace;
            return self.finish(store, report, phases);
        }

        // Collections survive only when the remote could not be consulted
        if !matches!(remote.state, RemoteState::Unavailable(_)) {
            report.workspace.set_collections(Vec::new());
        }

        let (cached, cached_layout) = self.load_cache();
        phases.push(PhaseResult::CacheMerge {
            cached_fields: cached.len(),
        });
        let mut draft = cached;

        if let RemoteState::Legacy(legacy) = &remote.state {
            let (merged, applied) = self.merge_legacy(&draft, legacy, cached_layout);
            let sufficient = merged.has_mandatory();
            phases.push(PhaseResult::RemoteMerge {
                applied,
                sufficient,
            });
            draft = merged;

            if sufficient {
                report.workspace.settings = Settings::from_patch(&draft);
                self.progress.complete("Configuration loaded");
                report.setup_complete = true;
                report.outcome = BootstrapOutcome::RemoteMerged;
                return self.finish(store, report, phases);
            }
        } else {
            let sufficient = draft.has_mandatory();
            phases.push(PhaseResult::CacheSufficiency { sufficient });

            if sufficient {
                report.workspace.settings = Settings::from_patch(&draft);
                self.progress.complete("Loaded cached settings");
                report.setup_complete = true;
                report.outcome = BootstrapOutcome::CacheSufficient;
                return self.finish(store, report, phases);
            }
        }

        match self.scan() {
            Ok(suggestions) => {
                draft.fill_missing(&suggestions.to_patch());
                self.progress.complete("Scan complete");
                phases.push(PhaseResult::Scan {
                    suggestions: suggestions.clone(),
                });
                report.suggestions = Some(suggestions);
                report.outcome = BootstrapOutcome::Scanned;
            }
            Err(e) => {
                let message = e.to_string();
                log::warn!("Bootstrap scan failed: {message}");
                self.progress.fail(&message);
                phases.push(PhaseResult::ScanFailed {
                    message: message.clone(),
                });
                report.outcome = BootstrapOutcome::ScanFailed { message };
            }
        }

        report.workspace.settings = Settings::from_patch(&draft);
        self.finish(store, report, phases)
    }

    fn init(&self, store: &mut WorkspaceStore) -> Workspace {
        let workspace = store.init_workspace(self.repository_id);
        if !workspace.has_collections() {
            if let Some(persisted) = self.cache.load_workspace(self.repository_id) {
                log::debug!(
                    "Restored persisted workspace with {} collections",
                    persisted.collections.len()
                );
                *workspace = persisted;
            }
        }
        workspace.clone()
    }

    fn load_remote(&self) -> RemoteSnapshot {
        let (state, token) = match self.backend.load() {
            RemoteRead::Found { document, token } => match PersistedConfig::parse(&document) {
                Ok(PersistedConfig::Workspace(config)) => (RemoteState::Workspace(config), Some(token)),
                Ok(PersistedConfig::Legacy(config)) => (RemoteState::Legacy(config), Some(token)),
                Err(e) => {
                    log::warn!("Ignoring unreadable remote config {}: {}", self.backend.location(), e);
                    (RemoteState::Unavailable(e.to_string()), Some(token))
                }
            },
            RemoteRead::NotFound => (RemoteState::Missing, None),
            RemoteRead::Unavailable(reason) => (RemoteState::Unavailable(reason), None),
        };
        RemoteSnapshot { state, token }
    }

    fn load_cache(&mut self) -> (SettingsPatch, CollectionLayout) {
        self.progress.advance("Loading cached settings", 10);
        let cached = self.cache.load(self.repository_id);
        let layout = self.cache.load_layout(self.repository_id);
        self.progress.advance("Cached settings loaded", 20);
        (cached, layout)
    }

    /// Overlay valid legacy values on the draft, then mirror the result and
    /// the document's layout into the cache. The document's template and table
    /// layout replace cached ones.
    fn merge_legacy(
        &mut self,
        draft: &SettingsPatch,
        legacy: &LegacyConfig,
        cached_layout: CollectionLayout,
    ) -> (SettingsPatch, usize) {
        self.progress.advance("Merging remote configuration", 40);
        let mut merged = draft.clone();
        let applied = merged.overlay_valid(&legacy.to_patch());
        self.mirror(&merged);

        // Remote layout wins; the cache only fills fields the document lacks
        let layout = legacy.layout().or(cached_layout);
        if !layout.is_empty() {
            if let Err(e) = self.cache.save_layout(self.repository_id, &layout) {
                log::warn!("Failed to cache collection layout: {e}");
            }
        }
        (merged, applied)
    }

    fn scan(&mut self) -> Result<ScanSuggestions> {
        let step = |step: &'static str| move |e: GitCmsError| match e {
            GitCmsError::ScanFailure { .. } => e,
            other => GitCmsError::scan_failure(step, other),
        };

        self.progress.advance("Looking for production URL", 60);
        let production_url = self
            .scanner
            .find_production_url()
            .map_err(step("probing the production URL"))?;

        self.progress.advance("Scanning for content directories", 75);
        let content_directories = self
            .scanner
            .scan_for_content_directories()
            .map_err(step("scanning for content"))?;
        let project_type = self
            .scanner
            .detect_project_type()
            .map_err(step("detecting the project type"))?;

        self.progress.advance("Scanning for image directories", 90);
        let image_directories = self
            .scanner
            .scan_for_image_directories()
            .map_err(step("scanning for images"))?;

        Ok(ScanSuggestions {
            production_url,
            project_type,
            content_directories,
            image_directories,
        })
    }

    fn mirror(&self, patch: &SettingsPatch) {
        if let Err(e) = self.cache.save_patch(self.repository_id, patch) {
            log::warn!("Failed to mirror settings into cache: {e}");
        }
    }

    fn finish(
        &self,
        store: &mut WorkspaceStore,
        mut report: BootstrapReport,
        phases: Vec<PhaseResult>,
    ) -> BootstrapReport {
        report.phases = phases;
        if let Err(e) = self.cache.save_workspace(&report.workspace) {
            log::warn!("Failed to persist workspace: {e}");
        }
        store.replace(report.workspace.clone());
        log::debug!(
            "Bootstrap finished: {:?}, setup complete: {}",
            report.outcome,
            report.setup_complete
        );
        report
    }
}
