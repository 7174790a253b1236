//! Core functionality for the gitcms tool.
//!
//! This module provides the configuration engine: schema and persisted formats,
//! the local cache, the remote store, the sync lock, the workspace model and
//! the bootstrap reconciliation, plus the git backend and CLI output helpers.

pub mod cache;
pub mod capability;
pub mod command_init;
pub mod config;
pub mod config_file;
pub mod dirs;
pub mod error;
pub mod git;
pub mod output;
pub mod progress;
pub mod reconcile;
pub mod remote;
pub mod scan;
pub mod schema;
pub mod session;
pub mod sync_lock;
pub mod workspace;

// === Error handling ===
// Core error types and result type used throughout the application
pub use error::{GitCmsError, Result};

// === Schema ===
// Field definitions, validation and defaults
pub use schema::{defaults, validate, validate_all, Field, Settings, SettingsPatch};

// === Persisted formats ===
// v1/v2 configuration documents and the upgrade between them
pub use config_file::{upgrade_v1_to_v2, LegacyConfig, PersistedConfig, WorkspaceConfig};

// === Storage ===
// Local cache over injected key/value stores, remote store over git files
pub use cache::{FileKeyValueStore, KeyValueStore, LocalCache, MemoryKeyValueStore};
pub use capability::{EntryKind, GitFiles, RepoEntry, RepoScanner};
pub use remote::{ConfigBackend, RemoteConfigStore, RemoteRead};

// === Git operations ===
pub use git::GitRepo;

// === Workspace model ===
pub use workspace::{Collection, CollectionLayout, CollectionPatch, Workspace, WorkspaceStore};

// === Sync and reconciliation ===
pub use progress::{NoOpProgressReporter, ProgressReporter, ProgressTracker, ScanProgress};
pub use reconcile::{BootstrapOutcome, BootstrapReport, PhaseResult, Reconciler, ScanSuggestions};
pub use session::CmsSession;
pub use sync_lock::{SyncGuard, SyncLock, SyncStatus};

// === Command initialization ===
pub use command_init::{SessionContext, SessionInit};

// === Configuration ===
pub use config::AppConfig;

// === Output formatting ===
// Unified output formatting for consistent CLI presentation
pub use output::{
    print_error, print_error_with_structured_usage, print_info, print_key_value,
    print_section_header, print_success, print_warning,
};
