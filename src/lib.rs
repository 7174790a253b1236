//! gitcms - configuration reconciliation and sync for git-backed content sites.
//!
//! This library keeps a site's CMS settings in one versioned JSON document
//! inside the repository, mirrors them into a fast local cache and falls back
//! to scanning the repository when neither source is usable.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - Settings schema, validation and the v1/v2 document formats
//! - The local cache and remote config store
//! - The single-flight sync lock
//! - Workspace and collection management
//! - Bootstrap reconciliation and the [`CmsSession`] facade

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Sync and reconciliation
    BootstrapOutcome,
    BootstrapReport,
    CmsSession,
    // Workspace model
    Collection,
    CollectionPatch,
    // Storage
    ConfigBackend,
    Field,
    // Error handling
    GitCmsError,
    GitFiles,
    // Git operations
    GitRepo,
    LocalCache,
    PersistedConfig,
    RemoteConfigStore,
    RepoScanner,
    Result,
    // Schema
    Settings,
    SettingsPatch,
    SyncLock,
    Workspace,
};
