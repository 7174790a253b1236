//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`GitCmsError`] which covers every failure mode of the
//! configuration engine. It uses `thiserror` for ergonomic error definitions
//! and includes constructors for the common failure scenarios.
//!
//! # Public API
//! - [`GitCmsError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, GitCmsError>`
//!
//! # Error Categories
//! - **Validation**: a settings value rejected by the schema
//! - **Remote tier**: remote unavailable, stale concurrency token
//! - **Sync**: another remote write already in flight
//! - **Discovery**: a repository scan step failed
//! - **Cache operations**: directory, serialization and file system errors

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for gitcms
#[derive(Error, Debug)]
pub enum GitCmsError {
    // Git repository errors
    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Schema errors
    #[error("Invalid value for '{field}': {value}")]
    Validation { field: String, value: String },

    #[error("Unknown settings field '{0}'")]
    UnknownField(String),

    #[error("Invalid configuration document: {0}")]
    InvalidConfig(String),

    // Remote tier errors
    #[error("Remote configuration unavailable: {reason}")]
    RemoteUnavailable { reason: String },

    #[error("'{path}' was changed by someone else. Reopen the repository and try again.")]
    ConcurrencyConflict { path: String },

    #[error("Remote file not found: {path}")]
    RemoteNotFound { path: String },

    // Sync lock
    #[error("Another sync is in progress{}", .status.as_deref().map(|s| format!(" ({s})")).unwrap_or_default())]
    LockBusy { status: Option<String> },

    // Discovery
    #[error("Repository scan failed while {step}: {message}")]
    ScanFailure { step: String, message: String },

    // Workspace errors
    #[error("No workspace is open")]
    NoWorkspace,

    #[error("Collection not found: {id}")]
    CollectionNotFound { id: String },

    #[error("Setup is not complete. Run 'gitcms setup' first.")]
    SetupIncomplete,

    // Cache errors
    #[error("Could not find cache directory")]
    CacheDirectoryNotFound,

    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read cache file '{path}': {source}")]
    CacheReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation canceled by user")]
    Canceled,

    // JSON serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using GitCmsError
pub type Result<T> = std::result::Result<T, GitCmsError>;

impl GitCmsError {
    /// Create a validation error for a rejected value
    pub fn validation(field: impl Into<String>, value: impl ToString) -> Self {
        Self::Validation {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Create a remote unavailable error
    pub fn remote_unavailable(reason: impl ToString) -> Self {
        Self::RemoteUnavailable {
            reason: reason.to_string(),
        }
    }

    /// Create a concurrency conflict error for a remote path
    pub fn concurrency_conflict(path: impl Into<String>) -> Self {
        Self::ConcurrencyConflict { path: path.into() }
    }

    /// Create a lock busy error carrying the in-flight status message
    pub fn lock_busy(status: Option<String>) -> Self {
        Self::LockBusy { status }
    }

    /// Create a scan failure error for a discovery step
    pub fn scan_failure(step: impl Into<String>, message: impl ToString) -> Self {
        Self::ScanFailure {
            step: step.into(),
            message: message.to_string(),
        }
    }

    /// Create a collection not found error
    pub fn collection_not_found(id: impl Into<String>) -> Self {
        Self::CollectionNotFound { id: id.into() }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache read failed error
    pub fn cache_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheReadFailed {
            path: path.into(),
            source,
        }
    }

    /// True for failures the user should act on (busy lock, failed scan, conflicts)
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            Self::LockBusy { .. } | Self::ScanFailure { .. } | Self::ConcurrencyConflict { .. }
        )
    }
}
