//! Remote configuration store.
//!
//! Reads and writes the single configuration document kept in the managed
//! repository through an injected [`GitFiles`] capability.
//!
//! # Public API
//! - [`RemoteRead`]: Outcome of a read; failures never propagate as errors
//! - [`ConfigBackend`]: Storage strategy for the configuration document
//! - [`RemoteConfigStore`]: [`ConfigBackend`] over [`GitFiles`]
//!
//! # Failure Policy
//! - **Reads**: any failure (I/O, malformed JSON) becomes [`RemoteRead::Unavailable`]
//! - **Writes**: a stale token surfaces as `ConcurrencyConflict`, anything else
//!   as `RemoteUnavailable`; no retries

use crate::core::capability::GitFiles;
use crate::core::config_file::{validate_document, PersistedConfig};
use crate::core::error::{GitCmsError, Result};
use serde_json::Value;
use std::rc::Rc;

pub const DEFAULT_CONFIG_PATH: &str = ".gitcms.json";

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRead {
    Found { document: Value, token: String },
    NotFound,
    Unavailable(String),
}

impl RemoteRead {
    pub fn token(&self) -> Option<&str> {
        match self {
            RemoteRead::Found { token, .. } => Some(token),
            _ => None,
        }
    }
}

/// Where the configuration document lives and how it is exchanged
pub trait ConfigBackend {
    /// Human-readable location, for messages
    fn location(&self) -> &str;

    fn load(&self) -> RemoteRead;

    /// Write the document, updating when `token` is given and creating
    /// otherwise. Returns the new token.
    fn save(&self, config: &PersistedConfig, message: &str, token: Option<&str>)
        -> Result<String>;

    /// Remove the document. A missing document is not an error.
    fn remove(&self, message: &str, token: Option<&str>) -> Result<()>;

    fn export(&self, config: &PersistedConfig) -> Result<String> {
        config.to_json_string()
    }

    /// Parse and validate a document for import
    fn import(&self, content: &str) -> Result<PersistedConfig> {
        let document: Value = serde_json::from_str(content)
            .map_err(|e| GitCmsError::InvalidConfig(e.to_string()))?;
        if !self.validate(&document) {
            return Err(GitCmsError::InvalidConfig(
                "document contains invalid settings values".to_string(),
            ));
        }
        PersistedConfig::parse(&document)
    }

    fn validate(&self, document: &Value) -> bool {
        validate_document(document)
    }
}

pub struct RemoteConfigStore {
    files: Rc<dyn GitFiles>,
    path: String,
}

impl RemoteConfigStore {
    pub fn new(files: Rc<dyn GitFiles>, path: impl Into<String>) -> Self {
        Self {
            files,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn read(&self) -> RemoteRead {
        // Token first: if the file changes between the two calls the older
        // token makes the next write conflict instead of overwriting
        let token = match self.files.get_file_token(&self.path) {
            Ok(Some(token)) => token,
            Ok(None) => return RemoteRead::NotFound,
            Err(e) => {
                log::warn!("Remote config token read failed for {}: {}", self.path, e);
                return RemoteRead::Unavailable(e.to_string());
            }
        };

        let content = match self.files.get_file_content(&self.path) {
            Ok(Some(content)) => content,
            Ok(None) => return RemoteRead::NotFound,
            Err(e) => {
                log::warn!("Remote config read failed for {}: {}", self.path, e);
                return RemoteRead::Unavailable(e.to_string());
            }
        };

        match serde_json::from_str(&content) {
            Ok(document) => RemoteRead::Found { document, token },
            Err(e) => {
                log::warn!("Remote config {} is not valid JSON: {}", self.path, e);
                RemoteRead::Unavailable(format!("malformed JSON: {e}"))
            }
        }
    }

    pub fn write(&self, content: &str, message: &str, token: Option<&str>) -> Result<String> {
        let result = match token {
            Some(token) => self.files.update_file(&self.path, content, message, token),
            None => self.files.create_file(&self.path, content, message),
        };
        result.map_err(|e| self.classify(e))
    }

    pub fn delete(&self, message: &str, token: Option<&str>) -> Result<()> {
        let token = match token {
            Some(token) => token.to_string(),
            None => match self.files.get_file_token(&self.path) {
                Ok(Some(token)) => token,
                Ok(None) => return Ok(()),
                Err(e) => return Err(self.classify(e)),
            },
        };
        self.files
            .delete_file(&self.path, &token, message)
            .map_err(|e| self.classify(e))
    }

    fn classify(&self, error: GitCmsError) -> GitCmsError {
        match error {
            GitCmsError::ConcurrencyConflict { .. } => error,
            other => {
                log::error!("Remote write to {} failed: {}", self.path, other);
                GitCmsError::remote_unavailable(other)
            }
        }
    }
}

impl ConfigBackend for RemoteConfigStore {
    fn location(&self) -> &str {
        &self.path
    }

    fn load(&self) -> RemoteRead {
        self.read()
    }

    fn save(&self, config: &PersistedConfig, message: &str, token: Option<&str>) -> Result<String> {
        self.write(&config.to_json_string()?, message, token)
    }

    fn remove(&self, message: &str, token: Option<&str>) -> Result<()> {
        self.delete(message, token)
    }
}
