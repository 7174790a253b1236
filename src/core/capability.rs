//! Capabilities the engine is handed rather than implements.
//!
//! # Public API
//! - [`GitFiles`]: Read and write single files in the managed repository with
//!   optimistic concurrency tokens
//! - [`RepoScanner`]: Discover content/image directories and the production URL
//! - [`RepoEntry`], [`EntryKind`]: Directory listing entries
//!
//! A token is an opaque value identifying the exact content of a file as last
//! observed. Updating or deleting a file requires the token from a prior read;
//! a stale token is rejected with [`GitCmsError::ConcurrencyConflict`].
//!
//! [`GitCmsError::ConcurrencyConflict`]: crate::core::error::GitCmsError::ConcurrencyConflict

use crate::core::error::Result;

/// File I/O against the authoritative copy of the repository
pub trait GitFiles {
    /// File content, or `None` when the file does not exist
    fn get_file_content(&self, path: &str) -> Result<Option<String>>;

    /// Current concurrency token, or `None` when the file does not exist
    fn get_file_token(&self, path: &str) -> Result<Option<String>>;

    /// Create a new file. Fails with a conflict if it already exists.
    /// Returns the token of the written content.
    fn create_file(&self, path: &str, content: &str, message: &str) -> Result<String>;

    /// Replace an existing file whose current token must equal `token`
    fn update_file(&self, path: &str, content: &str, message: &str, token: &str)
        -> Result<String>;

    fn delete_file(&self, path: &str, token: &str, message: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
}

impl RepoEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Marker files identifying a site generator, checked in order
const PROJECT_MARKERS: &[(&str, &str)] = &[
    ("astro.config.", "astro"),
    ("next.config.", "next"),
    ("gatsby-config.", "gatsby"),
    (".eleventy.js", "eleventy"),
    ("eleventy.config.", "eleventy"),
    ("hugo.", "hugo"),
    ("_config.yml", "jekyll"),
];

/// Repository discovery used when neither cache nor remote config suffice
pub trait RepoScanner {
    fn find_production_url(&self) -> Result<Option<String>>;

    /// Candidate posts directories, best first
    fn scan_for_content_directories(&self) -> Result<Vec<String>>;

    /// Candidate image directories, best first
    fn scan_for_image_directories(&self) -> Result<Vec<String>>;

    /// Entries directly under `path` (`""` is the repository root)
    fn get_repo_contents(&self, path: &str) -> Result<Vec<RepoEntry>>;

    fn detect_project_type(&self) -> Result<Option<String>> {
        let root = self.get_repo_contents("")?;
        let detected = PROJECT_MARKERS.iter().find_map(|(marker, project_type)| {
            root.iter()
                .filter(|entry| !entry.is_dir())
                .any(|entry| entry.name.starts_with(marker))
                .then(|| project_type.to_string())
        });
        log::debug!("Detected project type: {detected:?}");
        Ok(detected)
    }
}
