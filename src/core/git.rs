//! Local git repository backend.
//!
//! This module provides [`GitRepo`], a `git2` wrapper that implements the
//! [`GitFiles`] capability against a local clone. The committed `HEAD` tree is
//! the authoritative copy: reads come from `HEAD`, writes stage the file and
//! commit it on `HEAD` with the requested message.
//!
//! # Public API
//! - [`GitRepo`]: Repository handle, identity and file I/O
//! - [`parse_owner_repo`]: Extract `owner/name` from a remote URL
//!
//! # Concurrency Tokens
//! The token of a file is the object id of its blob at `HEAD`. A commit made
//! by anyone else changes the blob id, so a stale token is detected before any
//! write touches the index.

use crate::core::capability::GitFiles;
use crate::core::error::{GitCmsError, Result};
use git2::{Commit, ErrorCode, ObjectType, Oid, Repository, Signature, Tree};
use std::fs;
use std::path::{Path, PathBuf};

const FALLBACK_AUTHOR_NAME: &str = "gitcms";
const FALLBACK_AUTHOR_EMAIL: &str = "gitcms@localhost";

pub struct GitRepo {
    repo: Repository,
    author: Option<(String, String)>,
    pub(crate) scan_file_types: Option<(String, String)>,
}

impl GitRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitCmsError::NotInGitRepo,
            _ => GitCmsError::Git(e),
        })?;
        Ok(GitRepo {
            repo,
            author: None,
            scan_file_types: None,
        })
    }

    /// Commit as `name <email>` instead of the repository's configured identity
    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author = Some((name.into(), email.into()));
        self
    }

    pub fn get_repository(&self) -> &Repository {
        &self.repo
    }

    pub fn workdir(&self) -> Result<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| GitCmsError::config_error("Repository has no working directory"))
    }

    pub fn get_repo_path(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }

    /// `owner/name` of the `origin` remote, else an md5 hash of the repository path
    pub fn repository_id(&self) -> String {
        let from_origin = self
            .repo
            .find_remote("origin")
            .ok()
            .and_then(|remote| remote.url().and_then(parse_owner_repo));

        from_origin.unwrap_or_else(|| {
            let path = self.get_repo_path();
            let hash = format!("{:x}", md5::compute(path.to_string_lossy().as_bytes()));
            log::debug!("No usable origin remote, using path hash {hash} for {path:?}");
            hash
        })
    }

    /// Tree of the commit at `HEAD`, or `None` for a repository with no commits
    pub(crate) fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        Ok(self.head_commit()?.map(|commit| commit.tree()).transpose()?)
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Blob id and content of `path` at `HEAD`
    fn blob_at_head(&self, path: &str) -> Result<Option<(Oid, Vec<u8>)>> {
        let Some(tree) = self.head_tree()? else {
            return Ok(None);
        };
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let blob = self.repo.find_blob(entry.id())?;
        Ok(Some((blob.id(), blob.content().to_vec())))
    }

    fn signature(&self) -> Result<Signature<'static>> {
        if let Some((name, email)) = &self.author {
            return Ok(Signature::now(name, email)?);
        }
        match self.repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(_) => {
                log::debug!("No git identity configured, committing as {FALLBACK_AUTHOR_NAME}");
                Ok(Signature::now(FALLBACK_AUTHOR_NAME, FALLBACK_AUTHOR_EMAIL)?)
            }
        }
    }

    fn verify_token(&self, path: &str, token: &str) -> Result<()> {
        match self.blob_at_head(path)? {
            None => Err(GitCmsError::RemoteNotFound {
                path: path.to_string(),
            }),
            Some((oid, _)) if oid.to_string() != token => {
                log::warn!("Stale token for {path}: expected {oid}, got {token}");
                Err(GitCmsError::concurrency_conflict(path))
            }
            Some(_) => Ok(()),
        }
    }

    /// Write (or remove, when `content` is `None`) a file and commit it on `HEAD`
    fn commit_file(&self, path: &str, content: Option<&str>, message: &str) -> Result<()> {
        let relative = Path::new(path);
        let absolute = self.workdir()?.join(relative);
        let mut index = self.repo.index()?;

        match content {
            Some(content) => {
                if let Some(parent) = absolute.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&absolute, content)?;
                index.add_path(relative)?;
            }
            None => {
                if absolute.exists() {
                    fs::remove_file(&absolute)?;
                }
                index.remove_path(relative)?;
            }
        }
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.signature()?;
        let parent = self.head_commit()?;
        let parents: Vec<&Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        log::debug!("Committed {path} as {oid}: {message}");
        Ok(())
    }
}

impl GitFiles for GitRepo {
    fn get_file_content(&self, path: &str) -> Result<Option<String>> {
        match self.blob_at_head(path)? {
            Some((_, bytes)) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| GitCmsError::remote_unavailable(format!("{path} is not valid UTF-8"))),
            None => Ok(None),
        }
    }

    fn get_file_token(&self, path: &str) -> Result<Option<String>> {
        Ok(self.blob_at_head(path)?.map(|(oid, _)| oid.to_string()))
    }

    fn create_file(&self, path: &str, content: &str, message: &str) -> Result<String> {
        if self.blob_at_head(path)?.is_some() {
            return Err(GitCmsError::concurrency_conflict(path));
        }
        self.commit_file(path, Some(content), message)?;
        Ok(Oid::hash_object(ObjectType::Blob, content.as_bytes())?.to_string())
    }

    fn update_file(&self, path: &str, content: &str, message: &str, token: &str) -> Result<String> {
        self.verify_token(path, token)?;
        self.commit_file(path, Some(content), message)?;
        Ok(Oid::hash_object(ObjectType::Blob, content.as_bytes())?.to_string())
    }

    fn delete_file(&self, path: &str, token: &str, message: &str) -> Result<()> {
        self.verify_token(path, token)?;
        self.commit_file(path, None, message)
    }
}

/// `owner/name` from an https or scp-style remote URL
pub fn parse_owner_repo(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let without_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest)
        .replace(':', "/");

    // host, then at least owner and name
    let segments: Vec<&str> = without_scheme.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [_, .., owner, name] => Some(format!("{owner}/{name}")),
        _ => None,
    }
}
