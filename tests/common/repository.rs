//! Git repository management and setup utilities
//!
//! Provides functions for creating test repositories and running the
//! `gitcms` binary against them with isolated config and cache directories.

#![allow(dead_code)]

use gitcms::core::error::{GitCmsError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test repository plus a separate home for config and cache. Both
/// `TempDir`s must stay alive for the duration of the test.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
    pub home: TempDir,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.path().join("config")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.home.path().join("cache")
    }

    /// `gitcms` command running inside the repository
    pub fn gitcms(&self) -> Result<assert_cmd::Command> {
        self.gitcms_in(&self.path)
    }

    /// `gitcms` command running in `dir` with this repo's isolated home
    pub fn gitcms_in(&self, dir: &Path) -> Result<assert_cmd::Command> {
        let mut cmd = assert_cmd::Command::cargo_bin("gitcms")
            .map_err(|e| GitCmsError::config_error(format!("gitcms binary not found: {e}")))?;
        cmd.current_dir(dir)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config_dir())
            .env("XDG_CACHE_HOME", self.cache_dir())
            .env("GITCMS_CACHE_DIR", self.cache_dir().join("gitcms"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        Ok(cmd)
    }

    pub fn read_file(&self, filename: &str) -> Option<String> {
        fs::read_to_string(self.path.join(filename)).ok()
    }

    /// Number of commits reachable from HEAD
    pub fn commit_count(&self) -> usize {
        Command::new("git")
            .args(["rev-list", "--count", "HEAD"])
            .current_dir(&self.path)
            .output()
            .ok()
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .and_then(|count| count.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn last_commit_message(&self) -> String {
        Command::new("git")
            .args(["log", "-1", "--format=%s"])
            .current_dir(&self.path)
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_default()
    }
}

fn git(repo_path: &Path, args: &[&str]) -> Result<()> {
    Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .map_err(GitCmsError::Io)?;
    Ok(())
}

/// Sets up a fresh git repository with a committer identity configured
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new().map_err(GitCmsError::Io)?;
    let home = TempDir::new().map_err(GitCmsError::Io)?;
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init"])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
        home,
    })
}

/// Creates a file, creating parent directories as needed
pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    let path = repo_path.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(GitCmsError::Io)?;
    }
    fs::write(path, content).map_err(GitCmsError::Io)?;
    Ok(())
}

pub fn git_add(repo_path: &Path, filename: &str) -> Result<()> {
    git(repo_path, &["add", filename])
}

pub fn git_commit(repo_path: &Path, message: &str) -> Result<()> {
    git(repo_path, &["commit", "-m", message])
}

/// Writes every file, then commits them together
pub fn commit_files(repo_path: &Path, files: &[(&str, &str)], message: &str) -> Result<()> {
    for (filename, content) in files {
        create_file(repo_path, filename, content)?;
    }
    git_add(repo_path, ".")?;
    git_commit(repo_path, message)
}
