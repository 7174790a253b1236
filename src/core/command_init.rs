//! Centralized session setup for commands.
//!
//! Every command that works on a repository needs the same steps, gathered
//! here in [`SessionInit`].
//!
//! # Initialization Steps
//! 1. **Git repository validation**: Ensure we're in a valid git repository
//! 2. **App config**: Load `config.json`, creating it on first run
//! 3. **Capabilities**: Wire the git backend, scanner and file cache
//! 4. **Bootstrap**: Reconcile cache, remote config and scan

use crate::core::cache::{FileKeyValueStore, LocalCache};
use crate::core::capability::RepoScanner;
use crate::core::config::AppConfig;
use crate::core::error::{GitCmsError, Result};
use crate::core::git::GitRepo;
use crate::core::progress::{ProgressReporter, ProgressTracker, ScanProgress};
use crate::core::reconcile::BootstrapReport;
use crate::core::schema::Settings;
use crate::core::remote::RemoteConfigStore;
use crate::core::session::CmsSession;
use crate::core::sync_lock::SyncLock;
use colored::*;
use std::env;
use std::path::Path;
use std::rc::Rc;

/// Prints each progress change as a muted `[nn%] phase` line
pub struct ConsoleProgressReporter;

impl ProgressReporter for ConsoleProgressReporter {
    fn report(&self, progress: &ScanProgress) {
        if let Some(phase) = &progress.phase {
            println!("{}", format!("  [{:>3}%] {}", progress.progress, phase).bright_black());
        }
    }
}

pub struct SessionContext {
    pub app_config: AppConfig,
    pub session: CmsSession,
    pub report: BootstrapReport,
}

pub struct SessionInit;

impl SessionInit {
    /// Open the repository containing the current directory and bootstrap it
    pub fn initialize(show_progress: bool) -> Result<SessionContext> {
        let current_dir = env::current_dir()?;
        let app_config = AppConfig::load_or_create()?;
        Self::initialize_at(&current_dir, app_config, show_progress)
    }

    pub fn initialize_at(
        path: &Path,
        app_config: AppConfig,
        show_progress: bool,
    ) -> Result<SessionContext> {
        let mut session = Self::open_session(path, &app_config)?;
        if show_progress {
            session = session.with_progress(ProgressTracker::new(Box::new(ConsoleProgressReporter)));
        }
        let report = session.bootstrap();

        log::debug!(
            "Session ready for {}: {:?}",
            session.repository_id(),
            report.outcome
        );
        Ok(SessionContext {
            app_config,
            session,
            report,
        })
    }

    /// Wire capabilities for the repository at `path` without bootstrapping
    pub fn open_session(path: &Path, app_config: &AppConfig) -> Result<CmsSession> {
        let mut repo = GitRepo::open(path).map_err(|e| match e {
            GitCmsError::NotInGitRepo => e,
            other => {
                log::debug!("Failed to open repository: {other}");
                GitCmsError::NotInGitRepo
            }
        })?;
        if let Some(author) = &app_config.commit_author {
            repo = repo.with_author(&author.name, &author.email);
        }
        let repository_id = repo.repository_id();

        let cache_dir = app_config.resolve_cache_dir()?;
        let cache = LocalCache::new(Box::new(FileKeyValueStore::open(&cache_dir)?));

        // Scan with the file types the user already chose, if any
        let draft = Settings::from_patch(&cache.load(&repository_id));
        let repo = repo.with_scan_file_types(draft.post_file_types, draft.image_file_types);
        let repo = Rc::new(repo);
        let scanner: Rc<dyn RepoScanner> = repo.clone();

        Ok(CmsSession::new(
            repository_id,
            Box::new(RemoteConfigStore::new(repo, app_config.config_path.clone())),
            scanner,
            cache,
            SyncLock::process(),
        ))
    }

    /// Open the cache without a repository, for global preferences
    pub fn open_cache(app_config: &AppConfig) -> Result<LocalCache> {
        let store = FileKeyValueStore::open(&app_config.resolve_cache_dir()?)?;
        Ok(LocalCache::new(Box::new(store)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reconcile::BootstrapOutcome;
    use std::process::Command;
    use tempfile::TempDir;

    fn app_config_in(cache: &TempDir) -> AppConfig {
        AppConfig {
            cache_dir: Some(cache.path().to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_initialize_outside_git_repository() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let result = SessionInit::initialize_at(dir.path(), app_config_in(&cache), false);
        assert!(matches!(result, Err(GitCmsError::NotInGitRepo)));
    }

    #[test]
    fn test_initialize_empty_repository_scans() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        Command::new("git").args(["init"]).current_dir(dir.path()).output().unwrap();

        let context = SessionInit::initialize_at(dir.path(), app_config_in(&cache), false).unwrap();
        assert_eq!(context.report.outcome, BootstrapOutcome::Scanned);
        assert!(!context.session.is_setup_complete());
    }

    #[test]
    fn test_cached_file_types_drive_scan() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let path = dir.path();
        for args in [
            vec!["init"],
            vec!["config", "user.name", "Test User"],
            vec!["config", "user.email", "test@example.com"],
        ] {
            Command::new("git").args(&args).current_dir(path).output().unwrap();
        }
        for file in ["content/posts/a.md", "content/pages/a.adoc", "content/pages/b.adoc"] {
            let full = path.join(file);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, "").unwrap();
        }
        Command::new("git").args(["add", "."]).current_dir(path).output().unwrap();
        Command::new("git")
            .args(["commit", "-m", "Initial commit"])
            .current_dir(path)
            .output()
            .unwrap();

        let config = app_config_in(&cache);
        let repository_id = GitRepo::open(path).unwrap().repository_id();
        SessionInit::open_cache(&config)
            .unwrap()
            .save_patch(
                &repository_id,
                &crate::core::schema::SettingsPatch::new()
                    .with(crate::core::schema::Field::PostFileTypes, ".adoc"),
            )
            .unwrap();

        let context = SessionInit::initialize_at(path, config, false).unwrap();
        let suggestions = context.session.suggestions().unwrap();
        assert_eq!(suggestions.content_directories, vec!["content/pages".to_string()]);
    }
}
