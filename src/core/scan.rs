//! Repository discovery over the committed `HEAD` tree.
//!
//! Implements [`RepoScanner`] for [`GitRepo`]. Only committed files are
//! considered, so the suggestions match what the hosted site would build.

use crate::core::capability::{EntryKind, GitFiles, RepoEntry, RepoScanner};
use crate::core::error::{GitCmsError, Result};
use crate::core::git::GitRepo;
use crate::core::schema::Settings;
use git2::{ObjectType, TreeWalkMode, TreeWalkResult};
use std::collections::BTreeMap;
use std::path::Path;

const ASTRO_CONFIGS: &[&str] = &[
    "astro.config.mjs",
    "astro.config.js",
    "astro.config.ts",
    "astro.config.cjs",
];
const HUGO_CONFIGS: &[&str] = &["hugo.toml", "config.toml"];
/// Dependency and build output trees, never content
const VENDORED_DIRS: &[&str] = &["node_modules", "bower_components", "vendor", "_site", "dist"];

fn skipped_segment(segment: &str) -> bool {
    segment.starts_with('.') || VENDORED_DIRS.contains(&segment)
}

fn extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// First quoted value after `key` on a line starting with it
fn quoted_value(line: &str, key: &str) -> Option<String> {
    let rest = line.trim().strip_prefix(key)?;
    let rest = rest.trim_start().strip_prefix([':', '='])?.trim();
    let quote = rest.chars().next().filter(|c| matches!(c, '"' | '\'' | '`'));
    let value = match quote {
        Some(q) => rest[1..].split(q).next()?,
        None => rest.split_whitespace().next()?,
    };
    Some(value.trim_end_matches(',').to_string())
}

fn as_url(value: &str) -> Option<String> {
    let value = value.trim().trim_end_matches('/');
    (value.starts_with("http://") || value.starts_with("https://")).then(|| value.to_string())
}

impl GitRepo {
    /// Rank directories by these comma-separated extension lists instead of
    /// the defaults, typically the working `postFileTypes`/`imageFileTypes`
    pub fn with_scan_file_types(
        mut self,
        post_file_types: impl Into<String>,
        image_file_types: impl Into<String>,
    ) -> Self {
        self.scan_file_types = Some((post_file_types.into(), image_file_types.into()));
        self
    }

    fn scan_file_types(&self) -> (String, String) {
        self.scan_file_types.clone().unwrap_or_else(|| {
            let defaults = Settings::default();
            (defaults.post_file_types, defaults.image_file_types)
        })
    }

    /// Directories holding files with any of `extensions`, ranked by file
    /// count (descending) then path. Hidden and vendored directories and the
    /// root are skipped.
    fn rank_directories(&self, extensions: &[String], step: &str) -> Result<Vec<String>> {
        let tree = self
            .head_tree()
            .map_err(|e| GitCmsError::scan_failure(step, e))?;
        let Some(tree) = tree else {
            return Ok(Vec::new());
        };

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            let dir = dir.trim_end_matches('/');
            if dir.split('/').any(skipped_segment) {
                return TreeWalkResult::Skip;
            }
            if entry.kind() == Some(ObjectType::Blob) && !dir.is_empty() {
                let matches = entry
                    .name()
                    .and_then(|name| Path::new(name).extension())
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.contains(&ext.to_ascii_lowercase()));
                if matches {
                    *counts.entry(dir.to_string()).or_default() += 1;
                }
            }
            TreeWalkResult::Ok
        })
        .map_err(|e| GitCmsError::scan_failure(step, e))?;

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        log::debug!("{step}: {} candidate directories", ranked.len());
        Ok(ranked.into_iter().map(|(dir, _)| dir).collect())
    }

    fn read_optional(&self, path: &str) -> Option<String> {
        self.get_file_content(path).ok().flatten()
    }
}

impl RepoScanner for GitRepo {
    fn find_production_url(&self) -> Result<Option<String>> {
        if let Some(cname) = self.read_optional("CNAME") {
            if let Some(host) = cname.lines().map(str::trim).find(|l| !l.is_empty()) {
                return Ok(Some(format!("https://{host}")));
            }
        }

        if let Some(package) = self.read_optional("package.json") {
            let homepage = serde_json::from_str::<serde_json::Value>(&package)
                .ok()
                .and_then(|json| json.get("homepage")?.as_str().and_then(as_url));
            if homepage.is_some() {
                return Ok(homepage);
            }
        }

        let probes = ASTRO_CONFIGS
            .iter()
            .map(|file| (*file, "site"))
            .chain(HUGO_CONFIGS.iter().map(|file| (*file, "baseURL")))
            .chain([("_config.yml", "url")]);

        for (file, key) in probes {
            let Some(content) = self.read_optional(file) else {
                continue;
            };
            let url = content
                .lines()
                .filter_map(|line| quoted_value(line, key))
                .find_map(|value| as_url(&value));
            if url.is_some() {
                log::debug!("Production URL found in {file}");
                return Ok(url);
            }
        }
        Ok(None)
    }

    fn scan_for_content_directories(&self) -> Result<Vec<String>> {
        let (post_types, _) = self.scan_file_types();
        self.rank_directories(&extensions(&post_types), "scanning for content")
    }

    fn scan_for_image_directories(&self) -> Result<Vec<String>> {
        let (_, image_types) = self.scan_file_types();
        self.rank_directories(&extensions(&image_types), "scanning for images")
    }

    fn get_repo_contents(&self, path: &str) -> Result<Vec<RepoEntry>> {
        let step = "listing repository contents";
        let Some(root) = self.head_tree().map_err(|e| GitCmsError::scan_failure(step, e))? else {
            return Ok(Vec::new());
        };

        let path = path.trim_matches('/');
        let tree = if path.is_empty() {
            root
        } else {
            let entry = root
                .get_path(Path::new(path))
                .map_err(|e| GitCmsError::scan_failure(step, e))?;
            let object = entry
                .to_object(self.get_repository())
                .map_err(|e| GitCmsError::scan_failure(step, e))?;
            object
                .into_tree()
                .map_err(|_| GitCmsError::scan_failure(step, format!("{path} is not a directory")))?
        };

        Ok(tree
            .iter()
            .filter_map(|entry| {
                let name = entry.name()?.to_string();
                let kind = match entry.kind() {
                    Some(ObjectType::Tree) => EntryKind::Dir,
                    _ => EntryKind::File,
                };
                let full = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{path}/{name}")
                };
                Some(RepoEntry {
                    name,
                    path: full,
                    kind,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn repo_with_files(files: &[(&str, &str)]) -> (TempDir, GitRepo) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path();
        for args in [
            vec!["init"],
            vec!["config", "user.name", "Test User"],
            vec!["config", "user.email", "test@example.com"],
        ] {
            Command::new("git").args(&args).current_dir(path).output().unwrap();
        }
        for (file, content) in files {
            let full = path.join(file);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        Command::new("git").args(["add", "."]).current_dir(path).output().unwrap();
        Command::new("git")
            .args(["commit", "-m", "Initial commit"])
            .current_dir(path)
            .output()
            .unwrap();
        let repo = GitRepo::open(path).unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_content_directories_ranked_by_count() {
        let (_dir, repo) = repo_with_files(&[
            ("README.md", "root files are ignored"),
            ("content/notes/a.md", ""),
            ("content/posts/a.md", ""),
            ("content/posts/b.mdx", ""),
            (".github/TEMPLATE.md", ""),
        ]);
        assert_eq!(
            repo.scan_for_content_directories().unwrap(),
            vec!["content/posts".to_string(), "content/notes".to_string()]
        );
    }

    #[test]
    fn test_image_directories() {
        let (_dir, repo) = repo_with_files(&[
            ("static/images/a.PNG", ""),
            ("static/images/b.webp", ""),
            ("content/posts/cover.jpg", ""),
        ]);
        assert_eq!(
            repo.scan_for_image_directories().unwrap(),
            vec!["static/images".to_string(), "content/posts".to_string()]
        );
    }

    #[test]
    fn test_vendored_directories_skipped() {
        let (_dir, repo) = repo_with_files(&[
            ("node_modules/pkg/README.md", ""),
            ("node_modules/pkg/CHANGELOG.md", ""),
            ("node_modules/pkg/docs/a.md", ""),
            ("vendor/theme/logo.png", ""),
            ("src/content/blog/a.md", ""),
        ]);
        assert_eq!(
            repo.scan_for_content_directories().unwrap(),
            vec!["src/content/blog".to_string()]
        );
        assert!(repo.scan_for_image_directories().unwrap().is_empty());
    }

    #[test]
    fn test_configured_file_types_drive_ranking() {
        let (_dir, repo) = repo_with_files(&[
            ("content/posts/a.md", ""),
            ("content/pages/a.adoc", ""),
            ("content/pages/b.adoc", ""),
            ("assets/a.avif", ""),
        ]);
        let repo = repo.with_scan_file_types("adoc", ".avif");
        assert_eq!(
            repo.scan_for_content_directories().unwrap(),
            vec!["content/pages".to_string()]
        );
        assert_eq!(
            repo.scan_for_image_directories().unwrap(),
            vec!["assets".to_string()]
        );
    }

    #[test]
    fn test_empty_repository_scans_to_nothing() {
        let temp_dir = TempDir::new().unwrap();
        Command::new("git").args(["init"]).current_dir(temp_dir.path()).output().unwrap();
        let repo = GitRepo::open(temp_dir.path()).unwrap();
        assert!(repo.scan_for_content_directories().unwrap().is_empty());
        assert!(repo.get_repo_contents("").unwrap().is_empty());
        assert_eq!(repo.find_production_url().unwrap(), None);
    }

    #[test]
    fn test_production_url_sources() {
        let (_dir, repo) = repo_with_files(&[("CNAME", "blog.example.com\n")]);
        assert_eq!(
            repo.find_production_url().unwrap(),
            Some("https://blog.example.com".to_string())
        );

        let (_dir, repo) = repo_with_files(&[(
            "astro.config.mjs",
            "export default defineConfig({\n  site: 'https://astro.example.com/',\n});\n",
        )]);
        assert_eq!(
            repo.find_production_url().unwrap(),
            Some("https://astro.example.com".to_string())
        );

        let (_dir, repo) = repo_with_files(&[("hugo.toml", "baseURL = \"https://hugo.example.com/\"\n")]);
        assert_eq!(
            repo.find_production_url().unwrap(),
            Some("https://hugo.example.com".to_string())
        );

        let (_dir, repo) =
            repo_with_files(&[("package.json", r#"{ "homepage": "https://npm.example.com" }"#)]);
        assert_eq!(
            repo.find_production_url().unwrap(),
            Some("https://npm.example.com".to_string())
        );
    }

    #[test]
    fn test_repo_contents_and_project_type() {
        let (_dir, repo) = repo_with_files(&[
            ("_config.yml", "url: https://jekyll.example.com\n"),
            ("_posts/2024-01-01-hello.md", ""),
        ]);
        let root = repo.get_repo_contents("").unwrap();
        assert!(root.iter().any(|e| e.name == "_posts" && e.is_dir()));

        let posts = repo.get_repo_contents("_posts").unwrap();
        assert_eq!(posts[0].path, "_posts/2024-01-01-hello.md");

        assert_eq!(repo.detect_project_type().unwrap(), Some("jekyll".to_string()));
        assert_eq!(
            repo.find_production_url().unwrap(),
            Some("https://jekyll.example.com".to_string())
        );
        assert!(repo.get_repo_contents("missing").is_err());
    }

    #[test]
    fn test_quoted_value() {
        assert_eq!(
            quoted_value("  site: \"https://a.dev\",", "site"),
            Some("https://a.dev".to_string())
        );
        assert_eq!(quoted_value("url: https://b.dev", "url"), Some("https://b.dev".to_string()));
        assert_eq!(quoted_value("sitemap: true", "site"), None);
    }
}
