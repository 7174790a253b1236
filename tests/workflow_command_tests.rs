use predicates::prelude::*;
use std::fs;

mod common;
use common::{assertions, fixtures::*, repository::*};

#[cfg(test)]
mod open_command_tests {
    use super::*;

    #[test]
    fn test_open_outside_git_repository() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let outside = repo.home.path().to_path_buf();

        repo.gitcms_in(&outside)?
            .arg("open")
            .assert()
            .failure()
            .stdout(assertions::not_in_git_repo());

        Ok(())
    }

    #[test]
    fn test_open_scans_unconfigured_site() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;

        repo.gitcms()?
            .arg("open")
            .assert()
            .success()
            .stdout(predicate::str::contains("Scanned repository"))
            .stdout(assertions::has_setting("projectType", "hugo"))
            .stdout(predicate::str::contains("content/posts, content/notes"))
            .stdout(predicate::str::contains("static/images"))
            .stdout(predicate::str::contains("https://blog.example.com"))
            .stdout(assertions::setup_incomplete());

        // Scanning never writes to the repository
        assert_eq!(repo.commit_count(), 1);
        assert!(repo.read_file(".gitcms.json").is_none());
        Ok(())
    }

    #[test]
    fn test_open_loads_legacy_config_without_scanning() -> anyhow::Result<()> {
        let repo = create_configured_site()?;

        repo.gitcms()?
            .arg("open")
            .assert()
            .success()
            .stdout(predicate::str::contains("Loaded .gitcms.json (v1)"))
            .stdout(assertions::has_setting("postsPath", "content/posts"))
            .stdout(predicate::str::contains("Suggestions").not())
            .stdout(assertions::setup_incomplete().not());

        Ok(())
    }

    #[test]
    fn test_open_loads_workspace_config() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;
        commit_files(&repo.path, &[(".gitcms.json", WORKSPACE_CONFIG)], "Add config")?;

        repo.gitcms()?
            .arg("open")
            .assert()
            .success()
            .stdout(predicate::str::contains("Loaded .gitcms.json (v2)"))
            .stdout(predicate::str::contains("Notes (2 total)"))
            .stdout(assertions::has_setting("postsPath", "content/notes"));

        Ok(())
    }
}

#[cfg(test)]
mod setup_and_settings_tests {
    use super::*;

    #[test]
    fn test_setup_commits_scanned_settings() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;

        repo.gitcms()?
            .arg("setup")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Setup complete: hugo site, posts in content/posts, images in static/images",
            ));

        let document = repo.read_file(".gitcms.json").unwrap_or_default();
        assert!(document.contains("\"posts\": \"content/posts\""));
        assert!(document.contains("\"domainUrl\": \"https://blog.example.com\""));
        assert_eq!(repo.last_commit_message(), "Configure gitcms");
        assert_eq!(repo.commit_count(), 2);
        Ok(())
    }

    #[test]
    fn test_setup_flags_override_suggestions() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;

        repo.gitcms()?
            .args(["setup", "--posts", "content/notes", "--project-type", "other"])
            .assert()
            .success();

        let document = repo.read_file(".gitcms.json").unwrap_or_default();
        assert!(document.contains("\"posts\": \"content/notes\""));
        assert!(document.contains("\"projectType\": \"other\""));
        Ok(())
    }

    #[test]
    fn test_setup_rejects_invalid_path() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;

        repo.gitcms()?
            .args(["setup", "--images", "../outside"])
            .assert()
            .failure()
            .stdout(assertions::invalid_value("imagesPath"));

        assert!(repo.read_file(".gitcms.json").is_none());
        Ok(())
    }

    #[test]
    fn test_settings_set_requires_setup() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;

        repo.gitcms()?
            .args(["settings", "set", "imageQuality", "85"])
            .assert()
            .failure()
            .stdout(assertions::setup_incomplete());

        Ok(())
    }

    #[test]
    fn test_settings_set_commits_and_shows() -> anyhow::Result<()> {
        let repo = create_configured_site()?;

        repo.gitcms()?
            .args(["settings", "set", "imageQuality", "85"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Saved imageQuality to .gitcms.json"));

        assert_eq!(repo.last_commit_message(), "Update gitcms settings");
        let document = repo.read_file(".gitcms.json").unwrap_or_default();
        assert!(document.contains("\"imageQuality\": 85"));

        repo.gitcms()?
            .args(["settings", "show"])
            .assert()
            .success()
            .stdout(assertions::has_setting("imageQuality", "85"))
            .stdout(assertions::has_setting("commitNewPost", "Add {filename}"));

        Ok(())
    }

    #[test]
    fn test_settings_set_local_does_not_commit() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;

        repo.gitcms()?
            .args(["settings", "set", "postsPath", "content/notes", "--local"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Set postsPath locally"));

        assert_eq!(repo.commit_count(), 1);
        assert!(repo.read_file(".gitcms.json").is_none());

        repo.gitcms()?
            .args(["settings", "show"])
            .assert()
            .success()
            .stdout(assertions::has_setting("postsPath", "content/notes"));

        Ok(())
    }

    #[test]
    fn test_settings_set_unknown_field_shows_keys() -> anyhow::Result<()> {
        let repo = create_configured_site()?;

        repo.gitcms()?
            .args(["settings", "set", "theme", "dark"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Unknown settings field 'theme'"))
            .stdout(predicate::str::contains("maxImageWidth"));

        Ok(())
    }

    #[test]
    fn test_settings_set_rejects_out_of_range_value() -> anyhow::Result<()> {
        let repo = create_configured_site()?;

        repo.gitcms()?
            .args(["settings", "set", "imageQuality", "500"])
            .assert()
            .failure()
            .stdout(assertions::invalid_value("imageQuality"));

        assert_eq!(repo.last_commit_message(), "Add gitcms config");
        Ok(())
    }
}

#[cfg(test)]
mod collection_command_tests {
    use super::*;

    #[test]
    fn test_first_collection_upgrades_config() -> anyhow::Result<()> {
        let repo = create_configured_site()?;

        repo.gitcms()?
            .args([
                "collection",
                "add",
                "Notes",
                "--posts",
                "content/notes",
                "--images",
                "static/images",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created collection Notes"));

        let document = repo.read_file(".gitcms.json").unwrap_or_default();
        assert!(document.contains("\"version\": 2"));
        assert!(document.contains("\"name\": \"Posts\""));
        assert!(document.contains("\"name\": \"Notes\""));
        assert_eq!(repo.last_commit_message(), "Create collection Notes");

        repo.gitcms()?
            .args(["collection", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Posts"))
            .stdout(predicate::str::contains("Notes"));

        Ok(())
    }

    #[test]
    fn test_collection_list_without_collections() -> anyhow::Result<()> {
        let repo = create_configured_site()?;

        repo.gitcms()?
            .args(["collection", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No collections"));

        Ok(())
    }

    #[test]
    fn test_use_update_and_remove_collection() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;
        commit_files(&repo.path, &[(".gitcms.json", WORKSPACE_CONFIG)], "Add config")?;

        repo.gitcms()?
            .args(["collection", "use", "col-posts"])
            .assert()
            .success()
            .stdout(predicate::str::contains("posts in content/posts"));
        assert_eq!(repo.last_commit_message(), "Add config");

        repo.gitcms()?
            .args(["collection", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("* Posts"));

        repo.gitcms()?
            .args(["collection", "update", "col-notes", "--name", "Journal"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Updated collection Journal"));

        repo.gitcms()?
            .args(["collection", "remove", "col-notes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted collection Journal"));

        let document = repo.read_file(".gitcms.json").unwrap_or_default();
        assert!(!document.contains("col-notes"));
        assert!(document.contains("col-posts"));
        Ok(())
    }

    #[test]
    fn test_unknown_collection_fails() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;
        commit_files(&repo.path, &[(".gitcms.json", WORKSPACE_CONFIG)], "Add config")?;

        repo.gitcms()?
            .args(["collection", "use", "missing"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Collection not found: missing"));

        Ok(())
    }

    #[test]
    fn test_collection_add_rejects_absolute_path() -> anyhow::Result<()> {
        let repo = create_configured_site()?;

        repo.gitcms()?
            .args(["collection", "add", "Bad", "--posts", "/etc", "--images", "static"])
            .assert()
            .failure()
            .stdout(assertions::invalid_value("postsPath"));

        assert_eq!(repo.last_commit_message(), "Add gitcms config");
        Ok(())
    }
}

#[cfg(test)]
mod document_command_tests {
    use super::*;

    #[test]
    fn test_template_on_flat_config() -> anyhow::Result<()> {
        let repo = create_configured_site()?;
        let template = repo.home.path().join("template.json");
        fs::write(&template, r#"{ "title": "", "draft": true }"#)?;

        repo.gitcms()?
            .arg("template")
            .arg(&template)
            .assert()
            .success()
            .stdout(predicate::str::contains("Saved frontmatter template"));

        let document = repo.read_file(".gitcms.json").unwrap_or_default();
        assert!(document.contains("\"frontmatter\""));
        assert!(document.contains("\"draft\": true"));
        assert_eq!(repo.last_commit_message(), "Update frontmatter template");
        Ok(())
    }

    #[test]
    fn test_template_on_collection() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;
        commit_files(&repo.path, &[(".gitcms.json", WORKSPACE_CONFIG)], "Add config")?;
        let template = repo.home.path().join("template.json");
        fs::write(&template, r#"{ "mood": "" }"#)?;

        repo.gitcms()?
            .arg("template")
            .arg(&template)
            .args(["--collection", "col-notes"])
            .assert()
            .success();

        assert_eq!(repo.last_commit_message(), "Update template for Notes");
        assert!(repo.read_file(".gitcms.json").unwrap_or_default().contains("\"mood\""));
        Ok(())
    }

    #[test]
    fn test_template_without_collection_uses_active_collection() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;
        commit_files(&repo.path, &[(".gitcms.json", WORKSPACE_CONFIG)], "Add config")?;
        let template = repo.home.path().join("template.json");
        fs::write(&template, r#"{ "weather": "" }"#)?;

        repo.gitcms()?
            .arg("template")
            .arg(&template)
            .assert()
            .success()
            .stdout(predicate::str::contains("Saved template for collection Notes"));

        assert_eq!(repo.last_commit_message(), "Update template for Notes");
        assert!(repo.read_file(".gitcms.json").unwrap_or_default().contains("\"weather\""));
        Ok(())
    }

    #[test]
    fn test_export_to_file() -> anyhow::Result<()> {
        let repo = create_configured_site()?;
        let output = repo.home.path().join("export.json");

        repo.gitcms()?
            .arg("export")
            .arg("--output")
            .arg(&output)
            .assert()
            .success();

        let exported = fs::read_to_string(&output)?;
        assert!(exported.contains("\"projectType\": \"hugo\""));
        assert!(exported.contains("\"imageQuality\": 70"));
        Ok(())
    }

    #[test]
    fn test_import_workspace_document() -> anyhow::Result<()> {
        let repo = create_hugo_site()?;
        let file = repo.home.path().join("import.json");
        fs::write(&file, WORKSPACE_CONFIG)?;

        repo.gitcms()?
            .arg("import")
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("Imported"));

        assert_eq!(repo.last_commit_message(), "Import gitcms configuration");
        let document = repo.read_file(".gitcms.json").unwrap_or_default();
        assert!(document.contains("col-notes"));

        repo.gitcms()?
            .arg("open")
            .assert()
            .success()
            .stdout(predicate::str::contains("(v2)"));
        Ok(())
    }

    #[test]
    fn test_import_rejects_invalid_document() -> anyhow::Result<()> {
        let repo = create_configured_site()?;
        let file = repo.home.path().join("import.json");
        fs::write(&file, r#"{ "projectType": "wordpress" }"#)?;

        repo.gitcms()?
            .arg("import")
            .arg(&file)
            .assert()
            .failure()
            .stdout(predicate::str::contains("Invalid configuration document"));

        assert_eq!(repo.last_commit_message(), "Add gitcms config");
        Ok(())
    }
}

#[cfg(test)]
mod reset_command_tests {
    use super::*;

    #[test]
    fn test_delete_config_requires_confirmation() -> anyhow::Result<()> {
        let repo = create_configured_site()?;

        repo.gitcms()?
            .arg("delete-config")
            .write_stdin("n\n")
            .assert()
            .failure()
            .stdout(predicate::str::contains("Operation canceled by user"));

        assert!(repo.read_file(".gitcms.json").is_some());
        Ok(())
    }

    #[test]
    fn test_delete_config_removes_document_and_cache() -> anyhow::Result<()> {
        let repo = create_configured_site()?;

        repo.gitcms()?
            .args(["delete-config", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed .gitcms.json"));

        assert!(repo.read_file(".gitcms.json").is_none());
        assert_eq!(repo.last_commit_message(), "Remove gitcms configuration");

        // Nothing cached, nothing committed: back to scanning
        repo.gitcms()?
            .arg("open")
            .assert()
            .success()
            .stdout(predicate::str::contains("Scanned repository"));
        Ok(())
    }

    #[test]
    fn test_cache_clear() -> anyhow::Result<()> {
        let repo = create_configured_site()?;
        repo.gitcms()?.arg("open").assert().success();

        repo.gitcms()?
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared"));

        repo.gitcms()?
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache already empty"));

        Ok(())
    }

    #[test]
    fn test_language_outside_repository() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let outside = repo.home.path().to_path_buf();

        repo.gitcms_in(&outside)?
            .args(["language", "fr"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Language set to fr"));

        repo.gitcms_in(&outside)?
            .arg("language")
            .assert()
            .success()
            .stdout(predicate::str::contains("Language: fr"));

        repo.gitcms_in(&outside)?
            .args(["language", "xx"])
            .assert()
            .failure()
            .stdout(assertions::invalid_value("language"));

        Ok(())
    }
}
