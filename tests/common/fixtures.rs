//! Test data generation utilities and predefined scenarios

#![allow(dead_code)]

use super::repository::*;
use gitcms::core::error::Result;

pub const HUGO_CONFIG: &str = "baseURL = \"https://blog.example.com/\"\ntitle = \"Example\"\n";

/// Scenario: a committed Hugo site with posts, notes and images
pub fn create_hugo_site() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    commit_files(
        &repo.path,
        &[
            ("hugo.toml", HUGO_CONFIG),
            ("content/posts/first.md", "# First\n"),
            ("content/posts/second.md", "# Second\n"),
            ("content/notes/note.md", "# Note\n"),
            ("static/images/cover.png", "png"),
        ],
        "Initial site",
    )?;
    Ok(repo)
}

/// Scenario: a site whose flat (v1) configuration is already committed
pub fn create_configured_site() -> Result<TestRepo> {
    let repo = create_hugo_site()?;
    commit_files(&repo.path, &[(".gitcms.json", LEGACY_CONFIG)], "Add gitcms config")?;
    Ok(repo)
}

pub const LEGACY_CONFIG: &str = r#"{
  "version": 1,
  "projectType": "hugo",
  "paths": { "posts": "content/posts", "images": "static/images" },
  "domainUrl": "https://blog.example.com",
  "settings": { "imageQuality": 70 },
  "commits": { "newPost": "Add {filename}" }
}
"#;

pub const WORKSPACE_CONFIG: &str = r#"{
  "version": 2,
  "settings": { "projectType": "hugo", "postsPath": "content/posts", "imagesPath": "static/images" },
  "commitMessages": { "newPost": "Add {filename}" },
  "collections": [
    {
      "id": "col-posts",
      "name": "Posts",
      "postsPath": "content/posts",
      "imagesPath": "static/images",
      "createdAt": "2024-01-01T00:00:00Z",
      "updatedAt": "2024-01-01T00:00:00Z"
    },
    {
      "id": "col-notes",
      "name": "Notes",
      "postsPath": "content/notes",
      "imagesPath": "static/images",
      "createdAt": "2024-01-02T00:00:00Z",
      "updatedAt": "2024-01-02T00:00:00Z"
    }
  ],
  "activeCollectionId": "col-notes"
}
"#;
