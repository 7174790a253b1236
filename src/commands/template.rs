use crate::core::{command_init::SessionInit, error::{GitCmsError, Result}, print_success};
use std::fs;
use std::path::Path;

/// Store a frontmatter template read from a JSON file
pub fn execute_template(collection_id: Option<&str>, file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)?;
    let template: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| GitCmsError::InvalidConfig(format!("{}: {e}", file.display())))?;

    let mut context = SessionInit::initialize(false)?;
    if !context.session.is_setup_complete() {
        return Err(GitCmsError::SetupIncomplete);
    }
    match context.session.save_template(collection_id, template)? {
        Some(name) => print_success(&format!("Saved template for collection {name}")),
        None => print_success("Saved frontmatter template"),
    }
    Ok(())
}
