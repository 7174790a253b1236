use crate::core::{
    command_init::SessionInit,
    error::{GitCmsError, Result},
    print_info, print_section_header, print_success,
    session::CmsSession,
    workspace::CollectionPatch,
};
use colored::*;

fn require_setup(session: &CmsSession) -> Result<()> {
    if session.is_setup_complete() {
        Ok(())
    } else {
        Err(GitCmsError::SetupIncomplete)
    }
}

pub fn execute_collection_list() -> Result<()> {
    let context = SessionInit::initialize(false)?;
    let workspace = context.session.snapshot()?;

    if workspace.collections.is_empty() {
        print_info("No collections. Posts use the shared settings paths.");
        return Ok(());
    }

    print_section_header("Collections");
    let active_id = workspace.active_collection().map(|c| c.id.as_str());
    for collection in &workspace.collections {
        let marker = if Some(collection.id.as_str()) == active_id {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {}  {}  {} / {}",
            marker,
            collection.name.white(),
            collection.id.bright_black(),
            collection.posts_path.blue(),
            collection.images_path.blue()
        );
    }
    println!();
    Ok(())
}

pub fn execute_collection_add(name: &str, posts_path: &str, images_path: &str) -> Result<()> {
    let mut context = SessionInit::initialize(false)?;
    require_setup(&context.session)?;

    let collection = context
        .session
        .create_collection(name, posts_path, images_path)?;
    print_success(&format!("Created collection {} ({})", collection.name, collection.id));
    Ok(())
}

pub fn execute_collection_update(id: &str, patch: CollectionPatch) -> Result<()> {
    if patch.is_empty() {
        print_info("Nothing to update");
        return Ok(());
    }
    let mut context = SessionInit::initialize(false)?;
    require_setup(&context.session)?;

    let collection = context.session.update_collection(id, patch)?;
    print_success(&format!("Updated collection {}", collection.name));
    Ok(())
}

pub fn execute_collection_remove(id: &str) -> Result<()> {
    let mut context = SessionInit::initialize(false)?;
    require_setup(&context.session)?;

    let removed = context.session.delete_collection(id)?;
    print_success(&format!("Deleted collection {}", removed.name));
    Ok(())
}

pub fn execute_collection_use(id: &str) -> Result<()> {
    let mut context = SessionInit::initialize(false)?;
    context.session.set_active_collection(id)?;

    let workspace = context.session.snapshot()?;
    print_success(&format!(
        "Active collection: posts in {}, images in {}",
        workspace.effective_posts_path(),
        workspace.effective_images_path()
    ));
    Ok(())
}
