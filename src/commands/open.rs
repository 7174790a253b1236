use crate::core::{
    command_init::SessionInit,
    error::Result,
    print_info, print_key_value, print_section_header, print_success, print_warning,
    reconcile::{BootstrapOutcome, ScanSuggestions},
    schema::Field,
    session::CmsSession,
};
use colored::*;

const KEY_WIDTH: usize = 18;

pub fn execute_open() -> Result<()> {
    let context = SessionInit::initialize(true)?;
    let session = &context.session;

    match &context.report.outcome {
        BootstrapOutcome::RemoteWorkspace | BootstrapOutcome::RemoteMerged => print_success(&format!(
            "Loaded {} (v{})",
            session.config_location(),
            context.report.remote_version.unwrap_or_default()
        )),
        BootstrapOutcome::CacheSufficient => {
            print_success("Loaded cached settings");
        }
        BootstrapOutcome::Scanned => print_info("Scanned repository for suggested settings"),
        BootstrapOutcome::ScanFailed { message } => print_warning(message),
    }

    print_workspace_summary(session)?;

    if let Some(suggestions) = session.suggestions() {
        print_suggestions(suggestions);
    }

    if !session.is_setup_complete() {
        print_warning("Setup is not complete. Run 'gitcms setup' to confirm these settings.");
    }
    Ok(())
}

pub fn print_workspace_summary(session: &CmsSession) -> Result<()> {
    let workspace = session.snapshot()?;

    print_section_header(&format!("Repository {}", session.repository_id()));
    print_key_value("projectType", &workspace.settings.project_type, KEY_WIDTH);
    print_key_value("postsPath", workspace.effective_posts_path(), KEY_WIDTH);
    print_key_value("imagesPath", workspace.effective_images_path(), KEY_WIDTH);
    if !workspace.settings.domain_url.is_empty() {
        print_key_value("domainUrl", &workspace.settings.domain_url, KEY_WIDTH);
    }

    if let Some(active) = workspace.active_collection() {
        print_key_value(
            "collection",
            &format!("{} ({} total)", active.name, workspace.collections.len()),
            KEY_WIDTH,
        );
    }
    Ok(())
}

fn print_suggestions(suggestions: &ScanSuggestions) {
    print_section_header("Suggestions");
    let lists = [
        (Field::PostsPath, &suggestions.content_directories),
        (Field::ImagesPath, &suggestions.image_directories),
    ];
    for (field, candidates) in lists {
        let value = if candidates.is_empty() {
            "-none found-".bright_black().to_string()
        } else {
            candidates.join(", ")
        };
        print_key_value(field.key(), &value, KEY_WIDTH);
    }
    if let Some(url) = &suggestions.production_url {
        print_key_value(Field::DomainUrl.key(), url, KEY_WIDTH);
    }
}
