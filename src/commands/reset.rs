use crate::core::{
    command_init::SessionInit,
    config::AppConfig,
    error::{GitCmsError, Result},
    print_info, print_section_header, print_success,
};
use colored::*;
use std::env;
use std::io::{self, Write};

/// Remove the configuration document from the repository and forget every
/// local trace of it. Asks for confirmation unless `yes` is set.
pub fn execute_delete_config(yes: bool) -> Result<()> {
    let mut context = SessionInit::initialize(false)?;
    let location = context.session.config_location().to_string();

    if !yes && !confirm_delete(&location, context.session.repository_id())? {
        return Err(GitCmsError::Canceled);
    }

    context.session.delete_config()?;
    print_success(&format!("Removed {location} and cleared cached settings"));
    Ok(())
}

/// Purge cached settings for the current repository
pub fn execute_cache_clear() -> Result<()> {
    let app_config = AppConfig::load_or_create()?;
    let session = SessionInit::open_session(&env::current_dir()?, &app_config)?;

    let removed = session.clear_cache()?;
    if removed == 0 {
        print_info("Cache already empty");
    } else {
        print_success(&format!(
            "Cleared {removed} cached entries for {}",
            session.repository_id()
        ));
    }
    Ok(())
}

fn confirm_delete(location: &str, repository_id: &str) -> Result<bool> {
    print_section_header("Delete configuration");
    println!("   {}. Commit removal of {}", "1".bright_black(), location.blue());
    println!("   {}. Clear cached settings for {}", "2".bright_black(), repository_id.blue());
    println!("   {}. Reset collections", "3".bright_black());

    print!("\n{} ", "Proceed? [y/N]:".blue());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
