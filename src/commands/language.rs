use crate::core::{
    command_init::SessionInit,
    config::AppConfig,
    error::{GitCmsError, Result},
    print_info, print_success,
    schema::LANGUAGES,
};

/// Show the UI language, or set it when `code` is given
pub fn execute_language(code: Option<&str>) -> Result<()> {
    let app_config = AppConfig::load_or_create()?;
    let cache = SessionInit::open_cache(&app_config)?;

    match code {
        None => print_info(&format!(
            "Language: {} (available: {})",
            cache.language(),
            LANGUAGES.join(", ")
        )),
        Some(code) => {
            cache.set_language(code).map_err(|_| {
                GitCmsError::validation("language", format!("{code} (available: {})", LANGUAGES.join(", ")))
            })?;
            print_success(&format!("Language set to {code}"));
        }
    }
    Ok(())
}
