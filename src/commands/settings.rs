use crate::core::{
    command_init::SessionInit,
    error::{GitCmsError, Result},
    print_error_with_structured_usage, print_key_value, print_section_header, print_success,
    schema::Field,
    session::CmsSession,
};

const KEY_WIDTH: usize = 18;

pub fn execute_settings_show() -> Result<()> {
    let context = SessionInit::initialize(false)?;
    let workspace = context.session.snapshot()?;

    print_section_header(&format!("Settings for {}", context.session.repository_id()));
    for field in Field::ALL {
        let value = workspace.settings.get(field);
        let display = match value.as_str() {
            Some(text) => text.to_string(),
            None => value.to_string(),
        };
        print_key_value(field.key(), &display, KEY_WIDTH);
    }
    Ok(())
}

/// Set one field. `local` applies it to the cache only, without a commit.
pub fn execute_settings_set(key: &str, value: &str, local: bool) -> Result<()> {
    let patch = match CmsSession::parse_setting(key, value) {
        Ok(patch) => patch,
        Err(GitCmsError::UnknownField(field)) => {
            let keys: Vec<(&str, &str)> = Field::ALL.iter().map(|f| (f.key(), "")).collect();
            print_error_with_structured_usage(
                &format!("Unknown settings field '{field}'"),
                &["gitcms settings set <key> <value>"],
                &keys,
            );
            return Err(GitCmsError::UnknownField(field));
        }
        Err(e) => return Err(e),
    };

    let mut context = SessionInit::initialize(false)?;
    let session = &mut context.session;

    if local {
        session.set_settings(&patch)?;
        print_success(&format!("Set {key} locally"));
        return Ok(());
    }

    if !session.is_setup_complete() {
        return Err(GitCmsError::SetupIncomplete);
    }
    session.save_settings(&patch)?;
    print_success(&format!("Saved {key} to {}", session.config_location()));
    Ok(())
}
