use crate::core::{command_init::SessionInit, error::Result, print_success};
use std::fs;
use std::path::Path;

/// Print the configuration document, or write it to `output`
pub fn execute_export(output: Option<&Path>) -> Result<()> {
    let context = SessionInit::initialize(false)?;
    let document = context.session.export_config()?;

    match output {
        Some(path) => {
            fs::write(path, &document)?;
            print_success(&format!("Exported configuration to {}", path.display()));
        }
        None => print!("{document}"),
    }
    Ok(())
}

pub fn execute_import(file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)?;
    let mut context = SessionInit::initialize(false)?;
    context.session.import_config(&content)?;

    print_success(&format!(
        "Imported {} into {}",
        file.display(),
        context.session.config_location()
    ));
    Ok(())
}
