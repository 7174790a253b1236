use crate::core::{
    command_init::SessionInit,
    error::Result,
    print_success,
    schema::{Field, SettingsPatch},
    session::CmsSession,
};

#[derive(Debug, Default)]
pub struct SetupArgs {
    pub project_type: Option<String>,
    pub posts_path: Option<String>,
    pub images_path: Option<String>,
    pub domain_url: Option<String>,
}

impl SetupArgs {
    /// Validate every provided value into one patch
    pub fn to_patch(&self) -> Result<SettingsPatch> {
        let provided = [
            (Field::ProjectType, &self.project_type),
            (Field::PostsPath, &self.posts_path),
            (Field::ImagesPath, &self.images_path),
            (Field::DomainUrl, &self.domain_url),
        ];

        let mut patch = SettingsPatch::new();
        for (field, value) in provided {
            if let Some(value) = value {
                let parsed = CmsSession::parse_setting(field.key(), value)?;
                if let Some(value) = parsed.get(field) {
                    patch.insert(field, value.clone());
                }
            }
        }
        Ok(patch)
    }
}

/// Confirm the working settings (scan suggestions unless overridden) and
/// write the configuration document
pub fn execute_setup(args: SetupArgs) -> Result<()> {
    let patch = args.to_patch()?;
    let mut context = SessionInit::initialize(false)?;
    let session = &mut context.session;

    session.complete_setup(&patch)?;

    let workspace = session.snapshot()?;
    print_success(&format!(
        "Setup complete: {} site, posts in {}, images in {}",
        workspace.settings.project_type,
        workspace.settings.posts_path,
        workspace.settings.images_path
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GitCmsError;
    use serde_json::json;

    #[test]
    fn test_setup_args_to_patch() {
        let args = SetupArgs {
            project_type: Some("hugo".to_string()),
            posts_path: Some("content/posts".to_string()),
            ..Default::default()
        };
        let patch = args.to_patch().unwrap();
        assert_eq!(patch.len(), 2);
        assert_eq!(patch.get(Field::ProjectType), Some(&json!("hugo")));
    }

    #[test]
    fn test_setup_args_rejects_invalid_value() {
        let args = SetupArgs {
            images_path: Some("/var/www".to_string()),
            ..Default::default()
        };
        assert!(matches!(args.to_patch(), Err(GitCmsError::Validation { .. })));
    }
}
