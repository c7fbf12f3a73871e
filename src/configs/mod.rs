use std::path::PathBuf;

use validator::Validate;

use crate::{
    api::error::SystemError,
    constants::Env,
    modules::image_upload::{model::UploadConfig, validate::is_allowed_media_type},
    utils::parse_size,
};

/// Unset sizes are 0 and pick up the default in `normalized`.
fn size_setting(name: &'static str, raw: Option<&str>) -> Result<u64, SystemError> {
    match raw {
        Some(raw) => parse_size(raw).map_err(|e| SystemError::setting(name, e.to_string())),
        None => Ok(0),
    }
}

/// Build and validate the upload policy from the environment.
pub fn load_upload_config(env: &Env) -> Result<UploadConfig, SystemError> {
    let max_file_size = size_setting("UPLOAD_MAX_FILE_SIZE", env.upload_max_file_size.as_deref())?;
    let max_part_size = size_setting("UPLOAD_MAX_PART_SIZE", env.upload_max_part_size.as_deref())?;

    let allowed_extensions = env
        .upload_allowed_extensions
        .as_deref()
        .map(|list| list.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let config = UploadConfig {
        max_file_size,
        max_part_size,
        allowed_extensions,
        storage_path: env.upload_storage_path.as_deref().map(PathBuf::from).unwrap_or_default(),
        base_url: env.upload_base_url.clone().unwrap_or_default(),
        enable_timestamp: env.upload_enable_timestamp,
        create_date_dir: env.upload_create_date_dir,
    }
    .normalized();

    config.validate()?;

    for ext in unsniffable_extensions(&config) {
        log::warn!(
            "Extension '{}' is allowed but its content can never pass media type sniffing",
            ext
        );
    }

    Ok(config)
}

/// Allowed extensions whose conventional media type is outside the sniffing whitelist.
pub fn unsniffable_extensions(config: &UploadConfig) -> Vec<&str> {
    config
        .allowed_extensions
        .iter()
        .filter(|ext| {
            !mime_guess::from_ext(ext).iter().any(|mime| is_allowed_media_type(mime.essence_str()))
        })
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Env {
        Env {
            ip: "127.0.0.1".into(),
            port: 8080,
            frontend_url: "http://localhost:5173".into(),
            upload_route: "/upload".into(),
            storage_route: "/storage".into(),
            upload_max_file_size: None,
            upload_max_part_size: None,
            upload_allowed_extensions: None,
            upload_storage_path: None,
            upload_base_url: None,
            upload_enable_timestamp: false,
            upload_create_date_dir: false,
        }
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = load_upload_config(&env()).unwrap();

        assert_eq!(config.max_file_size, 10 << 20);
        assert_eq!(config.max_part_size, 32 << 20);
        assert_eq!(config.allowed_extensions.len(), 7);
        assert_eq!(config.storage_path, PathBuf::from("storage/app/public/uploads/images"));
        assert_eq!(config.base_url, "http://localhost:5220");
        assert!(!config.enable_timestamp);
        assert!(!config.create_date_dir);
    }

    #[test]
    fn reads_every_knob() {
        let env = Env {
            upload_max_file_size: Some("2mb".into()),
            upload_max_part_size: Some("8mb".into()),
            upload_allowed_extensions: Some("PNG, .jpg".into()),
            upload_storage_path: Some("/srv/images".into()),
            upload_base_url: Some("https://img.example.com".into()),
            upload_enable_timestamp: true,
            upload_create_date_dir: true,
            ..env()
        };
        let config = load_upload_config(&env).unwrap();

        assert_eq!(config.max_file_size, 2 << 20);
        assert_eq!(config.max_part_size, 8 << 20);
        assert_eq!(config.allowed_extensions, vec!["png", "jpg"]);
        assert_eq!(config.storage_path, PathBuf::from("/srv/images"));
        assert_eq!(config.base_url, "https://img.example.com");
        assert!(config.enable_timestamp);
        assert!(config.create_date_dir);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_size = Env { upload_max_file_size: Some("huge".into()), ..env() };
        assert!(matches!(load_upload_config(&bad_size), Err(SystemError::Setting { .. })));

        let bad_part = Env { upload_max_part_size: Some("-1kb".into()), ..env() };
        assert!(matches!(load_upload_config(&bad_part), Err(SystemError::Setting { .. })));

        let bad_url = Env { upload_base_url: Some("localhost".into()), ..env() };
        assert!(matches!(load_upload_config(&bad_url), Err(SystemError::Validation(_))));
    }

    #[test]
    fn flags_extensions_that_cannot_be_sniffed() {
        let config = UploadConfig {
            allowed_extensions: vec!["png".into(), "tiff".into(), "svg".into(), "heic".into()],
            ..Default::default()
        };
        assert_eq!(unsniffable_extensions(&config), vec!["tiff", "heic"]);
        assert!(unsniffable_extensions(&UploadConfig::default()).is_empty());
    }
}
