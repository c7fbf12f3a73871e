use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::api::error::UploadError;
use crate::modules::image_upload::model::UploadConfig;
use crate::utils::clean_relative_path;

/// Relative directory under the storage root chosen by the client.
///
/// Empty input, or input that cleans to nothing, means "no sub directory".
pub fn sanitize_sub_dir(raw: &str) -> Result<Option<String>, UploadError> {
    let parts = clean_relative_path(raw);
    if parts.first().is_some_and(|p| p == "..") {
        return Err(UploadError::InvalidSubDir(raw.to_string()));
    }
    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(parts.join("/")))
}

/// Split at the last dot. The extension keeps its dot.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) => filename.split_at(idx),
        None => (filename, ""),
    }
}

/// Lowercased extension without its dot, empty when there is none.
pub fn extension_of(filename: &str) -> String {
    split_extension(filename).1.trim_start_matches('.').to_lowercase()
}

/// Derives every name and path an upload needs from the policy and the clock.
pub struct PathBuilder<'a> {
    config: &'a UploadConfig,
    sub_dir: Option<&'a str>,
}

impl<'a> PathBuilder<'a> {
    /// `sub_dir` must already be sanitized.
    pub fn new(config: &'a UploadConfig, sub_dir: Option<&'a str>) -> Self {
        Self { config, sub_dir }
    }

    fn relative_dir(&self, now: &DateTime<Local>) -> Vec<String> {
        let mut parts = Vec::new();
        if self.config.create_date_dir {
            parts.push(now.format("%Y/%m/%d").to_string());
        }
        if let Some(sub_dir) = self.sub_dir {
            parts.push(sub_dir.to_string());
        }
        parts
    }

    /// Absolute (or storage-root relative) directory the file is written to.
    pub fn target_dir(&self, now: &DateTime<Local>) -> PathBuf {
        let mut dir = self.config.storage_path.clone();
        for part in self.relative_dir(now) {
            dir.extend(part.split('/'));
        }
        dir
    }

    /// `<cleaned-name>_<suffix><ext>`
    pub fn filename(&self, original: &str, now: &DateTime<Local>) -> String {
        let (name, ext) = split_extension(original);
        let name = name.replace([' ', '-'], "_");

        if self.config.enable_timestamp {
            format!("{}_{}{}", name, now.format("%Y%m%d_%H%M%S"), ext)
        } else {
            format!("{}_{}{}", name, now.timestamp(), ext)
        }
    }

    /// Forward-slash path from the storage root, without a leading slash.
    pub fn relative_path(&self, filename: &str, now: &DateTime<Local>) -> String {
        let mut parts = self.relative_dir(now);
        parts.push(filename.to_string());
        parts.join("/")
    }

    pub fn public_url(&self, relative_path: &str) -> String {
        format!(
            "{}/storage/{}",
            self.config.base_url.trim_end_matches('/'),
            relative_path.trim_start_matches('/')
        )
    }
}
