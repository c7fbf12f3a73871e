use std::borrow::Cow;

use crate::utils::format_size;

/// Everything that can stop an upload request.
///
/// The `Display` text of the validation variants is sent to the client verbatim,
/// the others are reported through the `error` field of the result.
#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("failed to create directory: {0}")]
    DirCreate(#[source] std::io::Error),
    #[error("{0}")]
    Multipart(Cow<'static, str>),
    #[error("no files found in request")]
    NoFiles,
    #[error("sub directory {0:?} escapes the storage root")]
    InvalidSubDir(String),
    #[error("file {filename} exceeds maximum size of {}", format_size(*.limit))]
    TooLarge { filename: String, limit: u64 },
    #[error("file {filename} has disallowed extension. Allowed: {allowed}")]
    BadExtension { filename: String, allowed: String },
    #[error("failed to read MIME type for {filename}: {source}")]
    Read { filename: String, source: std::io::Error },
    #[error("file {filename} has disallowed MIME type: {mime}")]
    BadMediaType { filename: String, mime: String },
    #[error("failed to save file {filename}: {source}")]
    Persist { filename: String, source: std::io::Error },
    #[error("invalid size: {0:?}")]
    InvalidSize(String),
}

impl UploadError {
    pub fn multipart(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Multipart(msg.into())
    }
}

/// Startup failures of the binary.
#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    #[error("Invalid upload configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("Invalid setting {name}: {reason}")]
    Setting { name: &'static str, reason: Cow<'static, str> },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SystemError {
    pub fn setting(name: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Setting { name, reason: reason.into() }
    }
}

impl From<SystemError> for std::io::Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::Io(err) => err,
            other => {
                log::error!("{}", other);
                std::io::Error::other(other.to_string())
            }
        }
    }
}
