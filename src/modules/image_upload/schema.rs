use actix_web::{http::StatusCode, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::api::error::UploadError;

/// Response body of the upload endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    pub fn uploaded(file_paths: Vec<String>, file_urls: Vec<String>) -> Self {
        Self {
            success: true,
            message: format!("Successfully uploaded {} file(s)", file_paths.len()),
            file_paths,
            file_urls,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self { success: false, message: message.into(), error, ..Default::default() }
    }

    pub fn status(&self) -> StatusCode {
        if self.success {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl From<UploadError> for UploadResult {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::DirCreate(source) => {
                Self::failure("Failed to create directory", Some(source.to_string()))
            }
            UploadError::Multipart(msg) => {
                Self::failure("Failed to get files from request", Some(msg.into_owned()))
            }
            UploadError::NoFiles => {
                Self::failure("Failed to get files from request", Some(err.to_string()))
            }
            UploadError::InvalidSubDir(_) => {
                Self::failure("Invalid sub directory", Some(err.to_string()))
            }
            UploadError::Persist { filename, source } => {
                Self::failure(format!("Failed to save file: {}", filename), Some(source.to_string()))
            }
            other => Self::failure(other.to_string(), None),
        }
    }
}

impl Responder for UploadResult {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::build(self.status()).json(self)
    }
}
