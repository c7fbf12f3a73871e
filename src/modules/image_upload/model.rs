use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use chrono::{DateTime, Local};
use validator::{Validate, ValidationError};

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 << 20;
pub const DEFAULT_MAX_PART_SIZE: u64 = 32 << 20;
pub const DEFAULT_STORAGE_PATH: &str = "storage/app/public/uploads/images";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5220";

pub fn default_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "webp", "gif", "bmp", "svg"].iter().map(|e| e.to_string()).collect()
}

/// Image upload policy
#[derive(Debug, Clone, Validate)]
pub struct UploadConfig {
    #[validate(range(min = 1, message = "Maximum file size must be positive"))]
    pub max_file_size: u64,
    /// Bytes buffered per multipart part. Larger parts are counted but not kept,
    /// and per-request overrides cannot go beyond it.
    #[validate(range(min = 1, message = "Maximum part size must be positive"))]
    pub max_part_size: u64,
    #[validate(length(min = 1, message = "At least one extension must be allowed"))]
    pub allowed_extensions: Vec<String>,
    #[validate(custom(function = "non_empty_path"))]
    pub storage_path: PathBuf,
    #[validate(url(message = "Base URL must be an absolute URL"))]
    pub base_url: String,
    pub enable_timestamp: bool,
    pub create_date_dir: bool,
}

fn non_empty_path(path: &PathBuf) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        let mut err = ValidationError::new("storage_path");
        err.message = Some("Storage path must not be empty".into());
        return Err(err);
    }
    Ok(())
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_part_size: DEFAULT_MAX_PART_SIZE,
            allowed_extensions: default_extensions(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            base_url: DEFAULT_BASE_URL.to_string(),
            enable_timestamp: false,
            create_date_dir: false,
        }
    }
}

impl UploadConfig {
    /// Fill zero or empty knobs with defaults and normalise extensions to
    /// lowercase tokens without a leading dot.
    pub fn normalized(mut self) -> Self {
        if self.max_file_size == 0 {
            self.max_file_size = DEFAULT_MAX_FILE_SIZE;
        }
        if self.max_part_size == 0 {
            self.max_part_size = DEFAULT_MAX_PART_SIZE;
        }
        self.max_part_size = self.max_part_size.max(self.max_file_size);

        self.allowed_extensions = self
            .allowed_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if self.allowed_extensions.is_empty() {
            self.allowed_extensions = default_extensions();
        }

        if self.storage_path.as_os_str().is_empty() {
            self.storage_path = PathBuf::from(DEFAULT_STORAGE_PATH);
        }
        if self.base_url.trim().is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }
        self
    }

    pub fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// One file part of a multipart request, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub size: u64,
    content: Vec<u8>,
}

impl UploadedFile {
    /// A part of `size` bytes of which only a prefix was kept. `filename` is
    /// reduced to its last path component.
    pub fn truncated(filename: &str, content: Vec<u8>, size: u64) -> Self {
        let filename = filename.rsplit(['/', '\\']).next().unwrap_or_default().to_string();
        Self { filename, size, content }
    }

    pub fn open(&self) -> impl Read + '_ {
        Cursor::new(self.content.as_slice())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.content
    }
}

/// Read access to a parsed multipart form.
pub trait MultipartSource {
    /// First value of a text field.
    fn text(&self, name: &str) -> Option<&str>;

    /// All files sent under a field name, in request order.
    fn files(&self, name: &str) -> &[UploadedFile];
}

/// In-memory multipart form. Field names ending in `[]` are stored under the
/// bare name.
#[derive(Debug, Default)]
pub struct UploadForm {
    texts: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

fn field_key(name: &str) -> String {
    name.strip_suffix("[]").unwrap_or(name).to_string()
}

impl UploadForm {
    pub fn push_text(&mut self, name: &str, value: String) {
        self.texts.entry(field_key(name)).or_default().push(value);
    }

    pub fn push_file(&mut self, name: &str, file: UploadedFile) {
        self.files.entry(field_key(name)).or_default().push(file);
    }
}

#[cfg(test)]
impl UploadedFile {
    pub fn new(filename: &str, content: Vec<u8>) -> Self {
        let size = content.len() as u64;
        Self::truncated(filename, content, size)
    }
}

#[cfg(test)]
impl UploadForm {
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.push_text(name, value.to_string());
        self
    }

    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.push_file(name, file);
        self
    }
}

impl MultipartSource for UploadForm {
    fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    fn files(&self, name: &str) -> &[UploadedFile] {
        self.files.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Wall clock used for date directories and filename suffixes.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
