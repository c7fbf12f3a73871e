use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::error::UploadError;
use crate::modules::image_upload::{
    extract::extract_files,
    model::{Clock, MultipartSource, SystemClock, UploadConfig},
    naming::{sanitize_sub_dir, PathBuilder},
    repository::UploadSink,
    schema::UploadResult,
    validate::validate_file,
};
use crate::utils::parse_size;

/// Runs a whole upload request: extraction, validation, naming and persistence.
///
/// Files are handled one at a time in request order. The first failure ends the
/// request and files already saved by it stay on disk.
#[derive(Clone)]
pub struct ImageUploadService<S>
where
    S: UploadSink + Send + Sync,
{
    sink: Arc<S>,
    config: Arc<UploadConfig>,
    clock: Arc<dyn Clock>,
}

impl<S> ImageUploadService<S>
where
    S: UploadSink + Send + Sync,
{
    pub fn new(sink: Arc<S>, config: UploadConfig) -> Self {
        let config = config.normalized();
        info!(
            storage_path = %config.storage_path.display(),
            max_file_size = config.max_file_size,
            "ImageUploadService initialized"
        );
        Self { sink, config: Arc::new(config), clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Per-request limit: a parseable, positive `max_size` override wins,
    /// anything else falls back to the configured limit. Overrides are capped
    /// at the part ceiling since larger parts are never fully buffered.
    pub fn effective_max_size(&self, requested: Option<&str>) -> u64 {
        match requested.map(parse_size) {
            Some(Ok(size)) if size > 0 => size.min(self.config.max_part_size),
            _ => self.config.max_file_size,
        }
    }

    pub async fn process_upload<F>(&self, form: &F) -> UploadResult
    where
        F: MultipartSource + Sync + ?Sized,
    {
        match self.try_upload(form).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Upload rejected");
                UploadResult::from(e)
            }
        }
    }

    async fn try_upload<F>(&self, form: &F) -> Result<UploadResult, UploadError>
    where
        F: MultipartSource + Sync + ?Sized,
    {
        let raw_sub_dir = form.text("sub_dir").unwrap_or_default();
        let max_size = self.effective_max_size(form.text("max_size"));

        let sub_dir = sanitize_sub_dir(raw_sub_dir)?;
        let paths = PathBuilder::new(&self.config, sub_dir.as_deref());

        let target_dir = paths.target_dir(&self.clock.now());
        self.ensure_dir(&target_dir, raw_sub_dir).await?;

        let files = extract_files(form)?;
        if files.is_empty() {
            return Ok(UploadResult::failure("No files provided", None));
        }

        let mut file_paths = Vec::with_capacity(files.len());
        let mut file_urls = Vec::with_capacity(files.len());

        for file in files {
            validate_file(&self.config, file, max_size)?;

            // The date directory may have rolled over since the request started.
            let now = self.clock.now();
            let dir = paths.target_dir(&now);
            if dir != target_dir {
                self.ensure_dir(&dir, raw_sub_dir).await?;
            }

            let filename = paths.filename(&file.filename, &now);
            self.sink.save(file.bytes(), &dir.join(&filename)).await.map_err(|source| {
                UploadError::Persist { filename: file.filename.clone(), source }
            })?;

            let relative_path = paths.relative_path(&filename, &now);
            file_urls.push(paths.public_url(&relative_path));
            file_paths.push(relative_path);
        }

        info!(count = file_paths.len(), "Images uploaded");
        Ok(UploadResult::uploaded(file_paths, file_urls))
    }

    /// Create `dir` and make sure it did not resolve outside the storage root.
    ///
    /// The deepest existing ancestor is checked before anything is created, so
    /// a symlink under the root cannot be used to create directories elsewhere.
    async fn ensure_dir(&self, dir: &Path, raw_sub_dir: &str) -> Result<(), UploadError> {
        let storage_path = &self.config.storage_path;
        self.sink.create_dir_all(storage_path).await.map_err(UploadError::DirCreate)?;
        let root = self.sink.resolve(storage_path).await.map_err(UploadError::DirCreate)?;

        let existing = self.deepest_existing(dir).await.map_err(UploadError::DirCreate)?;
        if !existing.starts_with(&root) {
            return Err(UploadError::InvalidSubDir(raw_sub_dir.to_string()));
        }

        self.sink.create_dir_all(dir).await.map_err(UploadError::DirCreate)?;

        let resolved = self.sink.resolve(dir).await.map_err(UploadError::DirCreate)?;
        if !resolved.starts_with(&root) {
            return Err(UploadError::InvalidSubDir(raw_sub_dir.to_string()));
        }
        Ok(())
    }

    /// Canonical form of the longest prefix of `dir` that already exists.
    async fn deepest_existing(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let mut last_err = None;
        for ancestor in dir.ancestors().filter(|a| !a.as_os_str().is_empty()) {
            match self.sink.resolve(ancestor).await {
                Ok(resolved) => return Ok(resolved),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => last_err = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| std::io::ErrorKind::NotFound.into()))
    }
}
