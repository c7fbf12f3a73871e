use std::path::{Path, PathBuf};

/// Where accepted uploads end up.
#[async_trait::async_trait]
pub trait UploadSink {
    /// Create `dir` and its parents. Must succeed when the directory already exists.
    async fn create_dir_all(&self, dir: &Path) -> std::io::Result<()>;

    /// Canonical form of an existing path, used for containment checks.
    async fn resolve(&self, path: &Path) -> std::io::Result<PathBuf>;

    /// Persist `bytes` at `dest`, replacing any existing file.
    async fn save(&self, bytes: &[u8], dest: &Path) -> std::io::Result<()>;
}
