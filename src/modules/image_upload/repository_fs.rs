use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::modules::image_upload::repository::UploadSink;

/// Local filesystem sink.
///
/// Writes go to a hidden temporary next to the destination and are renamed
/// into place once complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl FsSink {
    pub fn new() -> Self {
        Self
    }
}

fn temp_path(dest: &Path) -> PathBuf {
    let name = dest.file_name().and_then(|n| n.to_str()).unwrap_or("upload");
    dest.with_file_name(format!(".{}.{}.part", name, Uuid::now_v7()))
}

#[async_trait::async_trait]
impl UploadSink for FsSink {
    async fn create_dir_all(&self, dir: &Path) -> std::io::Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder.create(dir).await
    }

    async fn resolve(&self, path: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::canonicalize(path).await
    }

    async fn save(&self, bytes: &[u8], dest: &Path) -> std::io::Result<()> {
        let tmp = temp_path(dest);

        if let Err(e) = tokio::fs::write(&tmp, bytes).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&tmp, dest).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn creates_nested_dirs_idempotently() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("2024/03/15/avatars");

        FsSink.create_dir_all(&dir).await.unwrap();
        FsSink.create_dir_all(&dir).await.unwrap();

        assert!(dir.is_dir());
    }

    #[cfg(unix)]
    #[actix_web::test]
    async fn dirs_are_not_world_writable() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a");
        FsSink.create_dir_all(&dir).await.unwrap();

        let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o002, 0);
    }

    #[actix_web::test]
    async fn save_writes_bytes_and_leaves_no_temporaries() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("a_1.png");

        FsSink.save(b"first", &dest).await.unwrap();
        FsSink.save(b"second", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"second");
        let entries = std::fs::read_dir(root.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[actix_web::test]
    async fn save_into_missing_dir_fails_cleanly() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("missing").join("a.png");

        assert!(FsSink.save(b"x", &dest).await.is_err());
        assert!(!dest.exists());
    }

    #[actix_web::test]
    async fn resolve_canonicalizes() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a");
        FsSink.create_dir_all(&dir).await.unwrap();

        let resolved = FsSink.resolve(&root.path().join("a/../a")).await.unwrap();
        assert_eq!(resolved, std::fs::canonicalize(&dir).unwrap());
    }
}
