use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub(crate) enum FileStoreError {
    #[error("invalid file name")]
    InvalidName,
    #[error("file not found")]
    NotFound,
    #[error("file already exists")]
    AlreadyExists,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A flat directory of files addressed by plain file names. Names with
/// separators or parent components never reach the filesystem.
#[derive(Debug, Clone)]
pub(crate) struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) async fn ensure_root(&self) -> Result<(), FileStoreError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub(crate) fn path_for(&self, name: &str) -> Result<PathBuf, FileStoreError> {
        validate_file_name(name)?;
        Ok(self.root.join(name))
    }

    pub(crate) async fn exists(&self, name: &str) -> Result<bool, FileStoreError> {
        let path = self.path_for(name)?;
        Ok(fs::try_exists(path).await?)
    }

    pub(crate) async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), FileStoreError> {
        let path = self.path_for(name)?;
        self.ensure_root().await?;
        fs::write(path, bytes).await?;
        Ok(())
    }

    pub(crate) async fn read(&self, name: &str) -> Result<Vec<u8>, FileStoreError> {
        let path = self.path_for(name)?;
        fs::read(path).await.map_err(not_found_or_io)
    }

    /// Size in bytes, `None` when the file is missing.
    pub(crate) async fn size(&self, name: &str) -> Result<Option<u64>, FileStoreError> {
        let path = self.path_for(name)?;
        match fs::metadata(path).await {
            Ok(metadata) => Ok(Some(metadata.len())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) async fn rename(&self, from: &str, to: &str) -> Result<(), FileStoreError> {
        let source = self.path_for(from)?;
        let target = self.path_for(to)?;

        if fs::try_exists(&target).await? {
            return Err(FileStoreError::AlreadyExists);
        }

        fs::rename(source, target).await.map_err(not_found_or_io)
    }

    /// Returns `false` when there was nothing to delete.
    pub(crate) async fn delete(&self, name: &str) -> Result<bool, FileStoreError> {
        let path = self.path_for(name)?;
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

fn validate_file_name(name: &str) -> Result<(), FileStoreError> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return Err(FileStoreError::InvalidName);
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(FileStoreError::InvalidName),
    }
}

fn not_found_or_io(err: std::io::Error) -> FileStoreError {
    if err.kind() == ErrorKind::NotFound {
        FileStoreError::NotFound
    } else {
        FileStoreError::Io(err)
    }
}

pub(crate) fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
