//! Directory handle used by the deployment store and config buckets

use std::fs::FileType;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::DeploydError;
use crate::filesys::file::File;

#[derive(Debug, Clone)]
pub struct Dir {
    path: PathBuf,
}

impl Dir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True only for an existing directory; a regular file at the path is not one
    pub async fn exists(&self) -> bool {
        matches!(fs::metadata(&self.path).await, Ok(meta) if meta.is_dir())
    }

    pub async fn create(&self) -> Result<(), DeploydError> {
        fs::create_dir_all(&self.path).await?;
        Ok(())
    }

    /// Remove the directory tree; a missing directory is not an error
    pub async fn delete(&self) -> Result<(), DeploydError> {
        match fs::remove_dir_all(&self.path).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }

    /// Move the directory to `target`. Fails if `target` exists and is not empty.
    pub async fn rename_to(&self, target: &Path) -> Result<Dir, DeploydError> {
        fs::rename(&self.path, target).await?;
        Ok(Dir::new(target))
    }

    /// Regular files directly inside the directory, in readdir order.
    /// Symlinks count as whatever they point to.
    pub async fn list_files(&self) -> Result<Vec<PathBuf>, DeploydError> {
        self.entries(|kind| kind.is_file()).await
    }

    /// Subdirectories directly inside the directory, in readdir order.
    /// Symlinks count as whatever they point to.
    pub async fn list_dirs(&self) -> Result<Vec<PathBuf>, DeploydError> {
        self.entries(|kind| kind.is_dir()).await
    }

    async fn entries(&self, keep: fn(&FileType) -> bool) -> Result<Vec<PathBuf>, DeploydError> {
        let mut found = Vec::new();
        let mut entries = fs::read_dir(&self.path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let mut kind = entry.file_type().await?;
            if kind.is_symlink() {
                // dangling links are skipped
                match fs::metadata(entry.path()).await {
                    Ok(target) => kind = target.file_type(),
                    Err(_) => continue,
                }
            }
            if keep(&kind) {
                found.push(entry.path());
            }
        }
        Ok(found)
    }

    pub fn file(&self, name: &str) -> File {
        File::new(self.path.join(name))
    }

    pub fn subdir(&self, name: &str) -> Dir {
        Dir::new(self.path.join(name))
    }

    /// Create `.<prefix>-<uuid>` inside this directory
    pub async fn create_hidden_subdir(&self, prefix: &str) -> Result<Dir, DeploydError> {
        let dir = self.subdir(&format!(".{}-{}", prefix, uuid::Uuid::new_v4()));
        fs::create_dir_all(dir.path()).await?;
        Ok(dir)
    }
}
