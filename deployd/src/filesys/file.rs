//! File operations

use std::fs::Permissions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::DeploydError;

/// A file wrapper with path
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
}

impl File {
    /// Create a new file reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the file exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Check if the path exists and is a regular file
    pub async fn is_file(&self) -> bool {
        fs::metadata(&self.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Read file contents as string
    pub async fn read_string(&self) -> Result<String, DeploydError> {
        Ok(fs::read_to_string(&self.path).await?)
    }

    /// Read file contents as bytes
    pub async fn read_bytes(&self) -> Result<Vec<u8>, DeploydError> {
        Ok(fs::read(&self.path).await?)
    }

    /// Read file as JSON
    pub async fn read_json<T: DeserializeOwned>(&self) -> Result<T, DeploydError> {
        let contents = self.read_string().await?;
        let value = serde_json::from_str(&contents)?;
        Ok(value)
    }

    /// Write string to file
    pub async fn write_string(&self, contents: &str) -> Result<(), DeploydError> {
        self.write_bytes(contents.as_bytes()).await
    }

    /// Write bytes to file
    pub async fn write_bytes(&self, contents: &[u8]) -> Result<(), DeploydError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&self.path).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Write JSON to file, indented with four spaces
    pub async fn write_json<T: Serialize>(&self, value: &T) -> Result<(), DeploydError> {
        let contents = to_json_pretty(value)?;
        self.write_atomic(&contents).await
    }

    /// Delete the file
    pub async fn delete(&self) -> Result<(), DeploydError> {
        if self.exists().await {
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }

    /// Replace the contents through a temporary file and a rename.
    ///
    /// A symlink is resolved first so the link survives and its target is
    /// updated. An existing file keeps its permissions. The temporary file
    /// never outlives a failed write.
    pub async fn write_atomic(&self, contents: &[u8]) -> Result<(), DeploydError> {
        let target = match fs::canonicalize(&self.path).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == ErrorKind::NotFound => self.path.clone(),
            Err(e) => return Err(e.into()),
        };
        let permissions = fs::metadata(&target).await.ok().map(|meta| meta.permissions());
        let temp_path = temp_path_for(&target);

        if let Err(e) = replace_via(&temp_path, &target, contents, permissions).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

async fn replace_via(
    temp_path: &Path,
    target: &Path,
    contents: &[u8],
    permissions: Option<Permissions>,
) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);
    if let Some(permissions) = permissions {
        fs::set_permissions(temp_path, permissions).await?;
    }
    fs::rename(temp_path, target).await
}

/// `<dir>/.<name>.<uuid>.tmp`, next to the file it replaces
fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
}

fn to_json_pretty<T: Serialize>(value: &T) -> Result<Vec<u8>, DeploydError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}
