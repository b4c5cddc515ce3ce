//! Listing, hashing and archiving of config bucket files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use glob::Pattern;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::errors::DeploydError;
use crate::filesys::dir::Dir;
use crate::models::bucket::ConfigBucket;

const HASH_CHUNK_SIZE: usize = 128 * 1024;

/// Media type of bucket backups
pub const ARCHIVE_MEDIA_TYPE: &str = "application/x-tar";

/// A config bucket whose directory exists and whose patterns compile
#[derive(Debug, Clone)]
pub struct BucketScanner {
    dir: Dir,
    ignore: Vec<Pattern>,
}

impl BucketScanner {
    pub async fn open(bucket: &ConfigBucket) -> Result<Self, DeploydError> {
        let dir = Dir::new(&bucket.directory_path);
        if !dir.exists().await {
            return Err(DeploydError::InvalidInput(format!(
                "Directory does not exist: {}",
                bucket.directory_path.display()
            )));
        }

        let ignore = bucket
            .patterns()
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| {
                    DeploydError::InvalidInput(format!(
                        "Invalid ignore pattern {:?}: {}",
                        pattern, e
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { dir, ignore })
    }

    fn is_ignored(&self, file_name: &str) -> bool {
        self.ignore.iter().any(|pattern| pattern.matches(file_name))
    }

    /// Regular files directly inside the bucket, minus ignored ones,
    /// sorted by file name
    pub async fn list_files(&self) -> Result<Vec<PathBuf>, DeploydError> {
        let mut files: Vec<PathBuf> = self
            .dir
            .list_files()
            .await?
            .into_iter()
            .filter(|path| !self.is_ignored(&file_name(path)))
            .collect();
        files.sort_by_key(|path| file_name(path));
        Ok(files)
    }

    pub async fn file_names(&self) -> Result<Vec<String>, DeploydError> {
        Ok(self.list_files().await?.iter().map(|p| file_name(p)).collect())
    }

    /// SHA-256 hex digest of every listed file, keyed by file name
    pub async fn hash_files(&self) -> Result<BTreeMap<String, String>, DeploydError> {
        let mut hashes = BTreeMap::new();
        for path in self.list_files().await? {
            let digest = hash_file(&path).await?;
            hashes.insert(file_name(&path), digest);
        }
        Ok(hashes)
    }

    /// Gzip-compressed tar of the listed files, stored under bare file names
    pub async fn archive(&self) -> Result<Vec<u8>, DeploydError> {
        let files = self.list_files().await?;
        debug!(
            "Archiving {} file(s) from {}",
            files.len(),
            self.dir.path().display()
        );
        tokio::task::spawn_blocking(move || build_archive(&files)).await?
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn hash_file(path: &Path) -> Result<String, DeploydError> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

fn build_archive(files: &[PathBuf]) -> Result<Vec<u8>, DeploydError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for path in files {
        builder.append_path_with_name(path, file_name(path))?;
    }
    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}
