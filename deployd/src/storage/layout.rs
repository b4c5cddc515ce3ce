//! Storage layout configuration

use std::path::PathBuf;

use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Compose definition file name inside a deployment directory
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

/// Environment file name inside a deployment directory
pub const ENV_FILE_NAME: &str = ".env";

/// Database credentials file name inside a deployment directory
pub const DATABASES_FILE_NAME: &str = "databases.json";

/// Storage layout for deployments: one directory per deployment under `base_dir`
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Deployments root
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the deployments root directory
    pub fn root_dir(&self) -> Dir {
        Dir::new(&self.base_dir)
    }

    /// Get the directory of a single deployment
    pub fn deployment_dir(&self, name: &str) -> Dir {
        self.root_dir().subdir(name)
    }

    /// Get the compose file of a deployment directory
    pub fn compose_file(dir: &Dir) -> File {
        dir.file(COMPOSE_FILE_NAME)
    }

    /// Get the env file of a deployment directory
    pub fn env_file(dir: &Dir) -> File {
        dir.file(ENV_FILE_NAME)
    }

    /// Get the databases file of a deployment directory
    pub fn databases_file(dir: &Dir) -> File {
        dir.file(DATABASES_FILE_NAME)
    }

    /// Setup the storage layout (create the deployments root)
    pub async fn setup(&self) -> Result<(), crate::errors::DeploydError> {
        self.root_dir().create().await
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new(".serverctl")
    }
}
