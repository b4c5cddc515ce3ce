//! File-system backed deployment store
//!
//! Layout: `<root>/<name>/{docker-compose.yml,.env,databases.json}`. The
//! existence of the deployment directory is the existence of the deployment.
//! Hidden entries (staging and trash directories) are never deployments.

use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::deploy::merge::merge_typed;
use crate::errors::DeploydError;
use crate::filesys::dir::Dir;
use crate::models::deployment::{Databases, DatabasesPatch, Deployment};
use crate::storage::layout::StorageLayout;

const MAX_NAME_LEN: usize = 128;
const STAGING_PREFIX: &str = "staging";
const TRASH_PREFIX: &str = "trash";

/// Deployment names double as directory names.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn not_found() -> DeploydError {
    DeploydError::NotFound("Deployment does not exist".to_string())
}

fn conflict() -> DeploydError {
    DeploydError::Conflict("A deployment with same name already exists".to_string())
}

#[derive(Debug, Clone)]
pub struct DeploymentStore {
    layout: StorageLayout,
}

impl DeploymentStore {
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Directory of an existing deployment, `NotFound` otherwise
    async fn existing_dir(&self, name: &str) -> Result<Dir, DeploydError> {
        if !is_valid_name(name) {
            return Err(not_found());
        }
        let dir = self.layout.deployment_dir(name);
        if !dir.exists().await {
            return Err(not_found());
        }
        Ok(dir)
    }

    pub async fn exists(&self, name: &str) -> bool {
        is_valid_name(name) && self.layout.deployment_dir(name).exists().await
    }

    /// Path of the compose file of an existing deployment
    pub async fn compose_file(&self, name: &str) -> Result<PathBuf, DeploydError> {
        let dir = self.existing_dir(name).await?;
        let compose = StorageLayout::compose_file(&dir);
        if !compose.is_file().await {
            return Err(DeploydError::Corrupt(format!(
                "{} has no compose file",
                name
            )));
        }
        Ok(compose.path().to_path_buf())
    }

    /// Names of all deployments, sorted. Empty if the root does not exist.
    pub async fn list_names(&self) -> Result<Vec<String>, DeploydError> {
        let root = self.layout.root_dir();
        if !root.exists().await {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = root
            .list_dirs()
            .await?
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| is_valid_name(name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Write every artifact of `deployment` into a new hidden directory
    /// under the deployments root. Nothing is visible until [`commit`].
    ///
    /// [`commit`]: DeploymentStore::commit
    pub async fn stage(&self, deployment: &Deployment) -> Result<Dir, DeploydError> {
        let staging = self
            .stage_files(
                &deployment.compose_file,
                deployment.env_file.as_deref(),
            )
            .await?;

        if !deployment.databases.is_empty() {
            if let Err(e) = StorageLayout::databases_file(&staging)
                .write_json(&deployment.databases)
                .await
            {
                self.discard(staging).await;
                return Err(e);
            }
        }

        Ok(staging)
    }

    /// Stage only the compose and env artifacts, e.g. to validate an update
    pub async fn stage_files(
        &self,
        compose: &str,
        env: Option<&str>,
    ) -> Result<Dir, DeploydError> {
        let staging = self
            .layout
            .root_dir()
            .create_hidden_subdir(STAGING_PREFIX)
            .await?;
        debug!("Staging deployment files in {}", staging.path().display());

        let written = async {
            StorageLayout::compose_file(&staging)
                .write_string(compose)
                .await?;
            if let Some(env) = env {
                StorageLayout::env_file(&staging).write_string(env).await?;
            }
            Ok::<_, DeploydError>(())
        }
        .await;

        if let Err(e) = written {
            self.discard(staging).await;
            return Err(e);
        }
        Ok(staging)
    }

    /// Move a staged directory into place under `name`. The rename is the
    /// commit point: a concurrent deployment with the same name wins and this
    /// one fails with `Conflict`.
    pub async fn commit(&self, staging: Dir, name: &str) -> Result<(), DeploydError> {
        let target = self.layout.deployment_dir(name);
        if target.exists().await {
            self.discard(staging).await;
            return Err(conflict());
        }

        match staging.rename_to(target.path()).await {
            Ok(_) => Ok(()),
            Err(DeploydError::IoError(e))
                if matches!(
                    e.kind(),
                    io::ErrorKind::DirectoryNotEmpty | io::ErrorKind::AlreadyExists
                ) =>
            {
                self.discard(staging).await;
                Err(conflict())
            }
            Err(e) => {
                self.discard(staging).await;
                Err(e)
            }
        }
    }

    /// Remove a staging directory, logging instead of failing
    pub async fn discard(&self, staging: Dir) {
        if let Err(e) = staging.delete().await {
            warn!(
                "Failed to remove staging directory {}: {}",
                staging.path().display(),
                e
            );
        }
    }

    /// Read the full record of a deployment
    pub async fn read(&self, name: &str) -> Result<Deployment, DeploydError> {
        let dir = self.existing_dir(name).await?;

        let compose = StorageLayout::compose_file(&dir);
        if !compose.is_file().await {
            return Err(DeploydError::Corrupt(format!(
                "{} has no compose file",
                name
            )));
        }
        let compose_file = compose.read_string().await?;

        let env = StorageLayout::env_file(&dir);
        let env_file = if env.is_file().await {
            Some(env.read_string().await?)
        } else {
            None
        };

        let databases = Self::read_databases_in(name, &dir).await?;

        Ok(Deployment {
            name: name.to_string(),
            compose_file,
            env_file,
            databases,
        })
    }

    /// Read only the database map of a deployment
    pub async fn read_databases(&self, name: &str) -> Result<Databases, DeploydError> {
        let dir = self.existing_dir(name).await?;
        Self::read_databases_in(name, &dir).await
    }

    async fn read_databases_in(name: &str, dir: &Dir) -> Result<Databases, DeploydError> {
        let file = StorageLayout::databases_file(dir);
        if !file.is_file().await {
            return Ok(Databases::new());
        }
        file.read_json().await.map_err(|e| match e {
            DeploydError::JsonError(e) => {
                DeploydError::Corrupt(format!("{} has unreadable databases: {}", name, e))
            }
            other => other,
        })
    }

    /// Replace the compose file if `compose` is given
    pub async fn write_compose_if_present(
        &self,
        name: &str,
        compose: Option<&str>,
    ) -> Result<(), DeploydError> {
        let Some(compose) = compose else {
            return Ok(());
        };
        let dir = self.existing_dir(name).await?;
        StorageLayout::compose_file(&dir)
            .write_atomic(compose.as_bytes())
            .await
    }

    /// Replace the env file if `env` is `Some(Some(_))`, remove it on
    /// `Some(None)`, leave it alone on `None`
    pub async fn write_env_if_present(
        &self,
        name: &str,
        env: Option<Option<&str>>,
    ) -> Result<(), DeploydError> {
        let Some(env) = env else {
            return Ok(());
        };
        let dir = self.existing_dir(name).await?;
        let file = StorageLayout::env_file(&dir);
        match env {
            Some(contents) => file.write_atomic(contents.as_bytes()).await,
            None => file.delete().await,
        }
    }

    /// Merge a database patch into `databases.json` and return the result.
    /// The merged map is checked before anything is written.
    pub async fn merge_databases(
        &self,
        name: &str,
        patch: &DatabasesPatch,
    ) -> Result<Databases, DeploydError> {
        let merged = self.preview_databases(name, patch).await?;
        let dir = self.existing_dir(name).await?;
        StorageLayout::databases_file(&dir).write_json(&merged).await?;
        Ok(merged)
    }

    /// Compute the merged database map without writing it
    pub async fn preview_databases(
        &self,
        name: &str,
        patch: &DatabasesPatch,
    ) -> Result<Databases, DeploydError> {
        let current = self.read_databases(name).await?;
        merge_typed(&current, patch)
    }

    /// Remove a deployment and all its artifacts
    pub async fn delete(&self, name: &str) -> Result<(), DeploydError> {
        let dir = self.existing_dir(name).await?;
        let trash = self
            .layout
            .root_dir()
            .subdir(&format!(".{}-{}", TRASH_PREFIX, uuid::Uuid::new_v4()));

        let trash = dir.rename_to(trash.path()).await?;
        trash.delete().await
    }
}
