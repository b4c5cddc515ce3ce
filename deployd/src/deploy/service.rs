//! Deployment lifecycle: create, read, update, delete, up and down

use std::sync::Arc;

use tracing::{debug, info};

use crate::deploy::compose::ComposeTool;
use crate::deploy::locks::NameLocks;
use crate::deploy::store::{is_valid_name, DeploymentStore};
use crate::errors::DeploydError;
use crate::models::deployment::{ComposeAction, Databases, Deployment, DeploymentPatch};
use crate::models::patch::Patch;

pub struct DeploymentService {
    store: DeploymentStore,
    compose: Arc<dyn ComposeTool>,
    locks: NameLocks,
}

impl DeploymentService {
    pub fn new(store: DeploymentStore, compose: Arc<dyn ComposeTool>) -> Self {
        Self {
            store,
            compose,
            locks: NameLocks::new(),
        }
    }

    /// Validate and persist a new deployment, returning the stored record
    pub async fn create(&self, deployment: Deployment) -> Result<Deployment, DeploydError> {
        if !is_valid_name(&deployment.name) {
            return Err(DeploydError::InvalidInput(format!(
                "Invalid deployment name: {:?}",
                deployment.name
            )));
        }

        let _guard = self.locks.lock(&deployment.name).await;

        if self.store.exists(&deployment.name).await {
            return Err(DeploydError::Conflict(
                "A deployment with same name already exists".to_string(),
            ));
        }

        let staging = self.store.stage(&deployment).await?;
        let validated = self.compose.validate(staging.path()).await;
        if let Err(e) = validated {
            self.store.discard(staging).await;
            return Err(e);
        }
        self.store.commit(staging, &deployment.name).await?;

        info!("Created deployment {}", deployment.name);
        self.store.read(&deployment.name).await
    }

    /// Database map of a deployment
    pub async fn get(&self, name: &str) -> Result<Databases, DeploydError> {
        self.store.read_databases(name).await
    }

    /// Full record of a deployment
    pub async fn definition(&self, name: &str) -> Result<Deployment, DeploydError> {
        self.store.read(name).await
    }

    pub async fn list(&self) -> Result<Vec<String>, DeploydError> {
        self.store.list_names().await
    }

    /// Apply a partial update and return the effective record.
    ///
    /// Every check (compose validation, database shape) runs before the
    /// first write.
    pub async fn update(
        &self,
        name: &str,
        patch: DeploymentPatch,
    ) -> Result<Deployment, DeploydError> {
        let _guard = self.locks.lock(name).await;
        let current = self.store.read(name).await?;

        let compose = match &patch.compose_file {
            Patch::Absent => None,
            Patch::Null => {
                return Err(DeploydError::InvalidInput(
                    "compose_file cannot be null".to_string(),
                ))
            }
            Patch::Value(compose) => Some(compose.as_str()),
        };

        let env = match &patch.env_file {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(env) => Some(Some(env.as_str())),
        };

        let databases = match &patch.databases {
            Patch::Absent => None,
            Patch::Null => {
                return Err(DeploydError::InvalidInput(
                    "databases cannot be null".to_string(),
                ))
            }
            Patch::Value(databases) => Some(databases),
        };

        if let Some(compose) = compose {
            let effective_env = match env {
                Some(env) => env,
                None => current.env_file.as_deref(),
            };
            let staging = self.store.stage_files(compose, effective_env).await?;
            let validated = self.compose.validate(staging.path()).await;
            self.store.discard(staging).await;
            validated?;
        }

        if let Some(databases) = databases {
            debug!("Merging {} database patch(es) into {}", databases.len(), name);
            self.store.merge_databases(name, databases).await?;
        }
        self.store.write_compose_if_present(name, compose).await?;
        self.store.write_env_if_present(name, env).await?;

        info!("Updated deployment {}", name);
        self.store.read(name).await
    }

    pub async fn delete(&self, name: &str) -> Result<(), DeploydError> {
        let _guard = self.locks.lock(name).await;
        self.store.delete(name).await?;
        info!("Deleted deployment {}", name);
        Ok(())
    }

    /// Launch `up -d` for a deployment without waiting for it to finish
    pub async fn up(&self, name: &str) -> Result<(), DeploydError> {
        self.launch(name, ComposeAction::Up).await
    }

    /// Launch `down` for a deployment without waiting for it to finish
    pub async fn down(&self, name: &str) -> Result<(), DeploydError> {
        self.launch(name, ComposeAction::Down).await
    }

    async fn launch(&self, name: &str, action: ComposeAction) -> Result<(), DeploydError> {
        let compose_file = {
            let _guard = self.locks.lock(name).await;
            self.store.compose_file(name).await?
        };
        self.compose.launch(&compose_file, action)
    }
}
