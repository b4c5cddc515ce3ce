//! Shared fakes for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use openapi_server::models::{
    ContainerDetails, ContainersDeleted, PruneRequest, PruneResponse,
};

use deployd::app::options::AppOptions;
use deployd::app::state::AppState;
use deployd::deploy::compose::ComposeTool;
use deployd::deploy::service::DeploymentService;
use deployd::deploy::store::DeploymentStore;
use deployd::docker::runtime::ContainerRuntime;
use deployd::errors::DeploydError;
use deployd::models::deployment::{ComposeAction, DatabaseConfig, DbType, Deployment};
use deployd::storage::layout::{StorageLayout, COMPOSE_FILE_NAME};

/// Compose definitions containing this marker fail validation
pub const INVALID_MARKER: &str = "INVALID";

/// Compose tool that records every call instead of running anything
#[derive(Default)]
pub struct RecordingCompose {
    pub validations: Mutex<Vec<String>>,
    pub launches: Mutex<Vec<(PathBuf, ComposeAction)>>,
    pub fail_launch: bool,
}

impl RecordingCompose {
    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Default::default()
        }
    }

    pub fn launches(&self) -> Vec<(PathBuf, ComposeAction)> {
        self.launches.lock().unwrap().clone()
    }

    pub fn validation_count(&self) -> usize {
        self.validations.lock().unwrap().len()
    }
}

#[async_trait]
impl ComposeTool for RecordingCompose {
    async fn validate(&self, project_dir: &Path) -> Result<(), DeploydError> {
        let compose = tokio::fs::read_to_string(project_dir.join(COMPOSE_FILE_NAME)).await?;
        self.validations.lock().unwrap().push(compose.clone());
        if compose.contains(INVALID_MARKER) {
            return Err(DeploydError::InvalidInput(
                "Invalid docker-compose file: services must be a mapping".to_string(),
            ));
        }
        Ok(())
    }

    fn launch(&self, compose_file: &Path, action: ComposeAction) -> Result<(), DeploydError> {
        if self.fail_launch {
            return Err(DeploydError::ExecutionError(
                "Failed to run docker-compose: not found".to_string(),
            ));
        }
        self.launches
            .lock()
            .unwrap()
            .push((compose_file.to_path_buf(), action));
        Ok(())
    }
}

/// In-memory container runtime
#[derive(Default)]
pub struct FakeRuntime {
    pub containers: Mutex<HashMap<String, ContainerDetails>>,
    pub images: Mutex<HashMap<String, Vec<String>>>,
    pub removed: Mutex<Vec<String>>,
}

impl FakeRuntime {
    pub fn with_container(self, id: &str, status: &str) -> Self {
        self.containers.lock().unwrap().insert(
            id.to_string(),
            ContainerDetails {
                id: id.to_string(),
                name: format!("{}-name", id),
                status: status.to_string(),
                image: vec!["nginx:latest".to_string()],
                ports: HashMap::new(),
                created: "2024-01-01T00:00:00Z".to_string(),
            },
        );
        self
    }

    pub fn with_image(self, id: &str) -> Self {
        self.images.lock().unwrap().insert(id.to_string(), Vec::new());
        self
    }

    pub fn status(&self, id: &str) -> Option<String> {
        self.containers
            .lock()
            .unwrap()
            .get(id)
            .map(|c| c.status.clone())
    }

    fn set_status(&self, id: &str, status: &str) -> Result<(), DeploydError> {
        let mut containers = self.containers.lock().unwrap();
        let container = containers
            .get_mut(id)
            .ok_or_else(|| DeploydError::NotFound("Container not found".to_string()))?;
        container.status = status.to_string();
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list(&self) -> Result<Vec<ContainerDetails>, DeploydError> {
        let mut containers: Vec<_> = self.containers.lock().unwrap().values().cloned().collect();
        containers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(containers)
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetails, DeploydError> {
        self.containers
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| DeploydError::NotFound("Container not found".to_string()))
    }

    async fn start(&self, id: &str) -> Result<(), DeploydError> {
        self.set_status(id, "running")
    }

    async fn stop(&self, id: &str) -> Result<(), DeploydError> {
        self.set_status(id, "exited")
    }

    async fn restart(&self, id: &str) -> Result<(), DeploydError> {
        self.set_status(id, "running")
    }

    async fn kill(&self, id: &str) -> Result<(), DeploydError> {
        match self.status(id).as_deref() {
            None => Err(DeploydError::NotFound("Container not found".to_string())),
            Some("running") => self.set_status(id, "exited"),
            Some(_) => Err(DeploydError::UpstreamError(format!(
                "Container {} is not running",
                id
            ))),
        }
    }

    async fn remove(&self, id: &str, force: bool, _volumes: bool) -> Result<(), DeploydError> {
        match self.status(id).as_deref() {
            None => Err(DeploydError::NotFound("Container not found".to_string())),
            Some("running") if !force => Err(DeploydError::UpstreamError(
                "You cannot remove a running container".to_string(),
            )),
            Some(_) => {
                self.containers.lock().unwrap().remove(id);
                self.removed.lock().unwrap().push(id.to_string());
                Ok(())
            }
        }
    }

    async fn logs(&self, id: &str) -> Result<String, DeploydError> {
        self.inspect(id).await?;
        Ok("line one\nline two\n".to_string())
    }

    fn stream_logs(&self, _id: &str) -> BoxStream<'static, Result<Bytes, DeploydError>> {
        stream::iter(vec![
            Ok(Bytes::from_static(b"line one\n")),
            Ok(Bytes::from_static(b"line two\n")),
        ])
        .boxed()
    }

    async fn tag_image(&self, image_id: &str, tag: &str) -> Result<(), DeploydError> {
        let mut images = self.images.lock().unwrap();
        let tags = images
            .get_mut(image_id)
            .ok_or_else(|| DeploydError::NotFound("Image not found".to_string()))?;
        tags.push(tag.to_string());
        Ok(())
    }

    async fn prune(&self, request: &PruneRequest) -> Result<PruneResponse, DeploydError> {
        let mut response = PruneResponse::default();
        if request.containers() {
            let mut containers = self.containers.lock().unwrap();
            let stopped: Vec<String> = containers
                .values()
                .filter(|c| c.status != "running")
                .map(|c| c.id.clone())
                .collect();
            for id in &stopped {
                containers.remove(id);
            }
            response.containers = Some(ContainersDeleted {
                containers_deleted: stopped,
                space_reclaimed: 0,
            });
        }
        Ok(response)
    }
}

pub fn store_in(dir: &Path) -> DeploymentStore {
    DeploymentStore::new(StorageLayout::new(dir.join("deployments")))
}

pub fn service_in(dir: &Path, compose: Arc<RecordingCompose>) -> DeploymentService {
    DeploymentService::new(store_in(dir), compose)
}

pub async fn app_state_in(
    dir: &Path,
    compose: Arc<RecordingCompose>,
    runtime: Arc<FakeRuntime>,
) -> AppState {
    let options = AppOptions {
        storage: StorageLayout::new(dir.join("deployments")),
        reload_shell: "sh".to_string(),
        ..Default::default()
    };
    AppState::with_components(&options, compose, runtime)
        .await
        .unwrap()
}

/// The `db-stack` deployment used across tests
pub fn db_stack() -> Deployment {
    let mut databases = std::collections::BTreeMap::new();
    databases.insert(
        "primary".to_string(),
        DatabaseConfig {
            db_type: DbType::Mysql,
            username: "root".to_string(),
            password: "x".to_string(),
        },
    );
    Deployment {
        name: "db-stack".to_string(),
        compose_file: "services:\n  db:\n    image: mysql:8\n".to_string(),
        env_file: Some("PASSWORD=x".to_string()),
        databases,
    }
}
