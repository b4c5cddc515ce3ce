//! Deployd API models

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Error body returned for every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericError {
    pub detail: String,
}

/// Plain confirmation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Which resource classes a prune request covers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PruneRequest {
    /// Delete stopped containers
    #[serde(default)]
    pub containers: bool,
    /// Delete unused images
    #[serde(default)]
    pub images: bool,
    /// Delete unused volumes
    #[serde(default)]
    pub volumes: bool,
    /// Delete unused networks
    #[serde(default)]
    pub networks: bool,
    /// Delete the builder cache
    #[serde(default)]
    pub build_cache: bool,
    /// All of the above
    #[serde(default)]
    pub all: bool,
}

impl PruneRequest {
    pub fn containers(&self) -> bool {
        self.containers || self.all
    }

    pub fn images(&self) -> bool {
        self.images || self.all
    }

    pub fn volumes(&self) -> bool {
        self.volumes || self.all
    }

    pub fn networks(&self) -> bool {
        self.networks || self.all
    }

    pub fn build_cache(&self) -> bool {
        self.build_cache || self.all
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainersDeleted {
    #[serde(rename = "ContainersDeleted", default)]
    pub containers_deleted: Vec<String>,
    #[serde(rename = "SpaceReclaimed", default)]
    pub space_reclaimed: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesDeleted {
    #[serde(rename = "ImagesDeleted", default)]
    pub images_deleted: Vec<String>,
    #[serde(rename = "SpaceReclaimed", default)]
    pub space_reclaimed: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworksDeleted {
    #[serde(rename = "NetworksDeleted", default)]
    pub networks_deleted: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumesDeleted {
    #[serde(rename = "VolumesDeleted", default)]
    pub volumes_deleted: Vec<String>,
    #[serde(rename = "SpaceReclaimed", default)]
    pub space_reclaimed: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCachesDeleted {
    #[serde(rename = "CachesDeleted", default)]
    pub caches_deleted: Vec<String>,
    #[serde(rename = "SpaceReclaimed", default)]
    pub space_reclaimed: i64,
}

/// Prune response, one section per pruned resource class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneResponse {
    pub containers: Option<ContainersDeleted>,
    pub images: Option<ImagesDeleted>,
    pub networks: Option<NetworksDeleted>,
    pub volumes: Option<VolumesDeleted>,
    pub build_cache: Option<BuildCachesDeleted>,
}

/// Published port binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    #[serde(rename = "HostIp")]
    pub host_ip: String,
    #[serde(rename = "HostPort")]
    pub host_port: String,
}

/// Container details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDetails {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default)]
    pub ports: HashMap<String, Vec<PortBinding>>,
    pub created: String,
}

/// Container delete request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub container_id: String,
    /// Force removal of a running container
    #[serde(default)]
    pub force: bool,
    /// Remove anonymous volumes
    #[serde(default)]
    pub v: bool,
}

/// Image tag request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTagRequest {
    pub image_id: String,
    /// `repository[:tag]`
    pub tag: String,
}

/// Container logs response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsResponse {
    pub container_id: String,
    pub logs: String,
}
