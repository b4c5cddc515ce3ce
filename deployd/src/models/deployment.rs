//! Deployment models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::patch::Patch;

/// Supported database services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    Mysql,
    Mongodb,
}

/// Credentials for one database service of a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "dbtype", alias = "type")]
    pub db_type: DbType,
    pub username: String,
    pub password: String,
}

/// Partial update of a [`DatabaseConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfigPatch {
    #[serde(
        rename = "dbtype",
        alias = "type",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub db_type: Patch<DbType>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub username: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub password: Patch<String>,
}

/// Database services keyed by their compose service name
pub type Databases = BTreeMap<String, DatabaseConfig>;

/// Database patches keyed by their compose service name
pub type DatabasesPatch = BTreeMap<String, DatabaseConfigPatch>;

/// A named deployment: compose definition, optional env file and database credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Unique name, also the directory name on disk
    pub name: String,

    /// Inline docker-compose file content
    pub compose_file: String,

    /// Inline .env file content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<String>,

    /// Database services
    #[serde(default)]
    pub databases: Databases,
}

/// Partial update of a [`Deployment`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPatch {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub compose_file: Patch<String>,

    /// `null` removes the env file
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub env_file: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub databases: Patch<DatabasesPatch>,
}

/// Compose action for `up` / `down`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeAction {
    Up,
    Down,
}

impl ComposeAction {
    /// Compose sub-command arguments
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            ComposeAction::Up => &["up", "-d"],
            ComposeAction::Down => &["down"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComposeAction::Up => "up",
            ComposeAction::Down => "down",
        }
    }
}
