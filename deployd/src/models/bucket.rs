//! Config bucket models

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A directory of configuration files, described per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigBucket {
    /// Directory holding the config file(s); must exist
    pub directory_path: PathBuf,

    /// Unix shell-style patterns; matching file names are ignored
    #[serde(default)]
    pub ignore_patterns: Option<BTreeSet<String>>,

    /// Command run to reload the config after validation or a change
    #[serde(default)]
    pub update_command: Option<String>,
}

impl ConfigBucket {
    pub fn patterns(&self) -> Vec<String> {
        self.ignore_patterns
            .iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// Query selecting a single file of a bucket
#[derive(Debug, Clone, Deserialize)]
pub struct FileQuery {
    pub file_path: PathBuf,
}

/// Body of a file delete request
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteFileRequest {
    pub update_command: String,
}
