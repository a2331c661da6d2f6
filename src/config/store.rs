use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A wrapper for the session store configuration:
/// - enabled: if false, the session only lives in memory for this process.
/// - backend: the actual persistence backend (a JSON file, etc.).
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct StoreConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub backend: Option<StoreBackend>,
}

/// The existing store backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreBackend {
    #[serde(rename = "file")]
    File(FileStoreConfig),
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStoreConfig {
    pub path: PathBuf,
}
