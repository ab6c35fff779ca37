use std::fs;
use std::path::Path;

use scene::StageConfig;

use crate::world_document::WorldDocumentError;

/// Reads a standalone stage configuration. Missing sections take defaults.
pub fn load_stage_config(path: impl AsRef<Path>) -> Result<StageConfig, WorldDocumentError> {
    let payload = fs::read_to_string(path).map_err(WorldDocumentError::Io)?;
    stage_config_from_str(&payload)
}

pub fn stage_config_from_str(payload: &str) -> Result<StageConfig, WorldDocumentError> {
    serde_json::from_str(payload).map_err(WorldDocumentError::Parse)
}
