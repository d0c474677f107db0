use std::fs;
use std::path::Path;

use recorder_core::RecorderConfig;

use crate::error::HostError;

/// Load and validate a recorder configuration from a JSON file.
///
/// Missing fields take the firmware defaults.
pub fn load_config(path: &Path) -> Result<RecorderConfig, HostError> {
    let json = fs::read_to_string(path)
        .map_err(|e| HostError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    parse_config(&json)
}

pub fn parse_config(json: &str) -> Result<RecorderConfig, HostError> {
    let config: RecorderConfig =
        serde_json::from_str(json).map_err(|e| HostError::Config(format!("failed to parse config: {}", e)))?;
    config.validate().map_err(HostError::Config)?;
    Ok(config)
}
