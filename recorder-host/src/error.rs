use thiserror::Error;

use recorder_core::RecorderError;

/// Errors from the host backend's own files (config, metadata sidecars).
#[derive(Debug, Error)]
pub enum HostError {
    #[error("config error: {0}")]
    Config(String),

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error(transparent)]
    Recorder(#[from] RecorderError),
}
