use thiserror::Error;

use super::buffer::BufferId;

/// Failure to bring up the capture path.
///
/// Fatal for the current attempt. The caller may retry from a clean state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("audio peripheral unavailable: {0}")]
    PeripheralUnavailable(String),

    #[error("DMA configuration failed: {0}")]
    Configuration(String),

    #[error("capture is active; stop it before re-initializing")]
    Active,
}

/// Failure to arm the DMA engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("capture manager not initialized")]
    NotInitialized,

    #[error("failed to arm DMA engine: {0}")]
    Arm(String),
}

/// Transfer-level fault raised from interrupt context.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// The engine wrapped onto a buffer the consumer had not released.
    #[error("overrun: buffer {buffer} reused before it was drained")]
    Overrun { buffer: BufferId },

    #[error("DMA engine reported a transfer error")]
    Hardware,
}

/// Errors from the storage medium collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("failed to open {0}")]
    Open(String),

    #[error("seek failed: {0}")]
    Seek(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("short write: requested {requested} bytes, wrote {written}")]
    ShortWrite { requested: usize, written: usize },

    #[error("sync failed: {0}")]
    Sync(String),

    #[error("close failed: {0}")]
    Close(String),

    #[error("file name does not fit the name buffer")]
    NameTooLong,

    #[error("no file is open")]
    NotOpen,
}

/// Top-level error for callers driving the whole pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Start(#[from] StartError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
