/// Storage-writer state machine.
///
/// State transitions:
/// ```text
/// mount_wait → open_file → write ⇄ write → close_file → idle
///                  ↓          ↓
///                error ──────────────────────────────→ idle
/// ```
/// Abrupt removal of the medium forces `Error` from any state but `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    MountWait,
    OpenFile,
    Write,
    CloseFile,
    Error,
    Idle,
}

impl WriterState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a file is open for this state.
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Write | Self::CloseFile)
    }
}

/// Lifecycle of the capture manager.
///
/// ```text
/// uninitialized → initialized → active ⇄ stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Uninitialized,
    Initialized,
    Active,
    Stopped,
}

impl CaptureState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}
