use crate::models::buffer::BufferId;
use crate::models::error::TransferError;

/// Event raised by the capture path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    BufferComplete { id: BufferId, sequence: u64 },
    Error(TransferError),
}

/// Receiver for capture events.
///
/// Called from interrupt context. Implementations must return quickly and
/// must not touch the storage medium; heavy work belongs in the main loop,
/// which learns about ready buffers through the mailbox.
pub trait CaptureEventSink: Send + Sync {
    fn on_event(&self, event: &CaptureEvent);
}

impl<F> CaptureEventSink for F
where
    F: Fn(&CaptureEvent) + Send + Sync,
{
    fn on_event(&self, event: &CaptureEvent) {
        self(event)
    }
}
