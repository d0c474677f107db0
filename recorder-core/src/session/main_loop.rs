use crate::capture::manager::CaptureManager;
use crate::models::buffer::BUFFER_SAMPLES;
use crate::models::config::{OverrunPolicy, RecorderConfig};
use crate::models::error::RecorderError;
use crate::models::state::WriterState;
use crate::storage::writer::{ReadyBuffer, StorageWriter};
use crate::traits::clock::Clock;
use crate::traits::dma_engine::DmaEngine;
use crate::traits::storage_medium::{MediaEvent, StorageMedium};

/// Out-of-band control from the button or the BLE/SPI command link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Start,
    /// Finish the buffer in flight, then stop capture and close the file.
    Stop,
}

/// Single-threaded cooperative driver for the capture-to-storage pipeline.
///
/// Data flow per [`tasks`](Self::tasks) call:
/// ```text
/// [DMA interrupt] → [ReadyMailbox] → take_completed → [StorageWriter] → medium
/// ```
/// Never blocks waiting for a buffer. The only blocking call is the medium
/// write, which must finish within one buffer fill time.
pub struct Recorder<E, M: StorageMedium, C: Clock, const N: usize = BUFFER_SAMPLES> {
    capture: CaptureManager<E, N>,
    writer: StorageWriter<M, C>,
    overrun_policy: OverrunPolicy,
    overruns_seen: u64,
    /// Graceful stop pending: stop once this transfer has been drained.
    stop_after: Option<u64>,
}

impl<E, M, C, const N: usize> Recorder<E, M, C, N>
where
    E: DmaEngine<N>,
    M: StorageMedium,
    C: Clock,
{
    pub fn new(engine: E, medium: M, clock: C, config: &RecorderConfig) -> Result<Self, RecorderError> {
        Ok(Self {
            capture: CaptureManager::new(engine),
            writer: StorageWriter::new(medium, clock, config)?,
            overrun_policy: config.overrun_policy,
            overruns_seen: 0,
            stop_after: None,
        })
    }

    /// Bring up the capture path and start the ping-pong loop.
    pub fn initialize(&mut self) -> Result<(), RecorderError> {
        self.capture.initialize()?;
        self.overruns_seen = 0;
        self.capture.start()?;
        Ok(())
    }

    pub fn on_media_event(&mut self, event: MediaEvent<'_>) {
        self.writer.on_media_event(event);
    }

    pub fn request(&mut self, request: ControlRequest) -> Result<(), RecorderError> {
        match request {
            ControlRequest::Start => {
                log::info!("start requested");
                self.stop_after = None;
                self.capture.start()?;
                self.writer.request_start();
            }
            ControlRequest::Stop => {
                log::info!("stop requested");
                if self.capture.is_active() && self.writer.state() == WriterState::Write {
                    self.stop_after = Some(self.capture.get_transfer_count() + 1);
                } else {
                    self.halt();
                }
            }
        }
        Ok(())
    }

    /// One main-loop iteration.
    pub fn tasks(&mut self) {
        self.check_overruns();

        let drained = match self.capture.take_completed() {
            Some(lease) => {
                let samples = lease.samples();
                // Samples go to the medium in memory order, as the DMA left them.
                let payload: &[u8] = bytemuck::cast_slice(&samples[..]);
                let persisted = self.writer.tasks(Some(ReadyBuffer {
                    id: lease.id(),
                    sequence: lease.sequence(),
                    payload,
                }));
                if persisted && !lease.is_intact() {
                    log::warn!(
                        "buffer {} (#{}) was overwritten while being written",
                        lease.id(),
                        lease.sequence()
                    );
                }
                Some(lease.sequence())
            }
            None => {
                self.writer.tasks(None);
                None
            }
        };

        if let (Some(target), Some(sequence)) = (self.stop_after, drained) {
            if sequence >= target {
                self.halt();
            }
        }
    }

    pub fn capture(&self) -> &CaptureManager<E, N> {
        &self.capture
    }

    pub fn writer(&self) -> &StorageWriter<M, C> {
        &self.writer
    }

    pub fn is_stopping(&self) -> bool {
        self.stop_after.is_some()
    }

    // --- Internal helpers ---

    fn halt(&mut self) {
        self.stop_after = None;
        self.capture.stop();
        self.writer.suspend_auto_start();
        self.writer.request_close();
    }

    fn check_overruns(&mut self) {
        let total = self.capture.overrun_count();
        if total <= self.overruns_seen {
            return;
        }
        let new = total - self.overruns_seen;
        self.overruns_seen = total;

        match self.overrun_policy {
            OverrunPolicy::Continue => {
                log::warn!("{} capture overrun(s), {} total; continuing", new, total);
            }
            OverrunPolicy::StopRecording => {
                log::error!("{} capture overrun(s), {} total; stopping", new, total);
                self.halt();
            }
        }
    }
}
