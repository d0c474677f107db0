use std::fmt::Write as _;

use crate::models::buffer::BufferId;
use crate::models::config::{RecorderConfig, FILE_NAME_CAPACITY};
use crate::models::error::{RecorderError, StorageError};
use crate::models::recording::RecordingSummary;
use crate::models::state::WriterState;
use crate::processing::wav_format::{self, WavFormat, HEADER_SIZE, RIFF_OVERHEAD};
use crate::traits::clock::{Clock, TimeOfDay};
use crate::traits::storage_medium::{MediaEvent, MediaFile, StorageMedium};

/// Fixed-capacity recording file name.
pub type FileName = heapless::String<FILE_NAME_CAPACITY>;

/// Largest payload a 32-bit RIFF size field can describe.
const MAX_DATA_SIZE: u64 = (u32::MAX - RIFF_OVERHEAD) as u64;

/// A completed capture buffer handed to the writer by the main loop.
#[derive(Debug, Clone, Copy)]
pub struct ReadyBuffer<'a> {
    pub id: BufferId,
    pub sequence: u64,
    pub payload: &'a [u8],
}

/// Build `<prefix>_HHMMSS.<extension>`.
pub fn recording_file_name(prefix: &str, time: TimeOfDay, extension: &str) -> Result<FileName, StorageError> {
    let mut name = FileName::new();
    write!(
        name,
        "{}_{:02}{:02}{:02}.{}",
        prefix, time.hour, time.minute, time.second, extension
    )
    .map_err(|_| StorageError::NameTooLong)?;
    Ok(name)
}

struct Recording<F> {
    file: F,
    file_name: FileName,
    bytes_written: u64,
    buffers_written: u64,
}

/// Storage-writer state machine.
///
/// Turns completed capture buffers into a growing WAV file on the medium.
/// Driven by [`tasks`](Self::tasks) once per main-loop iteration and by
/// media events from the file-system layer. Every error ends the current
/// recording and lands in `Idle`; nothing here unwinds past the writer.
pub struct StorageWriter<M: StorageMedium, C: Clock> {
    medium: M,
    clock: C,
    format: WavFormat,
    file_prefix: String,
    file_extension: String,
    mount_name: String,
    auto_start_on_mount: bool,
    /// Auto-start held off after a deliberate stop, until the next start request.
    auto_start_suspended: bool,

    state: WriterState,
    /// Medium currently mounted.
    mounted: bool,
    /// A mount happened that no state has consumed yet.
    mount_pending: bool,
    start_requested: bool,
    close_requested: bool,

    recording: Option<Recording<M::File>>,
    last_recording: Option<RecordingSummary>,
    last_error: Option<StorageError>,
}

impl<M: StorageMedium, C: Clock> StorageWriter<M, C> {
    pub fn new(medium: M, clock: C, config: &RecorderConfig) -> Result<Self, RecorderError> {
        config.validate().map_err(RecorderError::Config)?;

        Ok(Self {
            medium,
            clock,
            format: config.wav_format(),
            file_prefix: config.file_prefix.clone(),
            file_extension: config.file_extension.clone(),
            mount_name: config.mount_name.clone(),
            auto_start_on_mount: config.auto_start_on_mount,
            auto_start_suspended: false,
            state: WriterState::MountWait,
            mounted: false,
            mount_pending: false,
            start_requested: false,
            close_requested: false,
            recording: None,
            last_recording: None,
            last_error: None,
        })
    }

    /// File-system event handler.
    pub fn on_media_event(&mut self, event: MediaEvent<'_>) {
        match event {
            MediaEvent::Mounted(volume) if volume == self.mount_name => {
                log::info!("medium mounted at {}", volume);
                self.mounted = true;
                // A mount seen mid-recording is not a reason to start another one.
                self.mount_pending = !self.state.is_recording() && self.state != WriterState::OpenFile;
            }
            MediaEvent::Unmounted(volume) if volume == self.mount_name => {
                self.mounted = false;
                self.mount_pending = false;
                if !self.state.is_idle() {
                    log::warn!("medium ejected abruptly in state {:?}", self.state);
                    self.state = WriterState::Error;
                }
            }
            MediaEvent::Mounted(volume) | MediaEvent::Unmounted(volume) => {
                log::debug!("ignoring event for foreign volume {}", volume);
            }
            MediaEvent::Error => {
                log::warn!("file system reported a media error");
            }
        }
    }

    /// Ask for a new recording. Honored in `Idle` once the medium is mounted.
    ///
    /// Also lifts a suspension of auto-start.
    pub fn request_start(&mut self) {
        self.auto_start_suspended = false;
        if self.state.is_idle() {
            self.start_requested = true;
        }
    }

    /// Ask for the current recording to be finalized.
    ///
    /// From `Write` this leads to `CloseFile`; while still waiting for the
    /// medium it cancels the wait.
    pub fn request_close(&mut self) {
        match self.state {
            WriterState::MountWait | WriterState::OpenFile | WriterState::Write => {
                self.close_requested = true;
            }
            _ => {}
        }
    }

    /// Stop reopening files on mount until the next
    /// [`request_start`](Self::request_start). Used when capture is stopped
    /// on purpose and no buffers would follow.
    pub fn suspend_auto_start(&mut self) {
        self.auto_start_suspended = true;
        self.start_requested = false;
    }

    pub fn is_auto_start_suspended(&self) -> bool {
        self.auto_start_suspended
    }

    /// Advance the state machine by one step.
    ///
    /// `ready` is the buffer the capture path completed since the last call,
    /// if any. Returns true when that buffer was written and flushed; buffers
    /// arriving outside `Write` are discarded.
    pub fn tasks(&mut self, ready: Option<ReadyBuffer<'_>>) -> bool {
        let mut persisted = false;

        match self.state {
            WriterState::MountWait => {
                if self.close_requested {
                    self.close_requested = false;
                    self.state = WriterState::Idle;
                } else if self.mount_pending {
                    self.mount_pending = false;
                    self.state = WriterState::OpenFile;
                }
            }
            WriterState::OpenFile => match self.open_recording() {
                Ok(()) => self.state = WriterState::Write,
                Err(e) => self.fail(e),
            },
            WriterState::Write => {
                if let Some(buffer) = ready.as_ref() {
                    match self.write_buffer(buffer) {
                        Ok(()) => persisted = true,
                        Err(e) => {
                            self.fail(e);
                            return false;
                        }
                    }
                }
                if self.close_requested {
                    self.close_requested = false;
                    self.state = WriterState::CloseFile;
                }
            }
            WriterState::CloseFile => match self.finalize() {
                Ok(summary) => {
                    log::info!(
                        "recording {} closed: {} bytes in {} buffers; safe to eject",
                        summary.file_name,
                        summary.bytes_written,
                        summary.buffers_written
                    );
                    self.last_recording = Some(summary);
                    self.state = WriterState::Idle;
                }
                Err(e) => self.fail(e),
            },
            WriterState::Error => {
                log::error!(
                    "storage writer error{}",
                    self.last_error
                        .as_ref()
                        .map(|e| format!(": {}", e))
                        .unwrap_or_default()
                );
                // Abandon without further I/O; the last synced header stands.
                if let Some(recording) = self.recording.take() {
                    log::warn!(
                        "abandoned {} after {} bytes",
                        recording.file_name,
                        recording.bytes_written
                    );
                }
                self.close_requested = false;
                self.state = WriterState::Idle;
            }
            WriterState::Idle => {
                let remount = self.mount_pending && self.auto_start_on_mount && !self.auto_start_suspended;
                let requested = self.start_requested && self.mounted;
                self.mount_pending = false;
                if remount || requested {
                    self.start_requested = false;
                    self.state = WriterState::OpenFile;
                }
            }
        }

        if let (Some(buffer), false) = (ready, persisted) {
            log::debug!(
                "buffer {} (#{}) discarded in state {:?}",
                buffer.id,
                buffer.sequence,
                self.state
            );
        }
        persisted
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Payload bytes in the open recording, excluding the header.
    pub fn bytes_written(&self) -> u64 {
        self.recording.as_ref().map_or(0, |r| r.bytes_written)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.recording.as_ref().map(|r| r.file_name.as_str())
    }

    pub fn last_recording(&self) -> Option<&RecordingSummary> {
        self.last_recording.as_ref()
    }

    pub fn last_error(&self) -> Option<&StorageError> {
        self.last_error.as_ref()
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    // --- Internal helpers ---

    fn fail(&mut self, error: StorageError) {
        log::error!("storage writer failed in state {:?}: {}", self.state, error);
        self.last_error = Some(error);
        self.state = WriterState::Error;
    }

    fn open_recording(&mut self) -> Result<(), StorageError> {
        let name = recording_file_name(&self.file_prefix, self.clock.time_of_day(), &self.file_extension)?;
        let mut file = self.medium.open_write(&name)?;

        let header = wav_format::generate_header(&self.format, 0);
        write_at(&mut file, 0, &header)?;
        file.sync()?;

        log::info!("audio file opened: {}", name);
        self.last_error = None;
        self.recording = Some(Recording {
            file,
            file_name: name,
            bytes_written: 0,
            buffers_written: 0,
        });
        Ok(())
    }

    fn write_buffer(&mut self, buffer: &ReadyBuffer<'_>) -> Result<(), StorageError> {
        let recording = self.recording.as_mut().ok_or(StorageError::NotOpen)?;

        write_at(
            &mut recording.file,
            HEADER_SIZE as u64 + recording.bytes_written,
            buffer.payload,
        )?;
        recording.bytes_written += buffer.payload.len() as u64;
        recording.buffers_written += 1;

        // Write-through: at most one buffer is lost on power failure.
        recording.file.sync()?;

        log::debug!(
            "buffer {} (#{}) written: {} bytes, {} total",
            buffer.id,
            buffer.sequence,
            buffer.payload.len(),
            recording.bytes_written
        );
        Ok(())
    }

    fn finalize(&mut self) -> Result<RecordingSummary, StorageError> {
        let Recording {
            mut file,
            file_name,
            bytes_written,
            buffers_written,
        } = self.recording.take().ok_or(StorageError::NotOpen)?;

        if bytes_written > MAX_DATA_SIZE {
            log::warn!(
                "{} holds {} bytes; header size fields saturate",
                file_name,
                bytes_written
            );
        }
        let data_size = bytes_written.min(MAX_DATA_SIZE) as u32;

        let header = wav_format::generate_header(&self.format, data_size);
        write_at(&mut file, 0, &header)?;
        file.sync()?;
        file.close()?;

        Ok(RecordingSummary::new(
            &file_name,
            bytes_written,
            buffers_written,
            self.format.byte_rate(),
        ))
    }
}

/// Seek and write `data`, treating a short write as an error.
fn write_at<F: MediaFile>(file: &mut F, offset: u64, data: &[u8]) -> Result<(), StorageError> {
    file.seek(offset)?;
    let written = file.write(data)?;
    if written != data.len() {
        return Err(StorageError::ShortWrite {
            requested: data.len(),
            written,
        });
    }
    Ok(())
}
