//! # recorder-core
//!
//! Real-time capture-to-storage pipeline for a battery-powered audio recorder.
//!
//! An audio peripheral is sampled by a DMA engine into two fixed buffers in
//! a closed ping-pong loop. A cooperative main loop drains each completed
//! buffer into a WAV file on removable storage, patching the header when the
//! recording closes. Hardware (DMA engine, storage medium, real-time clock)
//! sits behind traits; `recorder-host` implements them on a desktop OS.
//!
//! ## Architecture
//!
//! ```text
//! recorder-core (this crate)
//! ├── traits/       ← DmaEngine, StorageMedium, MediaFile, Clock, CaptureEventSink
//! ├── models/       ← RecorderConfig, error taxonomy, WriterState, BufferId
//! ├── processing/   ← ReadyMailbox, WAV header generation
//! ├── capture/      ← BufferPool, DmaChannel (interrupt side), CaptureManager
//! ├── storage/      ← StorageWriter state machine
//! └── session/      ← Recorder (main-loop scheduler)
//! ```

pub mod capture;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use capture::buffer_pool::{BufferPool, BufferView};
pub use capture::channel::{BufferLease, DmaChannel};
pub use capture::manager::CaptureManager;
pub use models::buffer::{BufferId, BufferState, Sample, BUFFER_SAMPLES};
pub use models::config::{OverrunPolicy, RecorderConfig};
pub use models::error::{InitError, RecorderError, StartError, StorageError, TransferError};
pub use models::recording::RecordingSummary;
pub use models::state::{CaptureState, WriterState};
pub use processing::mailbox::{ReadyMailbox, ReadySlot};
pub use processing::wav_format::WavFormat;
pub use session::main_loop::{ControlRequest, Recorder};
pub use storage::writer::{ReadyBuffer, StorageWriter};
pub use traits::clock::{Clock, TimeOfDay};
pub use traits::dma_engine::{DescriptorChain, DmaEngine, TransferDescriptor};
pub use traits::event_sink::{CaptureEvent, CaptureEventSink};
pub use traits::storage_medium::{MediaEvent, MediaFile, StorageMedium};
