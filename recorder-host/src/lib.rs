//! # recorder-host
//!
//! Host backend for recorder-core.
//!
//! Provides:
//! - `DirectoryMedium` — storage medium rooted at a directory, with `HostFile` handles
//! - `VolumeWatcher` — mount/unmount events from a directory appearing and vanishing
//! - `SystemClock` — local wall-clock time for file names
//! - `SimulatedDma` — a DMA engine thread producing a test tone into the ping-pong buffers
//! - `metadata` — JSON sidecar with checksum for finished recordings
//! - `config` — JSON configuration loading
//!
//! ## Usage
//! ```ignore
//! use recorder_core::ControlRequest;
//! use recorder_host::{build_recorder, load_config, VolumeWatcher};
//!
//! let config = load_config(Path::new("recorder.json"))?;
//! let mut recorder = build_recorder(&config, PathBuf::from("/mnt/mydrive"))?;
//! let mut watcher = VolumeWatcher::new(PathBuf::from("/mnt/mydrive"), &config.mount_name);
//! recorder.initialize()?;
//! loop {
//!     if let Some(event) = watcher.poll() {
//!         recorder.on_media_event(event);
//!     }
//!     recorder.tasks();
//! }
//! ```

pub mod config;
pub mod directory_medium;
pub mod error;
pub mod metadata;
pub mod simulated_dma;
pub mod system_clock;

use std::path::PathBuf;

use recorder_core::{Recorder, RecorderConfig, BUFFER_SAMPLES};

pub use config::{load_config, parse_config};
pub use directory_medium::{DirectoryMedium, HostFile, VolumeWatcher};
pub use error::HostError;
pub use metadata::{read_metadata, write_metadata, RecordingMetadata};
pub use simulated_dma::{SimulatedDma, ToneGenerator};
pub use system_clock::SystemClock;

/// Recorder wired to host hardware stand-ins.
pub type HostRecorder<const N: usize = BUFFER_SAMPLES> =
    Recorder<SimulatedDma<N>, DirectoryMedium, SystemClock, N>;

/// Build a recorder that writes under `root` at the configured sample rate.
pub fn build_recorder(config: &RecorderConfig, root: PathBuf) -> Result<HostRecorder, HostError> {
    let tone = ToneGenerator::new(440.0, config.sample_rate, 0.5);
    let engine = SimulatedDma::new(config.sample_rate, tone);
    Ok(Recorder::new(engine, DirectoryMedium::new(root), SystemClock, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recorder_core::processing::wav_format::{parse_header, HEADER_SIZE};
    use recorder_core::{ControlRequest, WriterState};
    use std::fs;
    use std::path::Path;
    use std::thread;
    use std::time::{Duration, Instant};

    const SAMPLES: usize = 16;
    const BUFFER_BYTES: u64 = (SAMPLES * 4) as u64;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("recorder_host_test_{}", name));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn run_until(recorder: &mut HostRecorder<SAMPLES>, mut done: impl FnMut(&HostRecorder<SAMPLES>) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !done(recorder) {
            assert!(Instant::now() < deadline, "timed out in state {:?}", recorder.writer().state());
            recorder.tasks();
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn build_recorder_rejects_invalid_config() {
        let config = RecorderConfig {
            file_prefix: String::new(),
            ..RecorderConfig::default()
        };
        assert!(matches!(
            build_recorder(&config, scratch_dir("invalid")),
            Err(HostError::Recorder(_))
        ));
    }

    #[test]
    fn records_to_directory_and_describes_file() {
        let root = scratch_dir("end_to_end");
        let config = RecorderConfig::default();
        let engine = SimulatedDma::with_fill_time(
            Duration::from_millis(10),
            ToneGenerator::new(440.0, config.sample_rate, 0.5),
        );
        let mut recorder: HostRecorder<SAMPLES> =
            Recorder::new(engine, DirectoryMedium::new(root.clone()), SystemClock, &config).unwrap();
        let mut watcher = VolumeWatcher::new(root.clone(), config.mount_name.clone());

        recorder.initialize().unwrap();
        assert!(watcher.poll().is_none());

        fs::create_dir_all(&root).unwrap();
        let event = watcher.poll().unwrap();
        recorder.on_media_event(event);

        run_until(&mut recorder, |r| r.writer().bytes_written() >= 5 * BUFFER_BYTES);
        recorder.request(ControlRequest::Stop).unwrap();
        run_until(&mut recorder, |r| {
            r.writer().state() == WriterState::Idle && !r.is_stopping()
        });
        assert!(!recorder.capture().is_active());

        let summary = recorder.writer().last_recording().unwrap().clone();
        assert_eq!(summary.bytes_written % BUFFER_BYTES, 0);
        assert!(summary.bytes_written >= 5 * BUFFER_BYTES);

        let path = root.join(&summary.file_name);
        let data = fs::read(&path).unwrap();
        assert_eq!(data.len() as u64, HEADER_SIZE as u64 + summary.bytes_written);
        let header = parse_header(&data).unwrap();
        assert_eq!(header.data_size as u64, summary.bytes_written);
        assert_eq!(header.riff_size as u64, 36 + summary.bytes_written);

        let metadata = RecordingMetadata::from_recording(&path, &summary).unwrap();
        write_metadata(&metadata, &path).unwrap();
        let read_back = read_metadata(&path).unwrap();
        assert_eq!(read_back.data_bytes, summary.bytes_written);
        assert_eq!(read_back.sample_rate, 12_000);
        assert!(Path::new(&path.with_extension("metadata.json")).exists());
    }
}
