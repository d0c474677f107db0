use serde::{Deserialize, Serialize};

use crate::processing::wav_format::WavFormat;

/// Capacity of the fixed file-name buffer, in bytes.
pub const FILE_NAME_CAPACITY: usize = 64;

/// What the scheduler does when the capture path reports an overrun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrunPolicy {
    /// Log and keep recording; the affected buffer may hold mixed data.
    #[default]
    Continue,
    /// Finalize the current file and stop capture.
    StopRecording,
}

/// Configuration for the capture-to-storage pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Sample rate written to the container header, in Hz (default: 12000).
    pub sample_rate: u32,

    /// Interleaved channel count (default: 2).
    pub channels: u16,

    /// Bits per channel sample (default: 16).
    pub bits_per_sample: u16,

    /// File name prefix (default: `audio_data`).
    pub file_prefix: String,

    /// File name extension without the dot (default: `wav`).
    pub file_extension: String,

    /// Volume name reported by the storage medium on mount/unmount.
    pub mount_name: String,

    /// Open a new recording whenever the medium is (re)mounted.
    pub auto_start_on_mount: bool,

    pub overrun_policy: OverrunPolicy,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![8, 16, 24, 32].contains(&self.bits_per_sample) {
            return Err(format!("unsupported bits per sample: {}", self.bits_per_sample));
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.file_prefix.is_empty() {
            return Err("file prefix must not be empty".into());
        }
        // <prefix>_HHMMSS.<ext>
        let name_len = self.file_prefix.len() + 1 + 6 + 1 + self.file_extension.len();
        if name_len > FILE_NAME_CAPACITY {
            return Err(format!(
                "file name of {} bytes exceeds the {} byte name buffer",
                name_len, FILE_NAME_CAPACITY
            ));
        }
        Ok(())
    }

    pub fn wav_format(&self) -> WavFormat {
        WavFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
            bits_per_sample: self.bits_per_sample,
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 12_000,
            channels: 2,
            bits_per_sample: 16,
            file_prefix: "audio_data".into(),
            file_extension: "wav".into(),
            mount_name: "/mnt/mydrive".into(),
            auto_start_on_mount: true,
            overrun_policy: OverrunPolicy::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(RecorderConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_format() {
        let config = RecorderConfig {
            bits_per_sample: 12,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RecorderConfig {
            channels: 6,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RecorderConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_name_overflowing_buffer() {
        let config = RecorderConfig {
            file_prefix: "x".repeat(60),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("name buffer"));
    }

    #[test]
    fn wav_format_follows_config() {
        let format = RecorderConfig::default().wav_format();
        assert_eq!(format.block_align(), 4);
        assert_eq!(format.byte_rate(), 48_000);
    }
}
