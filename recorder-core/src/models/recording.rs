use serde::{Deserialize, Serialize};

/// Outcome of a recording that reached `CloseFile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub file_name: String,
    /// Payload bytes after the header.
    pub bytes_written: u64,
    pub buffers_written: u64,
    pub duration_secs: f64,
}

impl RecordingSummary {
    pub fn new(file_name: &str, bytes_written: u64, buffers_written: u64, byte_rate: u32) -> Self {
        let duration_secs = if byte_rate == 0 {
            0.0
        } else {
            bytes_written as f64 / byte_rate as f64
        };
        Self {
            file_name: file_name.to_string(),
            bytes_written,
            buffers_written,
            duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn duration_from_byte_rate() {
        let summary = RecordingSummary::new("audio_data_153045.wav", 144_000, 3, 48_000);
        assert_relative_eq!(summary.duration_secs, 3.0);
    }

    #[test]
    fn zero_byte_rate_has_no_duration() {
        let summary = RecordingSummary::new("a.wav", 10, 1, 0);
        assert_relative_eq!(summary.duration_secs, 0.0);
    }
}
