use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use recorder_core::processing::wav_format::{parse_header, HEADER_SIZE};
use recorder_core::RecordingSummary;

use crate::error::HostError;

/// Sidecar description of a finished recording.
///
/// Serialized as `{recording}.metadata.json` next to the WAV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_name: String,
    pub created_at: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub data_bytes: u64,
    pub buffers_written: u64,
    pub duration_secs: f64,
    /// SHA-256 of the complete file, header included.
    pub checksum: String,
}

impl RecordingMetadata {
    /// Describe the file at `recording_path`, taking the format from its
    /// header. Fails if the header disagrees with the summary, which means
    /// the file was not finalized.
    pub fn from_recording(recording_path: &Path, summary: &RecordingSummary) -> Result<Self, HostError> {
        let data = fs::read(recording_path)
            .map_err(|e| HostError::Metadata(format!("failed to read {}: {}", recording_path.display(), e)))?;
        let header = parse_header(&data)
            .ok_or_else(|| HostError::Metadata(format!("{} has no valid WAV header", recording_path.display())))?;

        let payload = (data.len() - HEADER_SIZE) as u64;
        if header.data_size as u64 != summary.bytes_written || payload != summary.bytes_written {
            return Err(HostError::Metadata(format!(
                "header reports {} data bytes, file holds {}, writer wrote {}",
                header.data_size, payload, summary.bytes_written
            )));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name: summary.file_name.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            sample_rate: header.format.sample_rate,
            channels: header.format.channels,
            bits_per_sample: header.format.bits_per_sample,
            data_bytes: summary.bytes_written,
            buffers_written: summary.buffers_written,
            duration_secs: summary.duration_secs,
            checksum: hex_encode(&Sha256::digest(&data)),
        })
    }
}

/// Write recording metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<(), HostError> {
    let metadata_path = recording_path.with_extension("metadata.json");
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| HostError::Metadata(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&metadata_path, json).map_err(|e| HostError::Metadata(format!("failed to write metadata: {}", e)))?;
    log::debug!("wrote {}", metadata_path.display());
    Ok(())
}

/// Read recording metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, HostError> {
    let metadata_path = recording_path.with_extension("metadata.json");
    let json = fs::read_to_string(&metadata_path)
        .map_err(|e| HostError::Metadata(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| HostError::Metadata(format!("failed to parse metadata: {}", e)))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
