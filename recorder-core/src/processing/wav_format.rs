//! Linear-PCM WAV container header.
//!
//! The header is written with zeroed size fields when a recording opens and
//! rewritten with the final sizes when it closes.

/// Size of the standard WAV RIFF header in bytes.
pub const HEADER_SIZE: usize = 44;

/// Header bytes counted by the RIFF chunk size (everything after offset 8
/// except the payload).
pub const RIFF_OVERHEAD: u32 = 36;

/// PCM stream parameters carried by the `fmt ` sub-chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl WavFormat {
    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

/// Build a 44-byte header for `data_size` payload bytes.
///
/// Layout (little-endian):
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * block_align
/// [32-33]  block_align = channels * bits_per_sample / 8
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_header(format: &WavFormat, data_size: u32) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];

    header[0..4].copy_from_slice(b"RIFF");
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());

    header[36..40].copy_from_slice(b"data");

    patch_data_size(&mut header, data_size);
    header
}

/// Patch the RIFF chunk size (offset 4) and the data size (offset 40).
pub fn patch_data_size(header: &mut [u8; HEADER_SIZE], data_size: u32) {
    let chunk_size = data_size.wrapping_add(RIFF_OVERHEAD);
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[40..44].copy_from_slice(&data_size.to_le_bytes());
}

/// Fields decoded from an on-disk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedHeader {
    pub format: WavFormat,
    pub riff_size: u32,
    pub data_size: u32,
}

/// Decode a header, rejecting anything that is not plain PCM.
pub fn parse_header(bytes: &[u8]) -> Option<ParsedHeader> {
    if bytes.len() < HEADER_SIZE {
        return None;
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" || &bytes[12..16] != b"fmt " {
        return None;
    }
    if &bytes[36..40] != b"data" || read_u16(bytes, 20) != 1 {
        return None;
    }

    Some(ParsedHeader {
        format: WavFormat {
            sample_rate: read_u32(bytes, 24),
            channels: read_u16(bytes, 22),
            bits_per_sample: read_u16(bytes, 34),
        },
        riff_size: read_u32(bytes, 4),
        data_size: read_u32(bytes, 40),
    })
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDER: WavFormat = WavFormat {
        sample_rate: 12_000,
        channels: 2,
        bits_per_sample: 16,
    };

    #[test]
    fn header_magic() {
        let header = generate_header(&RECORDER, 0);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
    }

    #[test]
    fn provisional_header_has_zero_payload() {
        let header = generate_header(&RECORDER, 0);
        assert_eq!(read_u32(&header, 40), 0);
        assert_eq!(read_u32(&header, 4), 36);
    }

    #[test]
    fn recorder_format_fields() {
        let header = generate_header(&RECORDER, 0);
        assert_eq!(read_u32(&header, 16), 16);
        assert_eq!(read_u16(&header, 20), 1);
        assert_eq!(read_u16(&header, 22), 2);
        assert_eq!(read_u32(&header, 24), 12_000);
        assert_eq!(read_u32(&header, 28), 48_000);
        assert_eq!(read_u16(&header, 32), 4);
        assert_eq!(read_u16(&header, 34), 16);
    }

    #[test]
    fn patch_sizes() {
        let mut header = generate_header(&RECORDER, 0);
        patch_data_size(&mut header, 144_000);
        assert_eq!(read_u32(&header, 40), 144_000);
        assert_eq!(read_u32(&header, 4), 144_036);
    }

    #[test]
    fn parse_finalized_header() {
        let header = generate_header(&RECORDER, 96_000);
        let parsed = parse_header(&header).unwrap();
        assert_eq!(parsed.format, RECORDER);
        assert_eq!(parsed.data_size, 96_000);
        assert_eq!(parsed.riff_size, 96_036);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_header(&[0u8; 10]).is_none());
        let mut header = generate_header(&RECORDER, 0);
        header[20] = 3; // IEEE float
        assert!(parse_header(&header).is_none());
    }
}
