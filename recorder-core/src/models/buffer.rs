use std::fmt;

/// One I2S receive word. With 16-bit stereo this is one interleaved frame.
pub type Sample = u32;

/// Samples per ping-pong buffer (one second at 12 kHz).
pub const BUFFER_SAMPLES: usize = 12_000;

/// Payload bytes carried by one full buffer.
pub const fn buffer_bytes(samples: usize) -> usize {
    samples * std::mem::size_of::<Sample>()
}

/// Identifier of one of the two ping-pong buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferId {
    A,
    B,
}

impl BufferId {
    /// The buffer the engine fills after this one.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            _ => None,
        }
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// Ownership phase of a buffer.
///
/// ```text
/// Filling (engine) → Ready (published) → Consumed (leased to writer) → Filling
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BufferState {
    Filling = 0,
    Ready = 1,
    Consumed = 2,
}

impl BufferState {
    pub(crate) fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Ready,
            2 => Self::Consumed,
            _ => Self::Filling,
        }
    }
}
