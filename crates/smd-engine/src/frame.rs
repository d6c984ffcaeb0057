//! Audio frame type.

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: i16) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.left == 0 && self.right == 0
    }

    /// Interleaved little-endian PCM bytes for a block of frames.
    pub fn to_le_bytes(frames: &[Frame]) -> Vec<u8> {
        let mut out = Vec::with_capacity(frames.len() * 4);
        for frame in frames {
            out.extend_from_slice(&frame.left.to_le_bytes());
            out.extend_from_slice(&frame.right.to_le_bytes());
        }
        out
    }
}
