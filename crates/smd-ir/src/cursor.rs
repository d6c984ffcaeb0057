//! Positional reader over one track's event bytes.

use alloc::sync::Arc;

/// Error raised when a read or seek runs past the end of the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("read of {requested} byte(s) at offset {offset:#x} runs past end of buffer (len {len:#x})")]
    OutOfBounds {
        offset: usize,
        requested: usize,
        len: usize,
    },
}

/// Cursor over an immutable, shared byte buffer.
///
/// Cloning a cursor is cheap: the buffer is reference counted and only the
/// position is copied.
#[derive(Clone, Debug)]
pub struct ByteCursor {
    data: Arc<[u8]>,
    pos: usize,
}

impl ByteCursor {
    pub fn new(data: Arc<[u8]>) -> Self {
        Self { data, pos: 0 }
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current absolute byte position.
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Move to an absolute byte position. Seeking to `len()` is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<(), CursorError> {
        if offset > self.data.len() {
            return Err(CursorError::OutOfBounds {
                offset,
                requested: 0,
                len: self.data.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Move back to the first byte.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&[u8], CursorError> {
        if n > self.remaining() {
            return Err(CursorError::OutOfBounds {
                offset: self.pos,
                requested: n,
                len: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, CursorError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, CursorError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a 24-bit little-endian value into the low bits of a `u32`.
    pub fn read_u24_le(&mut self) -> Result<u32, CursorError> {
        let b = self.take(3)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], 0]))
    }

    /// Read `n` raw bytes. `n == 0` yields an empty slice.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8], CursorError> {
        self.take(n)
    }
}

impl From<&[u8]> for ByteCursor {
    fn from(bytes: &[u8]) -> Self {
        Self::new(Arc::from(bytes))
    }
}
