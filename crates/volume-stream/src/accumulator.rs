//! Contiguous buffer grown one network chunk at a time.

use bytes::{Bytes, BytesMut};

/// Accumulates streamed chunks into one contiguous region.
///
/// The first chunk is adopted as the buffer without copying. Each later chunk
/// allocates a buffer sized to the new total and copies the old prefix and
/// the chunk into it, so readers always see one contiguous slice.
#[derive(Debug, Clone, Default)]
pub struct ByteAccumulator {
    buffer: Bytes,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already complete buffer.
    pub fn from_bytes(buffer: Bytes) -> Self {
        Self { buffer }
    }

    /// Append a chunk and return the new length.
    pub fn append(&mut self, chunk: Bytes) -> usize {
        if self.buffer.is_empty() {
            self.buffer = chunk;
        } else if !chunk.is_empty() {
            let mut grown = BytesMut::with_capacity(self.buffer.len() + chunk.len());
            grown.extend_from_slice(&self.buffer);
            grown.extend_from_slice(&chunk);
            self.buffer = grown.freeze();
        }
        self.buffer.len()
    }

    /// Number of valid bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.buffer
    }
}
