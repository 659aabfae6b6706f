//! Streaming session bookkeeping.

use bytes::Bytes;
use futures::StreamExt;
use tracing::debug;

use crate::accumulator::ByteAccumulator;
use crate::error::Result;
use crate::transport::{ChunkStream, StreamingResponse};

/// Outcome of pulling one chunk from the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkRead {
    /// A chunk was appended; carries the new total
    Appended(usize),
    /// The reader is gone (exhausted or cancelled)
    Exhausted,
}

/// Transport state of one resource: where it came from, what the server
/// advertised, the bytes received so far and the reader still producing them.
///
/// The reader is owned here exclusively. It is released exactly once, either
/// by [`cancel`](Self::cancel) or when it runs dry or fails.
pub struct StreamState {
    url: String,
    content_length: Option<u64>,
    accept_ranges: bool,
    buffer: ByteAccumulator,
    reader: Option<ChunkStream>,
}

impl StreamState {
    /// Start tracking a freshly opened streaming response.
    pub fn from_response(response: StreamingResponse) -> Self {
        Self {
            url: response.url,
            content_length: response.content_length,
            accept_ranges: response.accept_ranges,
            buffer: ByteAccumulator::new(),
            reader: Some(response.body),
        }
    }

    /// State for a resource already held in full; there is no reader.
    pub fn from_bytes(url: impl Into<String>, bytes: Bytes) -> Self {
        let len = bytes.len() as u64;
        Self {
            url: url.into(),
            content_length: Some(len),
            accept_ranges: false,
            buffer: ByteAccumulator::from_bytes(bytes),
            reader: None,
        }
    }

    /// Pull the next chunk from the reader into the buffer.
    ///
    /// The reader is released when it ends or yields an error; the error is
    /// returned to the caller.
    pub async fn read_chunk(&mut self) -> Result<ChunkRead> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(ChunkRead::Exhausted);
        };

        match reader.next().await {
            Some(Ok(chunk)) => Ok(ChunkRead::Appended(self.buffer.append(chunk))),
            Some(Err(e)) => {
                self.reader = None;
                Err(e)
            }
            None => {
                debug!(url = %self.url, bytes_received = self.buffer.len(), "Stream exhausted");
                self.reader = None;
                Ok(ChunkRead::Exhausted)
            }
        }
    }

    /// Drop the reader if one is still open. Returns whether one was.
    pub fn cancel(&mut self) -> bool {
        match self.reader.take() {
            Some(reader) => {
                drop(reader);
                debug!(url = %self.url, bytes_received = self.buffer.len(), "Cancelled stream reader");
                true
            }
            None => false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn accept_ranges(&self) -> bool {
        self.accept_ranges
    }

    /// Bytes received so far; equal to the buffer length.
    pub fn bytes_received(&self) -> u64 {
        self.buffer.len() as u64
    }

    pub fn buffer(&self) -> &Bytes {
        self.buffer.as_bytes()
    }

    pub fn is_streaming(&self) -> bool {
        self.reader.is_some()
    }
}

impl std::fmt::Debug for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamState")
            .field("url", &self.url)
            .field("content_length", &self.content_length)
            .field("accept_ranges", &self.accept_ranges)
            .field("bytes_received", &self.buffer.len())
            .field("streaming", &self.reader.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use futures::stream;

    fn response(chunks: Vec<Result<Bytes>>) -> StreamingResponse {
        StreamingResponse {
            url: "http://example.com/data.nc".to_string(),
            content_length: Some(10),
            accept_ranges: true,
            body: stream::iter(chunks).boxed(),
        }
    }

    #[test]
    fn test_read_until_exhausted() {
        let mut state = StreamState::from_response(response(vec![
            Ok(Bytes::from_static(b"abcd")),
            Ok(Bytes::from_static(b"ef")),
        ]));

        tokio_test::block_on(async {
            assert_eq!(state.read_chunk().await.unwrap(), ChunkRead::Appended(4));
            assert_eq!(state.read_chunk().await.unwrap(), ChunkRead::Appended(6));
            assert!(state.is_streaming());
            assert_eq!(state.read_chunk().await.unwrap(), ChunkRead::Exhausted);
        });
        assert!(!state.is_streaming());
        assert_eq!(state.bytes_received(), 6);
        assert_eq!(&state.buffer()[..], b"abcdef");
    }

    #[test]
    fn test_cancel_releases_reader_once() {
        let mut state = StreamState::from_response(response(vec![Ok(Bytes::from_static(b"x"))]));
        assert!(state.cancel());
        assert!(!state.cancel());
        let read = tokio_test::block_on(state.read_chunk()).unwrap();
        assert_eq!(read, ChunkRead::Exhausted);
        assert_eq!(state.bytes_received(), 0);
    }

    #[test]
    fn test_read_error_releases_reader() {
        let mut state = StreamState::from_response(response(vec![
            Ok(Bytes::from_static(b"ab")),
            Err(FetchError::Config("boom".to_string())),
        ]));
        tokio_test::block_on(async {
            state.read_chunk().await.unwrap();
            assert!(state.read_chunk().await.is_err());
        });
        assert!(!state.is_streaming());
        assert_eq!(state.bytes_received(), 2);
    }

    #[test]
    fn test_from_bytes_has_no_reader() {
        let state = StreamState::from_bytes("file.nc", Bytes::from_static(b"CDF\x01"));
        assert!(!state.is_streaming());
        assert!(!state.accept_ranges());
        assert_eq!(state.bytes_received(), 4);
        assert_eq!(state.content_length(), Some(4));
    }
}
