//! Common test utilities for volume-stream tests
//!
//! Provides helpers for:
//! - Scripted chunk streams with read counting and release detection
//! - A mock transport that records every request it receives

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use volume_stream::{FetchError, HttpTransport, Result, StreamingResponse};

pub const URL: &str = "http://data.example.com/ocean.nc";

/// Split `bytes` at the given chunk sizes; whatever remains is one last chunk.
pub fn chunked(bytes: &[u8], sizes: &[usize]) -> Vec<Bytes> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    for &size in sizes {
        let end = (pos + size).min(bytes.len());
        chunks.push(Bytes::copy_from_slice(&bytes[pos..end]));
        pos = end;
    }
    if pos < bytes.len() {
        chunks.push(Bytes::copy_from_slice(&bytes[pos..]));
    }
    chunks
}

/// Sets its flag when dropped, i.e. when the owning stream is released.
struct ReleaseFlag(Arc<AtomicBool>);

impl Drop for ReleaseFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Observes a scripted stream from the outside.
#[derive(Clone, Default)]
pub struct StreamWatch {
    reads: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl StreamWatch {
    /// Chunks handed out so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// The stream has been dropped.
    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Streaming response yielding `chunks` in order.
pub fn scripted_response(
    chunks: Vec<Result<Bytes>>,
    accept_ranges: bool,
    watch: &StreamWatch,
) -> StreamingResponse {
    let reads = watch.reads.clone();
    let guard = ReleaseFlag(watch.released.clone());
    let content_length = chunks
        .iter()
        .map(|c| c.as_ref().map_or(0, |b| b.len() as u64))
        .sum();

    let body = stream::iter(chunks)
        .inspect(move |_| {
            reads.fetch_add(1, Ordering::SeqCst);
        })
        .map(move |chunk| {
            let _guard = &guard;
            chunk
        })
        .boxed();

    StreamingResponse {
        url: URL.to_string(),
        content_length: Some(content_length),
        accept_ranges,
        body,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Stream,
    Full,
    Range(u64, u64),
}

/// Serves one file from memory and records each request.
pub struct MockTransport {
    file: Bytes,
    accept_ranges: bool,
    chunk_sizes: Vec<usize>,
    fail_requests: bool,
    calls: Mutex<Vec<Call>>,
    requests_with_open_reader: AtomicUsize,
    pub watch: StreamWatch,
}

impl MockTransport {
    pub fn new(file: &[u8], accept_ranges: bool, chunk_sizes: &[usize]) -> Self {
        Self {
            file: Bytes::copy_from_slice(file),
            accept_ranges,
            chunk_sizes: chunk_sizes.to_vec(),
            fail_requests: false,
            calls: Mutex::new(Vec::new()),
            requests_with_open_reader: AtomicUsize::new(0),
            watch: StreamWatch::default(),
        }
    }

    /// Make full and range fetches answer HTTP 503.
    pub fn failing(mut self) -> Self {
        self.fail_requests = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Full or range requests issued while the stream reader was still alive.
    pub fn requests_with_open_reader(&self) -> usize {
        self.requests_with_open_reader.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) -> Result<()> {
        let opened = self.calls.lock().unwrap().contains(&Call::Stream);
        if call != Call::Stream && opened && !self.watch.released() {
            self.requests_with_open_reader.fetch_add(1, Ordering::SeqCst);
        }
        self.calls.lock().unwrap().push(call);
        if self.fail_requests {
            return Err(FetchError::Status {
                url: URL.to_string(),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn open_stream(&self, _url: &str) -> Result<StreamingResponse> {
        self.calls.lock().unwrap().push(Call::Stream);
        let chunks = chunked(&self.file, &self.chunk_sizes)
            .into_iter()
            .map(Ok)
            .collect();
        Ok(scripted_response(chunks, self.accept_ranges, &self.watch))
    }

    async fn fetch_all(&self, _url: &str) -> Result<Bytes> {
        self.record(Call::Full)?;
        Ok(self.file.clone())
    }

    async fn fetch_range(&self, _url: &str, first: u64, last: u64) -> Result<Bytes> {
        self.record(Call::Range(first, last))?;
        let end = (last as usize + 1).min(self.file.len());
        Ok(self.file.slice(first as usize..end))
    }
}
