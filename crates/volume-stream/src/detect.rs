//! Find the header inside a growing byte stream.

use netcdf_parser::{parse_header, Header, HeaderParse};
use tracing::{debug, instrument, trace, warn};

use crate::error::Result;
use crate::stream::{ChunkRead, StreamState};

/// Read chunks into `state` until a header decodes or the stream ends.
///
/// The header length is unknown until it has been decoded, so every chunk is
/// followed by a decode attempt over the whole buffer. Returns as soon as one
/// succeeds, leaving the reader open for the caller to cancel or reuse.
///
/// - `Ok(Some(header))`: decoded; `state` holds everything read so far
/// - `Ok(None)`: the stream ended with the header still incomplete
/// - `Err(_)`: the bytes are not a classic header, or a chunk read failed
#[instrument(skip(state), fields(url = %state.url()))]
pub async fn detect_header(state: &mut StreamState) -> Result<Option<Header>> {
    let mut reads = 0usize;

    loop {
        let bytes_received = match state.read_chunk().await? {
            ChunkRead::Appended(n) => n,
            ChunkRead::Exhausted => {
                warn!(
                    bytes_received = state.bytes_received(),
                    reads,
                    "EOF, no valid NetCDF header"
                );
                return Ok(None);
            }
        };
        reads += 1;

        match parse_header(state.buffer()) {
            Ok(HeaderParse::Complete(header)) => {
                debug!(
                    bytes_received,
                    reads,
                    header_len = header.header_len,
                    variables = header.variables.len(),
                    "Detected NetCDF header"
                );
                return Ok(Some(header));
            }
            Ok(HeaderParse::Incomplete) => {
                trace!(bytes_received, "Header incomplete, reading more");
            }
            Err(e) => {
                state.cancel();
                return Err(e.into());
            }
        }
    }
}

/// Decode the header of a buffer that will not grow any further.
pub fn header_from_buffer(state: &StreamState) -> Result<Option<Header>> {
    match parse_header(state.buffer())? {
        HeaderParse::Complete(header) => Ok(Some(header)),
        HeaderParse::Incomplete => {
            warn!(
                url = %state.url(),
                bytes_received = state.bytes_received(),
                "EOF, no valid NetCDF header"
            );
            Ok(None)
        }
    }
}
