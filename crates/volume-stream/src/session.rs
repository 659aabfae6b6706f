//! A NetCDF resource opened over HTTP: transport state plus parsed header.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use netcdf_parser::Header;
use tracing::{info, instrument};

use crate::decode::{decode_volume, Volume};
use crate::detect::{detect_header, header_from_buffer};
use crate::error::Result;
use crate::locate::{locate_variable, VariableDescriptor};
use crate::stream::StreamState;
use crate::strategy::{plan_acquisition, AcquisitionPath};
use crate::transport::{HttpTransport, StreamingResponse};

/// An open resource whose header has been decoded.
///
/// The header is immutable; everything about the connection lives in the
/// [`StreamState`] next to it. Fetches take `&mut self`, so at most one
/// acquisition runs against a session at a time.
pub struct NetCdfSession {
    transport: Arc<dyn HttpTransport>,
    state: StreamState,
    header: Header,
}

impl NetCdfSession {
    /// Start streaming `url` and read until the header decodes.
    ///
    /// Returns `Ok(None)` when the body ends before a header could be read.
    #[instrument(skip(transport))]
    pub async fn open(transport: Arc<dyn HttpTransport>, url: &str) -> Result<Option<Self>> {
        let response = transport.open_stream(url).await?;
        Self::from_response(transport, response).await
    }

    /// Run header detection over an already opened response.
    pub async fn from_response(
        transport: Arc<dyn HttpTransport>,
        response: StreamingResponse,
    ) -> Result<Option<Self>> {
        let mut state = StreamState::from_response(response);
        let Some(header) = detect_header(&mut state).await? else {
            return Ok(None);
        };

        info!(
            url = %state.url(),
            bytes_received = state.bytes_received(),
            content_length = ?state.content_length(),
            accept_ranges = state.accept_ranges(),
            variables = header.variables.len(),
            "Opened NetCDF session"
        );
        Ok(Some(Self {
            transport,
            state,
            header,
        }))
    }

    /// Session over a complete in-memory copy of the resource at `url`.
    pub fn from_bytes(
        transport: Arc<dyn HttpTransport>,
        url: impl Into<String>,
        bytes: Bytes,
    ) -> Result<Option<Self>> {
        let state = StreamState::from_bytes(url, bytes);
        Ok(header_from_buffer(&state)?.map(|header| Self {
            transport,
            state,
            header,
        }))
    }

    /// Session over a local file, read in full.
    pub async fn from_file(
        transport: Arc<dyn HttpTransport>,
        path: impl AsRef<Path>,
    ) -> Result<Option<Self>> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(transport, path.display().to_string(), Bytes::from(bytes))
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Resolve a variable against this session's header.
    pub fn locate(&self, name: &str) -> Result<VariableDescriptor> {
        locate_variable(&self.header, name)
    }

    /// The path [`fetch_volume`](Self::fetch_volume) would take right now.
    pub fn plan(&self, descriptor: &VariableDescriptor, force_range: bool) -> AcquisitionPath {
        plan_acquisition(
            descriptor,
            self.state.bytes_received(),
            self.state.accept_ranges(),
            force_range,
        )
    }

    /// Acquire and decode the variable `name`.
    ///
    /// Exactly one of three paths runs (see [`AcquisitionPath`]). The open
    /// stream reader, if any, is cancelled before a new request is issued or
    /// the resident buffer is decoded.
    #[instrument(skip(self), fields(url = %self.state.url()))]
    pub async fn fetch_volume(&mut self, name: &str, force_range: bool) -> Result<Volume> {
        let descriptor = self.locate(name)?;
        let path = self.plan(&descriptor, force_range);

        info!(
            variable = name,
            path = ?path,
            bytes_received = self.state.bytes_received(),
            "Fetching volume"
        );

        self.state.cancel();

        match path {
            AcquisitionPath::FullRefetch => {
                let body = self.transport.fetch_all(self.state.url()).await?;
                decode_volume(&body, &descriptor, descriptor.offset)
            }
            AcquisitionPath::Resident => {
                decode_volume(self.state.buffer(), &descriptor, descriptor.offset)
            }
            AcquisitionPath::RangeRequest { first, last } => {
                let body = self
                    .transport
                    .fetch_range(self.state.url(), first, last)
                    .await?;
                decode_volume(&body, &descriptor, 0)
            }
        }
    }
}

impl std::fmt::Debug for NetCdfSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetCdfSession")
            .field("state", &self.state)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}
