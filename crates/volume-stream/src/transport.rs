//! HTTP transport seam.
//!
//! The pipeline issues exactly three kinds of request: a streaming GET to
//! start header detection, an unconditional GET of the whole resource, and a
//! GET restricted to an inclusive byte range. [`HttpTransport`] captures those
//! three so the strategy can be exercised without a server.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::{header, Client, Response, StatusCode};
use tracing::{debug, instrument};

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};

/// Body of a streaming response, one network chunk per item.
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// Response to the initial streaming GET.
pub struct StreamingResponse {
    /// Final URL after redirects; later requests go here
    pub url: String,
    /// Advertised `Content-Length`, informational only
    pub content_length: Option<u64>,
    /// Server sent `Accept-Ranges: bytes`
    pub accept_ranges: bool,
    pub body: ChunkStream,
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("url", &self.url)
            .field("content_length", &self.content_length)
            .field("accept_ranges", &self.accept_ranges)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Plain GET, returning headers and the body as a chunk stream.
    async fn open_stream(&self, url: &str) -> Result<StreamingResponse>;

    /// Unconditional GET of the full resource, awaited to completion.
    async fn fetch_all(&self, url: &str) -> Result<Bytes>;

    /// GET with `Range: bytes=<first>-<last>` (both inclusive).
    async fn fetch_range(&self, url: &str, first: u64, last: u64) -> Result<Bytes>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        config.validate().map_err(FetchError::Config)?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .tcp_nodelay(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self))]
    async fn open_stream(&self, url: &str) -> Result<StreamingResponse> {
        let response = check_status(self.client.get(url).send().await?)?;

        let content_length = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let accept_ranges = response
            .headers()
            .get(header::ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("bytes"));
        let final_url = response.url().to_string();

        debug!(
            url = %final_url,
            content_length = ?content_length,
            accept_ranges,
            "Opened stream"
        );

        let body = response.bytes_stream().map_err(FetchError::from).boxed();

        Ok(StreamingResponse {
            url: final_url,
            content_length,
            accept_ranges,
            body,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_all(&self, url: &str) -> Result<Bytes> {
        let response = check_status(self.client.get(url).send().await?)?;
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Fetched full resource");
        Ok(body)
    }

    #[instrument(skip(self))]
    async fn fetch_range(&self, url: &str, first: u64, last: u64) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .header(header::RANGE, format!("bytes={}-{}", first, last))
            .send()
            .await?;

        match response.status() {
            StatusCode::PARTIAL_CONTENT => {}
            status if status.is_success() => {
                return Err(FetchError::RangeNotHonored {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            status => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Fetched byte range");
        Ok(body)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}
