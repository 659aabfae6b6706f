//! End-to-end tests of the reqwest transport against a local HTTP server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use futures::{stream, StreamExt};
use test_utils::{create_ramp_volume, NcFile, NcFileBuilder, NcValues, TEMPERATURE};
use volume_stream::{FetchConfig, FetchError, HttpTransport, NetCdfSession, ReqwestTransport};

/// Serves one file at `/data.nc`.
#[derive(Clone)]
struct FileServer {
    file: Bytes,
    advertise_ranges: bool,
    honor_ranges: bool,
    /// The first plain GET sends this many bytes and then stalls forever
    stall_at: Option<usize>,
    stalled: Arc<AtomicBool>,
    /// `Range` header of every request received, in order
    requests: Arc<Mutex<Vec<Option<String>>>>,
}

impl FileServer {
    fn new(file: &NcFile) -> Self {
        Self {
            file: Bytes::from(file.bytes.clone()),
            advertise_ranges: true,
            honor_ranges: true,
            stall_at: None,
            stalled: Arc::new(AtomicBool::new(false)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<Option<String>> {
        self.requests.lock().unwrap().clone()
    }

    /// Bind to an ephemeral port and return the file URL.
    async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/data.nc", get(serve_file))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/data.nc", addr)
    }
}

fn parse_range(value: &str) -> Option<(usize, usize)> {
    let (first, last) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((first.parse().ok()?, last.parse().ok()?))
}

async fn serve_file(State(server): State<FileServer>, headers: HeaderMap) -> Response {
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    server.requests.lock().unwrap().push(range.clone());

    if server.honor_ranges {
        if let Some((first, last)) = range.as_deref().and_then(parse_range) {
            let content_range = format!("bytes {}-{}/{}", first, last, server.file.len());
            return (
                StatusCode::PARTIAL_CONTENT,
                [(header::CONTENT_RANGE, content_range)],
                server.file.slice(first..=last),
            )
                .into_response();
        }
    }

    let mut response = match server.stall_at {
        Some(n) if !server.stalled.swap(true, Ordering::SeqCst) => {
            let prefix = server.file.slice(..n);
            let body = stream::iter([Ok::<_, std::io::Error>(prefix)]).chain(stream::pending());
            Body::from_stream(body).into_response()
        }
        _ => server.file.clone().into_response(),
    };
    if server.advertise_ranges {
        response
            .headers_mut()
            .insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    }
    response
}

/// A 16x16x16 float ramp; large enough that the data never rides along
/// with the header.
fn cube_file() -> NcFile {
    NcFileBuilder::new()
        .dimension("x", 16)
        .dimension("y", 16)
        .dimension("z", 16)
        .variable(
            TEMPERATURE,
            &["x", "y", "z"],
            NcValues::Float(create_ramp_volume(16, 16, 16, 0.0, 0.25)),
        )
        .build()
}

fn transport() -> Arc<dyn HttpTransport> {
    let config = FetchConfig {
        request_timeout_secs: 10,
        ..FetchConfig::default()
    };
    Arc::new(ReqwestTransport::new(&config).unwrap())
}

#[tokio::test]
async fn test_range_request_after_streamed_header() {
    let file = cube_file();
    let server = FileServer {
        stall_at: Some(file.header_len),
        ..FileServer::new(&file)
    };
    let url = server.spawn().await;

    let mut session = NetCdfSession::open(transport(), &url).await.unwrap().unwrap();
    assert_eq!(session.state().bytes_received(), file.header_len as u64);
    assert!(session.state().accept_ranges());

    let volume = session.fetch_volume(TEMPERATURE, false).await.unwrap();

    let layout = file.layout(TEMPERATURE);
    let expected_range = format!("bytes={}-{}", layout.begin, layout.begin + layout.vsize - 1);
    assert_eq!(server.requests(), vec![None, Some(expected_range)]);
    assert_eq!(
        volume.data().as_f32().unwrap(),
        create_ramp_volume(16, 16, 16, 0.0, 0.25).as_slice()
    );
}

#[tokio::test]
async fn test_full_refetch_when_ranges_not_advertised() {
    let file = cube_file();
    let server = FileServer {
        advertise_ranges: false,
        stall_at: Some(file.header_len),
        ..FileServer::new(&file)
    };
    let url = server.spawn().await;

    let mut session = NetCdfSession::open(transport(), &url).await.unwrap().unwrap();
    assert!(!session.state().accept_ranges());

    let volume = session.fetch_volume(TEMPERATURE, false).await.unwrap();

    assert_eq!(server.requests(), vec![None, None]);
    assert_eq!(volume.size(), 4096);
    assert_eq!(volume.max(), 1023.75);
}

#[tokio::test]
async fn test_ignored_range_header_is_an_error() {
    let file = cube_file();
    let server = FileServer {
        honor_ranges: false,
        stall_at: Some(file.header_len),
        ..FileServer::new(&file)
    };
    let url = server.spawn().await;

    let mut session = NetCdfSession::open(transport(), &url).await.unwrap().unwrap();
    let err = session.fetch_volume(TEMPERATURE, false).await.unwrap_err();

    assert!(matches!(err, FetchError::RangeNotHonored { status: 200, .. }));
}

#[tokio::test]
async fn test_missing_resource() {
    let file = cube_file();
    let server = FileServer::new(&file);
    let url = server.spawn().await.replace("data.nc", "missing.nc");

    let err = NetCdfSession::open(transport(), &url).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_open_reports_content_length() {
    let file = cube_file();
    let server = FileServer::new(&file);
    let url = server.spawn().await;

    let mut session = NetCdfSession::open(transport(), &url).await.unwrap().unwrap();
    assert_eq!(session.state().content_length(), Some(file.len() as u64));

    // whichever path the chunking leads to, the decoded data is the same
    let volume = session.fetch_volume(TEMPERATURE, false).await.unwrap();
    assert_eq!(volume.extents(), (16, 16, 16));
    assert_eq!(volume.min(), 0.0);
}
