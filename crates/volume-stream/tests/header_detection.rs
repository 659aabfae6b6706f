//! Header detection over chunked streams.

mod common;

use bytes::Bytes;
use common::{chunked, scripted_response, StreamWatch};
use test_utils::{mixed_volume_file, temperature_at_offset_100, typed_volumes_file};
use volume_stream::{detect_header, FetchError, StreamState};

fn state_for(chunks: Vec<Bytes>, watch: &StreamWatch) -> StreamState {
    StreamState::from_response(scripted_response(
        chunks.into_iter().map(Ok).collect(),
        true,
        watch,
    ))
}

#[tokio::test]
async fn test_header_split_across_two_chunks() {
    // header is 88 bytes: 40 is not enough, 40 + 60 is
    let file = temperature_at_offset_100();
    let watch = StreamWatch::default();
    let mut state = state_for(chunked(&file.bytes, &[40, 60]), &watch);

    let header = detect_header(&mut state).await.unwrap().unwrap();

    assert_eq!(header.header_len, 88);
    assert_eq!(watch.reads(), 2, "must stop reading once the header decodes");
    assert_eq!(state.bytes_received(), 100);
    assert!(state.is_streaming());
    assert!(!watch.released());
}

#[tokio::test]
async fn test_detection_succeeds_exactly_at_header_length() {
    for file in [mixed_volume_file(), typed_volumes_file()] {
        let watch = StreamWatch::default();
        let sizes = vec![1; file.len()];
        let mut state = state_for(chunked(&file.bytes, &sizes), &watch);

        let header = detect_header(&mut state).await.unwrap().unwrap();

        assert_eq!(header.header_len, file.header_len);
        assert_eq!(state.bytes_received(), file.header_len as u64);
        assert_eq!(watch.reads(), file.header_len);
    }
}

#[tokio::test]
async fn test_single_chunk_holding_whole_file() {
    let file = mixed_volume_file();
    let watch = StreamWatch::default();
    let mut state = state_for(vec![Bytes::from(file.bytes.clone())], &watch);

    let header = detect_header(&mut state).await.unwrap().unwrap();

    assert_eq!(watch.reads(), 1);
    assert_eq!(state.bytes_received(), file.len() as u64);
    assert_eq!(
        header.variable_names().collect::<Vec<_>>(),
        vec!["temperature", "mask", "series"]
    );
}

#[tokio::test]
async fn test_eof_before_header_completes() {
    let file = temperature_at_offset_100();
    let watch = StreamWatch::default();
    let truncated = Bytes::copy_from_slice(&file.bytes[..60]);
    let mut state = state_for(chunked(&truncated, &[30]), &watch);

    let header = detect_header(&mut state).await.unwrap();

    assert!(header.is_none());
    assert_eq!(state.bytes_received(), 60);
    assert!(watch.released());
}

#[tokio::test]
async fn test_empty_body() {
    let watch = StreamWatch::default();
    let mut state = state_for(Vec::new(), &watch);

    assert!(detect_header(&mut state).await.unwrap().is_none());
    assert_eq!(state.bytes_received(), 0);
}

#[tokio::test]
async fn test_not_netcdf_cancels_reader() {
    let watch = StreamWatch::default();
    let body = Bytes::from_static(b"<html><body>Not Found</body></html>");
    let mut state = state_for(chunked(&body, &[8]), &watch);

    let err = detect_header(&mut state).await.unwrap_err();

    assert!(matches!(err, FetchError::Header(_)));
    assert_eq!(watch.reads(), 1);
    assert!(watch.released());
    assert!(!state.is_streaming());
}

#[tokio::test]
async fn test_chunk_error_is_propagated() {
    let file = temperature_at_offset_100();
    let watch = StreamWatch::default();
    let chunks = vec![
        Ok(Bytes::copy_from_slice(&file.bytes[..40])),
        Err(FetchError::Status {
            url: common::URL.to_string(),
            status: 502,
        }),
    ];
    let mut state = StreamState::from_response(scripted_response(chunks, false, &watch));

    let err = detect_header(&mut state).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 502, .. }));
    assert!(watch.released());
}
