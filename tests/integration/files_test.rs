// File bodies read lazily from disk

use super::test_harness::{PushTestHarness, MAX_BODY};
use h2push::compression::gunzip;
use h2push::transport::loopback::StreamEnd;
use h2push::{Outcome, PushError, PushOptions};

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="red"/></svg>"#;

#[tokio::test]
async fn test_svg_file_is_gzipped() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("logo.svg");
    std::fs::write(&file, SVG).unwrap();

    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push("/logo.svg", PushOptions::new().filename(&file))
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(peer.headers.get("content-type").unwrap(), "image/svg+xml");
    assert_eq!(peer.headers.get("content-encoding").unwrap(), "gzip");
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);

    let delivery = peer.collect().await;
    assert_eq!(delivery.end, StreamEnd::Ended);
    assert_eq!(gunzip(&delivery.body, MAX_BODY).unwrap(), SVG.as_bytes());
}

#[tokio::test]
async fn test_file_larger_than_one_chunk_arrives_whole() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("bundle.bin");
    let data: Vec<u8> = (0..100_000u32).map(|i| (i * 31 % 256) as u8).collect();
    std::fs::write(&file, &data).unwrap();

    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push("/bundle.bin", PushOptions::new().filename(&file))
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(peer.collect().await.body.to_vec(), data);
}

#[tokio::test]
async fn test_missing_file_fails_after_acknowledge() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("gone.css");

    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push("/gone.css", PushOptions::new().filename(&file))
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(handle.acknowledged().await.unwrap(), Outcome::Completed);
    assert!(matches!(handle.sent().await, Err(PushError::Io(_))));
    assert_eq!(peer.collect().await.end, StreamEnd::Destroyed);
}
