// Compression decisions as seen on the wire

use super::test_harness::{PushTestHarness, MAX_BODY};
use h2push::compression::{gunzip, CompressOptions, Compression};
use h2push::{Outcome, PushOptions};

#[tokio::test]
async fn test_custom_threshold_enables_small_bodies() {
    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push(
            "/hello.txt",
            PushOptions::new().threshold(10).body("hello world!"),
        )
        .unwrap();
    assert!(handle.compression().is_enabled());

    let mut peer = harness.accept().await;
    assert_eq!(peer.headers.get("content-encoding").unwrap(), "gzip");
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(
        gunzip(&peer.collect().await.body, MAX_BODY).unwrap(),
        b"hello world!"
    );
}

#[tokio::test]
async fn test_compress_false_wins_over_everything() {
    let mut harness = PushTestHarness::new();
    let text = "x".repeat(10_000);
    let handle = harness
        .pusher
        .push(
            "/big.txt",
            PushOptions::new().compress(false).body(text.clone()),
        )
        .unwrap();
    assert_eq!(handle.compression(), Compression::Disabled);

    let mut peer = harness.accept().await;
    assert!(peer.headers.get("content-encoding").is_none());
    assert_eq!(peer.headers.get("content-length").unwrap(), "10000");
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(peer.collect().await.body.as_ref(), text.as_bytes());
}

#[tokio::test]
async fn test_png_is_never_compressed_by_default() {
    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push(
            "/logo.png",
            PushOptions::new()
                .compress_with(CompressOptions::with_level(9).unwrap())
                .body(vec![0u8; 8192]),
        )
        .unwrap();
    assert_eq!(handle.compression(), Compression::Disabled);

    let peer = harness.accept().await;
    assert!(peer.headers.get("content-encoding").is_none());
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
}

#[tokio::test]
async fn test_custom_filter_overrides_classifier() {
    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push(
            "/logo.png",
            PushOptions::new()
                .filter(|content_type| content_type == Some("image/png"))
                .body(vec![0u8; 8192]),
        )
        .unwrap();
    assert!(handle.compression().is_enabled());

    let mut peer = harness.accept().await;
    assert_eq!(peer.headers.get("content-encoding").unwrap(), "gzip");
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(
        gunzip(&peer.collect().await.body, MAX_BODY).unwrap(),
        vec![0u8; 8192]
    );
}

#[tokio::test]
async fn test_explicit_level_produces_valid_gzip() {
    let mut harness = PushTestHarness::new();
    let text = "level one is fast ".repeat(200);
    let handle = harness
        .pusher
        .push(
            "/fast.txt",
            PushOptions::new()
                .compress_with(CompressOptions::with_level(1).unwrap())
                .body(text.clone()),
        )
        .unwrap();
    assert_eq!(
        handle.compression(),
        Compression::Enabled(CompressOptions { level: Some(1) })
    );

    let mut peer = harness.accept().await;
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(
        gunzip(&peer.collect().await.body, MAX_BODY).unwrap(),
        text.as_bytes()
    );
}

#[tokio::test]
async fn test_invalid_level_is_a_validation_error() {
    let harness = PushTestHarness::new();
    let err = harness
        .pusher
        .push(
            "/a.txt",
            PushOptions::new()
                .compress_with(CompressOptions { level: Some(12) })
                .body("x"),
        )
        .unwrap_err();
    assert!(err.is_validation());
}
