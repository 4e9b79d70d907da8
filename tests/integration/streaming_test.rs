// Stream bodies: chunked piping, gzip on the fly, source release

use super::test_harness::{drop_count, PushTestHarness, TrackedReader, MAX_BODY};
use h2push::compression::gunzip;
use h2push::transport::loopback::StreamEnd;
use h2push::{Outcome, PushOptions};
use std::io::Cursor;
use tokio::io::AsyncWriteExt;

#[tokio::test]
async fn test_empty_stream_ends_cleanly() {
    let mut harness = PushTestHarness::new();
    let (reader, drops) = TrackedReader::new(tokio::io::empty());
    let handle = harness
        .pusher
        .push("/", PushOptions::new().stream(reader))
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);

    let delivery = peer.collect().await;
    assert!(delivery.body.is_empty());
    assert_eq!(delivery.end, StreamEnd::Ended);
    assert_eq!(drop_count(&drops), 1);
}

#[tokio::test]
async fn test_text_stream_is_gzipped() {
    let mut harness = PushTestHarness::new();
    let text = "streamed line of text\n".repeat(500);
    let handle = harness
        .pusher
        .push(
            "/",
            PushOptions::new()
                .header("content-type", "text/plain")
                .stream(Cursor::new(text.clone().into_bytes())),
        )
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(peer.headers.get("content-encoding").unwrap(), "gzip");
    assert!(peer.headers.get("content-length").is_none());
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);

    let delivery = peer.collect().await;
    assert_eq!(gunzip(&delivery.body, MAX_BODY).unwrap(), text.as_bytes());
}

#[tokio::test]
async fn test_image_stream_is_sent_verbatim() {
    let mut harness = PushTestHarness::new();
    let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    let handle = harness
        .pusher
        .push("/photo.png", PushOptions::new().stream(Cursor::new(data.clone())))
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(peer.headers.get("content-type").unwrap(), "image/png");
    assert!(peer.headers.get("content-encoding").is_none());
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(peer.collect().await.body.to_vec(), data);
}

#[tokio::test]
async fn test_stream_with_declared_length_below_threshold_is_not_compressed() {
    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push(
            "/small.txt",
            PushOptions::new()
                .header("content-length", "5")
                .stream(Cursor::new(b"hello".to_vec())),
        )
        .unwrap();

    let mut peer = harness.accept().await;
    assert!(peer.headers.get("content-encoding").is_none());
    assert_eq!(peer.headers.get("content-length").unwrap(), "5");
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(peer.collect().await.body.as_ref(), b"hello");
}

#[tokio::test]
async fn test_chunks_arrive_as_the_source_produces_them() {
    let mut harness = PushTestHarness::new();
    let (reader, mut writer) = tokio::io::duplex(64);
    let handle = harness
        .pusher
        .push("/live.bin", PushOptions::new().stream(reader))
        .unwrap();

    let mut peer = harness.accept().await;
    writer.write_all(b"first").await.unwrap();
    assert_eq!(peer.next_chunk().await.unwrap().as_ref(), b"first");
    writer.write_all(b"second").await.unwrap();
    assert_eq!(peer.next_chunk().await.unwrap().as_ref(), b"second");

    drop(writer);
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(peer.collect().await.end, StreamEnd::Ended);
}
