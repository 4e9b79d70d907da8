// Text bodies: content-type lookup, length, identity encoding

use super::test_harness::{PushTestHarness, MAX_BODY};
use h2push::compression::gunzip;
use h2push::transport::loopback::StreamEnd;
use h2push::{Outcome, PushOptions};

#[tokio::test]
async fn test_content_type_is_looked_up_from_path() {
    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push("/some.txt", PushOptions::new().body("lol"))
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(peer.path, "/some.txt");
    assert_eq!(
        peer.headers.get("content-type").unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(peer.headers.get("content-length").unwrap(), "3");
    assert!(peer.headers.get("content-encoding").is_none());

    assert_eq!(handle.acknowledged().await.unwrap(), Outcome::Completed);
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(peer.collect().await.body.as_ref(), b"lol");
}

#[tokio::test]
async fn test_identity_encoding_is_left_alone() {
    let mut harness = PushTestHarness::new();
    let text = "a".repeat(4096);
    let handle = harness
        .pusher
        .push(
            "/plain.txt",
            PushOptions::new()
                .header("content-encoding", "identity")
                .body(text.clone()),
        )
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(peer.headers.get("content-encoding").unwrap(), "identity");
    assert_eq!(peer.headers.get("content-length").unwrap(), "4096");
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(peer.collect().await.body.as_ref(), text.as_bytes());
}

#[tokio::test]
async fn test_empty_string_sends_nothing() {
    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push("/empty.txt", PushOptions::new().body(""))
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(peer.headers.get("content-length").unwrap(), "0");
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);

    let delivery = peer.collect().await;
    assert!(delivery.body.is_empty());
    assert_eq!(delivery.end, StreamEnd::Ended);
}

#[tokio::test]
async fn test_large_text_is_gzipped() {
    let mut harness = PushTestHarness::new();
    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(40);
    assert!(text.len() >= 1024);
    let handle = harness
        .pusher
        .push("/lorem.html", PushOptions::new().body(text.clone()))
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(
        peer.headers.get("content-type").unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(peer.headers.get("content-encoding").unwrap(), "gzip");
    assert!(peer.headers.get("content-length").is_none());
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);

    let delivery = peer.collect().await;
    assert!(delivery.body.len() < text.len());
    assert_eq!(gunzip(&delivery.body, MAX_BODY).unwrap(), text.as_bytes());
}

#[tokio::test]
async fn test_caller_priority_reaches_transport() {
    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push("/urgent.css", PushOptions::new().priority(0).body("body{}"))
        .unwrap();

    let peer = harness.accept().await;
    assert_eq!(peer.priority, 0);
    assert_eq!(handle.priority(), 0);
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
}

#[tokio::test]
async fn test_out_of_range_priority_is_rejected_before_io() {
    let harness = PushTestHarness::new();
    let err = harness
        .pusher
        .push("/a.txt", PushOptions::new().priority(8).body("x"))
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_explicit_text_content_type_is_gzipped() {
    let mut harness = PushTestHarness::new();
    let text = "hello world ".repeat(100);
    let handle = harness
        .pusher
        .push(
            "/",
            PushOptions::new()
                .header("content-type", "text/plain")
                .body(text.clone()),
        )
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(peer.headers.get("content-type").unwrap(), "text/plain");
    assert_eq!(peer.headers.get("content-encoding").unwrap(), "gzip");
    assert_eq!(handle.acknowledged().await.unwrap(), Outcome::Completed);
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(
        gunzip(&peer.collect().await.body, MAX_BODY).unwrap(),
        text.as_bytes()
    );
}
