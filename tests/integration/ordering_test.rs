// Completion ordering guarantees

use super::test_harness::PushTestHarness;
use h2push::{Outcome, PushOptions, PushState};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

#[tokio::test]
async fn test_sent_waits_for_acknowledge() {
    let mut harness = PushTestHarness::new();
    let handle = harness
        .pusher
        .push("/wait.txt", PushOptions::new().body("patience"))
        .unwrap();

    let peer = harness.next_peer().await;
    assert!(timeout(Duration::from_millis(50), handle.sent()).await.is_err());
    assert!(timeout(Duration::from_millis(10), handle.acknowledged())
        .await
        .is_err());
    assert_eq!(handle.state(), PushState::Acknowledging);

    peer.acknowledge();
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(handle.acknowledged().await.unwrap(), Outcome::Completed);
}

#[tokio::test]
async fn test_acknowledged_resolves_while_body_is_pending() {
    let mut harness = PushTestHarness::new();
    let (reader, mut writer) = tokio::io::duplex(64);
    let handle = harness
        .pusher
        .push("/slow.bin", PushOptions::new().stream(reader))
        .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(handle.acknowledged().await.unwrap(), Outcome::Completed);
    assert!(timeout(Duration::from_millis(50), handle.sent()).await.is_err());
    assert_eq!(handle.state(), PushState::Sending);

    writer.write_all(b"finally").await.unwrap();
    drop(writer);
    assert_eq!(handle.sent().await.unwrap(), Outcome::Completed);
    assert_eq!(peer.collect().await.body.as_ref(), b"finally");
}

#[tokio::test]
async fn test_concurrent_pushes_are_independent() {
    let mut harness = PushTestHarness::new();
    let first = harness
        .pusher
        .push("/one.txt", PushOptions::new().body("one"))
        .unwrap();
    let second = harness
        .pusher
        .push("/two.txt", PushOptions::new().body("two"))
        .unwrap();

    let mut peers = vec![harness.next_peer().await, harness.next_peer().await];
    peers.sort_by(|a, b| a.path.cmp(&b.path));
    // Reject /two.txt, accept /one.txt
    peers[1].close();
    peers[0].acknowledge();

    assert_eq!(first.sent().await.unwrap(), Outcome::Completed);
    assert!(matches!(second.sent().await.unwrap(), Outcome::Halted(_)));
}
