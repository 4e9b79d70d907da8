//! In-process transport
//!
//! Every channel opened on a [`LoopbackTransport`] is mirrored by a
//! [`PeerStream`] handed to whoever plays the client: it can acknowledge,
//! reset or close the promised stream and collect what the server sent.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::HeaderMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::{ChannelEvent, ChannelSink, PushChannel, PushTransport, ResetCode, TransportError};

/// What the sink delivered to the peer
#[derive(Debug, Clone, PartialEq, Eq)]
enum Frame {
    Data(Bytes),
    End,
    Destroyed,
}

/// How a stream ended from the peer's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Server called `end`
    Ended,
    /// Server called `destroy`
    Destroyed,
    /// Sink went away without either
    Dropped,
}

/// Bytes received on a promised stream and how it finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub body: Bytes,
    pub end: StreamEnd,
}

/// Client side of one promised stream
#[derive(Debug)]
pub struct PeerStream {
    pub path: String,
    pub headers: HeaderMap,
    pub priority: u8,
    events: mpsc::UnboundedSender<ChannelEvent>,
    frames: mpsc::UnboundedReceiver<Frame>,
    closed: Arc<AtomicBool>,
}

impl PeerStream {
    pub fn acknowledge(&self) {
        let _ = self.events.send(ChannelEvent::Acknowledged);
    }

    /// Send RST_STREAM with `code`
    pub fn reset(&self, code: ResetCode) {
        self.closed.store(true, Ordering::SeqCst);
        let _ = self
            .events
            .send(ChannelEvent::Error(TransportError::StreamReset(code)));
        let _ = self.events.send(ChannelEvent::Closed);
    }

    /// Surface an arbitrary transport error on the channel
    pub fn error(&self, err: TransportError) {
        let _ = self.events.send(ChannelEvent::Error(err));
    }

    /// Drop the stream from the client side
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let _ = self.events.send(ChannelEvent::Closed);
    }

    /// Report the stream as flushed without the server having ended it
    pub fn finish(&self) {
        let _ = self.events.send(ChannelEvent::Finished);
    }

    /// Wait for the next data chunk; `None` once the stream is over
    pub async fn next_chunk(&mut self) -> Option<Bytes> {
        match self.frames.recv().await {
            Some(Frame::Data(data)) => Some(data),
            _ => None,
        }
    }

    /// Read until the server ends, destroys or drops the stream
    pub async fn collect(&mut self) -> Delivery {
        let mut body = BytesMut::new();
        loop {
            match self.frames.recv().await {
                Some(Frame::Data(data)) => body.extend_from_slice(&data),
                Some(Frame::End) => {
                    return Delivery {
                        body: body.freeze(),
                        end: StreamEnd::Ended,
                    }
                }
                Some(Frame::Destroyed) => {
                    return Delivery {
                        body: body.freeze(),
                        end: StreamEnd::Destroyed,
                    }
                }
                None => {
                    return Delivery {
                        body: body.freeze(),
                        end: StreamEnd::Dropped,
                    }
                }
            }
        }
    }
}

struct LoopbackSink {
    frames: mpsc::UnboundedSender<Frame>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    closed: Arc<AtomicBool>,
    ended: bool,
}

impl LoopbackSink {
    fn check_writable(&self) -> Result<(), TransportError> {
        if self.ended {
            return Err(TransportError::WriteAfterEnd);
        }
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelSink for LoopbackSink {
    async fn write(&mut self, data: Bytes) -> Result<(), TransportError> {
        self.check_writable()?;
        let _ = self.frames.send(Frame::Data(data));
        Ok(())
    }

    async fn end(&mut self, data: Option<Bytes>) -> Result<(), TransportError> {
        self.check_writable()?;
        if let Some(data) = data.filter(|d| !d.is_empty()) {
            let _ = self.frames.send(Frame::Data(data));
        }
        self.ended = true;
        let _ = self.frames.send(Frame::End);
        let _ = self.events.send(ChannelEvent::Finished);
        Ok(())
    }

    fn destroy(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.closed.store(true, Ordering::SeqCst);
        let _ = self.frames.send(Frame::Destroyed);
        let _ = self.events.send(ChannelEvent::Closed);
    }
}

/// Transport whose channels terminate in [`PeerStream`]s
pub struct LoopbackTransport {
    peers: mpsc::UnboundedSender<PeerStream>,
    refusal: Mutex<Option<TransportError>>,
}

impl LoopbackTransport {
    /// Create a transport and the receiver of its peer streams
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PeerStream>) {
        let (peers, rx) = mpsc::unbounded_channel();
        (
            LoopbackTransport {
                peers,
                refusal: Mutex::new(None),
            },
            rx,
        )
    }

    /// Make every subsequent `open_push_channel` fail with `err`
    pub fn refuse_with(&self, err: TransportError) {
        if let Ok(mut refusal) = self.refusal.lock() {
            *refusal = Some(err);
        }
    }
}

#[async_trait]
impl PushTransport for LoopbackTransport {
    async fn open_push_channel(
        &self,
        path: &str,
        headers: &HeaderMap,
        priority: u8,
    ) -> Result<PushChannel, TransportError> {
        let refusal = self.refusal.lock().ok().and_then(|r| r.clone());
        if let Some(err) = refusal {
            return Err(err);
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        let peer = PeerStream {
            path: path.to_string(),
            headers: headers.clone(),
            priority,
            events: events_tx.clone(),
            frames: frames_rx,
            closed: closed.clone(),
        };
        self.peers
            .send(peer)
            .map_err(|_| TransportError::Protocol("peer side is gone".to_string()))?;

        let sink = LoopbackSink {
            frames: frames_tx,
            events: events_tx,
            closed,
            ended: false,
        };
        Ok(PushChannel::new(Box::new(sink), events_rx))
    }
}
