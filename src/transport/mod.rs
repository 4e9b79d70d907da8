//! Transport seam: the multiplexed connection a push rides on
//!
//! The orchestrator never frames bytes itself. A host adapts its HTTP/2
//! stack to [`PushTransport`], handing back a [`PushChannel`] per promised
//! stream: a sink for body bytes plus a queue of lifecycle events.

pub mod classify;
pub mod loopback;

use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

pub use classify::{classify, is_benign, ErrorClass, HaltReason};

/// RST_STREAM / GOAWAY error codes (RFC 7540 section 7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetCode {
    NoError,
    ProtocolError,
    InternalError,
    FlowControlError,
    SettingsTimeout,
    StreamClosed,
    FrameSizeError,
    RefusedStream,
    Cancel,
    CompressionError,
    ConnectError,
    EnhanceYourCalm,
    InadequateSecurity,
    Http11Required,
    /// Codes outside the registry are kept as-is
    Unknown(u32),
}

impl From<u32> for ResetCode {
    fn from(code: u32) -> Self {
        match code {
            0x0 => ResetCode::NoError,
            0x1 => ResetCode::ProtocolError,
            0x2 => ResetCode::InternalError,
            0x3 => ResetCode::FlowControlError,
            0x4 => ResetCode::SettingsTimeout,
            0x5 => ResetCode::StreamClosed,
            0x6 => ResetCode::FrameSizeError,
            0x7 => ResetCode::RefusedStream,
            0x8 => ResetCode::Cancel,
            0x9 => ResetCode::CompressionError,
            0xa => ResetCode::ConnectError,
            0xb => ResetCode::EnhanceYourCalm,
            0xc => ResetCode::InadequateSecurity,
            0xd => ResetCode::Http11Required,
            other => ResetCode::Unknown(other),
        }
    }
}

impl From<ResetCode> for u32 {
    fn from(code: ResetCode) -> u32 {
        match code {
            ResetCode::NoError => 0x0,
            ResetCode::ProtocolError => 0x1,
            ResetCode::InternalError => 0x2,
            ResetCode::FlowControlError => 0x3,
            ResetCode::SettingsTimeout => 0x4,
            ResetCode::StreamClosed => 0x5,
            ResetCode::FrameSizeError => 0x6,
            ResetCode::RefusedStream => 0x7,
            ResetCode::Cancel => 0x8,
            ResetCode::CompressionError => 0x9,
            ResetCode::ConnectError => 0xa,
            ResetCode::EnhanceYourCalm => 0xb,
            ResetCode::InadequateSecurity => 0xc,
            ResetCode::Http11Required => 0xd,
            ResetCode::Unknown(other) => other,
        }
    }
}

impl fmt::Display for ResetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetCode::Unknown(code) => write!(f, "UNKNOWN(0x{:x})", code),
            known => write!(f, "{:?}(0x{:x})", known, u32::from(*known)),
        }
    }
}

/// Errors reported by the transport for a single push channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Peer sent RST_STREAM for the promised stream
    #[error("stream reset by peer: {0}")]
    StreamReset(ResetCode),

    /// A write raced with the stream being ended
    #[error("write after end")]
    WriteAfterEnd,

    /// Channel is already closed
    #[error("channel closed")]
    Closed,

    #[error("transport I/O error: {0}")]
    Io(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

/// Lifecycle signals a push channel emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Peer accepted the push promise; a body may follow
    Acknowledged,
    Error(TransportError),
    /// Channel closed (by either side)
    Closed,
    /// Everything handed to `end` has been flushed
    Finished,
}

/// Write half of a push channel
#[async_trait]
pub trait ChannelSink: Send {
    async fn write(&mut self, data: Bytes) -> Result<(), TransportError>;

    /// Write an optional final chunk and half-close the stream
    async fn end(&mut self, data: Option<Bytes>) -> Result<(), TransportError>;

    /// Abort the stream without a clean end
    fn destroy(&mut self);
}

/// An opened push channel: body sink plus its event queue
pub struct PushChannel {
    pub sink: Box<dyn ChannelSink>,
    pub events: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl PushChannel {
    pub fn new(sink: Box<dyn ChannelSink>, events: mpsc::UnboundedReceiver<ChannelEvent>) -> Self {
        PushChannel { sink, events }
    }
}

impl fmt::Debug for PushChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushChannel").finish_non_exhaustive()
    }
}

/// Outbound connection that can open server-initiated push channels
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn open_push_channel(
        &self,
        path: &str,
        headers: &HeaderMap,
        priority: u8,
    ) -> Result<PushChannel, TransportError>;
}
