//! Benign vs fatal transport errors
//!
//! Only acknowledge-phase errors go through this classifier. Errors seen
//! while transmitting are always surfaced to the caller.

use std::fmt;

use super::{ResetCode, TransportError};

/// Why a push stopped without being an application failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// Peer refused or cancelled the promised stream
    PeerReset(ResetCode),
    /// A write raced with the stream end
    WriteAfterEnd,
    /// Channel closed before the peer acknowledged
    ClosedBeforeAck,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::PeerReset(code) => write!(f, "peer reset stream: {}", code),
            HaltReason::WriteAfterEnd => f.write_str("write after end"),
            HaltReason::ClosedBeforeAck => f.write_str("closed before acknowledge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Benign(HaltReason),
    Fatal,
}

pub fn classify(err: &TransportError) -> ErrorClass {
    match err {
        TransportError::StreamReset(code) => ErrorClass::Benign(HaltReason::PeerReset(*code)),
        // Observed when a close and a pending write race; which write path
        // triggers it is not tracked, so every instance is treated alike.
        TransportError::WriteAfterEnd => ErrorClass::Benign(HaltReason::WriteAfterEnd),
        _ => ErrorClass::Fatal,
    }
}

pub fn is_benign(err: &TransportError) -> bool {
    matches!(classify(err), ErrorClass::Benign(_))
}
