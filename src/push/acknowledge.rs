//! Acknowledge stage: open the push channel and wait for the peer
//!
//! The first channel event decides the push:
//! - `Acknowledged` → the channel moves on to transmission
//! - `Error` → the stream body is released; benign errors halt quietly,
//!   fatal ones fail the push
//! - `Closed` (or the event queue disappearing) → release, halt

use crate::error::PushError;
use crate::transport::{classify, ChannelEvent, ErrorClass, HaltReason, PushChannel, PushTransport};

use super::request::PushRequest;

pub(crate) enum Acknowledgement {
    Accepted(PushChannel),
    Halted(HaltReason),
    Failed(PushError),
}

pub(crate) async fn acknowledge(
    transport: &dyn PushTransport,
    request: &mut PushRequest,
) -> Acknowledgement {
    let mut channel = match transport
        .open_push_channel(&request.path, &request.headers, request.priority)
        .await
    {
        Ok(channel) => channel,
        Err(err) => {
            request.release_stream();
            return Acknowledgement::Failed(err.into());
        }
    };

    // The receiver is consumed exactly once here; on every non-accept path
    // `channel` (and with it the event queue) is dropped on return.
    let first = channel.events.recv().await;
    match first {
        Some(ChannelEvent::Acknowledged) => {
            tracing::debug!(path = %request.path, "push acknowledged");
            Acknowledgement::Accepted(channel)
        }
        Some(ChannelEvent::Error(err)) => {
            request.release_stream();
            match classify(&err) {
                ErrorClass::Benign(reason) => Acknowledgement::Halted(reason),
                ErrorClass::Fatal => Acknowledgement::Failed(err.into()),
            }
        }
        Some(ChannelEvent::Closed) | Some(ChannelEvent::Finished) | None => {
            request.release_stream();
            Acknowledgement::Halted(HaltReason::ClosedBeforeAck)
        }
    }
}
