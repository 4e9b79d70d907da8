//! Transmission stage: deliver the body over an acknowledged channel
//!
//! Buffer and text bodies are written in one `end`. Stream and file bodies
//! are piped chunk by chunk and raced against the channel's events; the
//! first terminal event runs the single cleanup path.

use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use crate::compression::{gzip, GzipStream};
use crate::config::PushConfig;
use crate::error::PushError;
use crate::transport::{ChannelEvent, ChannelSink, PushChannel};

use super::request::{BodyDescriptor, BodyReader, PushRequest};

/// Owns the body source until it is released, at most once
struct SourceGuard {
    source: Option<BodyReader>,
}

impl SourceGuard {
    fn new(source: BodyReader) -> Self {
        SourceGuard {
            source: Some(source),
        }
    }

    /// Returns true only for the call that actually released the source
    fn release(&mut self) -> bool {
        self.source.take().is_some()
    }

    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.source.as_mut() {
            Some(source) => source.read(buf).await,
            None => Ok(0),
        }
    }
}

pub(crate) async fn send(
    request: PushRequest,
    channel: PushChannel,
    config: &PushConfig,
) -> Result<(), PushError> {
    let PushChannel { mut sink, mut events } = channel;
    let level = request
        .compression
        .options()
        .map(|options| options.effective_level(config.compression_level));
    let path = request.path;

    let result = match request.body {
        // An empty body still has to be valid gzip once content-encoding is set
        BodyDescriptor::Empty => send_bytes(sink.as_mut(), &mut events, Bytes::new(), level).await,
        BodyDescriptor::Buffer(bytes) => {
            send_bytes(sink.as_mut(), &mut events, bytes, level).await
        }
        BodyDescriptor::Text(text) => {
            send_bytes(sink.as_mut(), &mut events, Bytes::from(text), level).await
        }
        BodyDescriptor::Stream(reader) => {
            pipe(sink.as_mut(), &mut events, reader, level, config.chunk_size, &path).await
        }
        BodyDescriptor::File(filename) => match tokio::fs::File::open(&filename).await {
            Ok(file) => {
                tracing::debug!(path = %path, file = %filename.display(), "streaming file body");
                pipe(
                    sink.as_mut(),
                    &mut events,
                    Box::new(file),
                    level,
                    config.chunk_size,
                    &path,
                )
                .await
            }
            Err(err) => {
                sink.destroy();
                Err(err.into())
            }
        },
    };

    drain_after_cleanup(events, path);
    result
}

async fn send_bytes(
    sink: &mut dyn ChannelSink,
    events: &mut mpsc::UnboundedReceiver<ChannelEvent>,
    body: Bytes,
    level: Option<u32>,
) -> Result<(), PushError> {
    let payload = match level {
        None => body,
        Some(level) => match gzip(&body, level) {
            Ok(encoded) => encoded,
            Err(err) => {
                sink.destroy();
                return Err(err.into());
            }
        },
    };

    if let Some(err) = queued_failure(events) {
        sink.destroy();
        return Err(err);
    }
    let end = if payload.is_empty() { None } else { Some(payload) };
    if let Err(err) = sink.end(end).await {
        // The sink only reports the symptom; a queued channel error is the cause
        return Err(queued_failure(events).unwrap_or_else(|| err.into()));
    }
    Ok(())
}

/// First terminal event already waiting on the queue, without blocking
///
/// A queued `Error` wins over a queued `Closed`.
fn queued_failure(events: &mut mpsc::UnboundedReceiver<ChannelEvent>) -> Option<PushError> {
    let mut closed = false;
    loop {
        match events.try_recv() {
            Ok(ChannelEvent::Error(err)) => return Some(err.into()),
            Ok(ChannelEvent::Closed) => closed = true,
            Ok(ChannelEvent::Acknowledged) | Ok(ChannelEvent::Finished) => {}
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => break,
        }
    }
    closed.then_some(PushError::ClosedPrematurely)
}

async fn pipe(
    sink: &mut dyn ChannelSink,
    events: &mut mpsc::UnboundedReceiver<ChannelEvent>,
    source: BodyReader,
    level: Option<u32>,
    chunk_size: usize,
    path: &str,
) -> Result<(), PushError> {
    let mut guard = SourceGuard::new(source);
    let mut encoder = match level.map(GzipStream::new).transpose() {
        Ok(encoder) => encoder,
        Err(err) => {
            guard.release();
            sink.destroy();
            return Err(err.into());
        }
    };
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut ended = false;
    let mut sent_bytes: u64 = 0;

    let result: Result<(), PushError> = loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(ChannelEvent::Finished) => break Ok(()),
                // A close after a successful end means the peer got everything
                Some(ChannelEvent::Closed) | None if ended => break Ok(()),
                Some(ChannelEvent::Closed) | None => break Err(PushError::ClosedPrematurely),
                Some(ChannelEvent::Error(err)) => break Err(err.into()),
                Some(ChannelEvent::Acknowledged) => continue,
            },

            read = guard.read(&mut buf), if !ended => match read {
                Ok(0) => {
                    let tail = match encoder.take().map(GzipStream::finish).transpose() {
                        Ok(tail) => tail,
                        Err(err) => break Err(err.into()),
                    };
                    guard.release();
                    if let Err(err) = sink.end(tail).await {
                        break Err(err.into());
                    }
                    ended = true;
                }
                Ok(n) => {
                    sent_bytes += n as u64;
                    let chunk = match encoder.as_mut() {
                        Some(encoder) => match encoder.push(&buf[..n]) {
                            Ok(chunk) => chunk,
                            Err(err) => break Err(err.into()),
                        },
                        None => Bytes::copy_from_slice(&buf[..n]),
                    };
                    if !chunk.is_empty() {
                        if let Err(err) = sink.write(chunk).await {
                            break Err(err.into());
                        }
                    }
                }
                Err(err) => break Err(err.into()),
            },
        }
    };

    // Single cleanup path for every terminal event above
    let released = guard.release();
    if result.is_err() && !ended {
        sink.destroy();
    }
    match &result {
        Ok(()) => tracing::debug!(path = %path, bytes = sent_bytes, "push body sent"),
        Err(err) => tracing::debug!(
            path = %path,
            bytes = sent_bytes,
            released_on_cleanup = released,
            error = %err,
            "push body aborted"
        ),
    }
    result
}

/// Keep observing a finished channel so late errors are logged, never raised
fn drain_after_cleanup(mut events: mpsc::UnboundedReceiver<ChannelEvent>, path: String) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let ChannelEvent::Error(err) = event {
                tracing::error!(path = %path, error = %err, "channel error after push cleanup");
            }
        }
    });
}
