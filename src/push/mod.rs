//! Server push orchestration
//!
//! A [`Pusher`] is bound to one outbound connection. Each call to
//! [`Pusher::push`] validates its options synchronously, then drives the
//! push life cycle on the current tokio runtime:
//!
//! ```text
//! Created → Acknowledging → Acknowledged → Sending → Sent
//!                 └──────────────┴────────────┴──→ Failed
//! ```
//!
//! The returned [`PushHandle`] observes two completions: `acknowledged()`
//! and `sent()`.

pub mod acknowledge;
pub mod handle;
pub mod request;
pub mod state;
pub mod transmit;

use std::sync::Arc;
use tracing::Instrument;

use crate::config::PushConfig;
use crate::error::PushError;
use crate::transport::PushTransport;

use acknowledge::Acknowledgement;
use state::Tracker;

pub use handle::PushHandle;
pub use request::{Body, BodyKind, PushOptions, PushRequest};
pub use state::{Outcome, Progress, PushState, Settlement};

/// Push factory bound to a single transport
#[derive(Clone)]
pub struct Pusher {
    transport: Arc<dyn PushTransport>,
    config: Arc<PushConfig>,
}

impl Pusher {
    /// Create a pusher with default configuration
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self::with_config(transport, PushConfig::default())
    }

    pub fn with_config(transport: Arc<dyn PushTransport>, config: PushConfig) -> Self {
        Pusher {
            transport,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Start pushing `path`
    ///
    /// Validation errors are returned immediately, before any I/O. Everything
    /// else is reported through the returned handle. Must be called from
    /// within a tokio runtime.
    pub fn push(&self, path: &str, options: PushOptions) -> Result<PushHandle, PushError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| PushError::NoRuntime)?;

        let request = PushRequest::new(path, options, &self.config)?;
        let (tracker, progress) = Tracker::new();
        let handle = PushHandle::new(
            progress,
            request.path(),
            request.headers().clone(),
            request.priority(),
            request.compression(),
        );

        let span = tracing::debug_span!(
            "push",
            path = %request.path(),
            priority = request.priority()
        );
        runtime.spawn(
            run(self.transport.clone(), self.config.clone(), request, tracker).instrument(span),
        );
        Ok(handle)
    }
}

async fn run(
    transport: Arc<dyn PushTransport>,
    config: Arc<PushConfig>,
    mut request: PushRequest,
    tracker: Tracker,
) {
    tracker.advance(PushState::Acknowledging);

    match acknowledge::acknowledge(transport.as_ref(), &mut request).await {
        Acknowledgement::Accepted(channel) => {
            tracker.settle_acknowledged(Ok(Outcome::Completed));
            tracker.advance(PushState::Sending);
            let result = transmit::send(request, channel, &config).await;
            if let Err(err) = &result {
                tracing::debug!(error = %err, "push send failed");
            }
            tracker.settle_sent(result.map(|()| Outcome::Completed));
        }
        Acknowledgement::Halted(reason) => {
            tracing::debug!(path = %request.path(), reason = %reason, "push halted by peer");
            tracker.settle_acknowledged(Ok(Outcome::Halted(reason)));
            tracker.settle_sent(Ok(Outcome::Halted(reason)));
        }
        Acknowledgement::Failed(err) => {
            tracing::debug!(error = %err, "push failed before acknowledge");
            tracker.settle_acknowledged(Err(err.clone()));
            tracker.settle_sent(Err(err));
        }
    }
}

impl std::fmt::Debug for Pusher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pusher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
