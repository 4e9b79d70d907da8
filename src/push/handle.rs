use http::HeaderMap;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::watch;

use super::state::{Progress, PushState, Settlement};
use crate::compression::Compression;
use crate::error::PushError;

/// Caller's view of a running push
///
/// Cheap to clone; every clone observes the same push. Awaiting the handle
/// itself is the same as awaiting [`PushHandle::acknowledged`].
#[derive(Debug, Clone)]
pub struct PushHandle {
    progress: watch::Receiver<Progress>,
    path: Arc<str>,
    headers: Arc<HeaderMap>,
    priority: u8,
    compression: Compression,
}

impl PushHandle {
    pub(crate) fn new(
        progress: watch::Receiver<Progress>,
        path: &str,
        headers: HeaderMap,
        priority: u8,
        compression: Compression,
    ) -> Self {
        PushHandle {
            progress,
            path: Arc::from(path),
            headers: Arc::new(headers),
            priority,
            compression,
        }
    }

    /// Resolves once the peer accepted the push promise, halted it, or the
    /// push failed before a body could be sent
    pub async fn acknowledged(&self) -> Settlement {
        self.wait(|p| p.acknowledged.clone()).await
    }

    /// Resolves once the body has been fully sent (or the push stopped).
    /// Never completes before [`acknowledged`](Self::acknowledged).
    pub async fn sent(&self) -> Settlement {
        self.wait(|p| p.sent.clone()).await
    }

    pub fn state(&self) -> PushState {
        self.progress.borrow().state
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers as sent with the push promise
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    async fn wait<F>(&self, pick: F) -> Settlement
    where
        F: Fn(&Progress) -> Option<Settlement>,
    {
        let mut rx = self.progress.clone();
        let settlement = match rx.wait_for(|p| pick(p).is_some()).await {
            Ok(progress) => pick(&*progress).unwrap_or(Err(PushError::Aborted)),
            Err(_) => Err(PushError::Aborted),
        };
        settlement
    }
}

impl IntoFuture for PushHandle {
    type Output = Settlement;
    type IntoFuture = Pin<Box<dyn Future<Output = Settlement> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.acknowledged().await })
    }
}
