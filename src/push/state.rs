//! Push life cycle state shared by the acknowledge and send completions
//!
//! One watch channel carries the whole [`Progress`]: the state machine plus
//! both settlements. The push task owns the only [`Tracker`]; every
//! [`PushHandle`](super::PushHandle) observes it.

use tokio::sync::watch;

use crate::error::PushError;
use crate::transport::HaltReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PushState {
    Created,
    Acknowledging,
    Acknowledged,
    Sending,
    Sent,
    Failed,
}

impl PushState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PushState::Sent | PushState::Failed)
    }

    /// Transitions only move forward and never leave a terminal state
    pub fn can_advance_to(self, next: PushState) -> bool {
        !self.is_terminal() && next > self
    }
}

/// Non-error completion of a push stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Stopped by the peer; not an application failure
    Halted(HaltReason),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

pub type Settlement = Result<Outcome, PushError>;

#[derive(Debug, Clone)]
pub struct Progress {
    pub state: PushState,
    pub acknowledged: Option<Settlement>,
    pub sent: Option<Settlement>,
}

impl Progress {
    fn new() -> Self {
        Progress {
            state: PushState::Created,
            acknowledged: None,
            sent: None,
        }
    }
}

/// Write side of the progress channel
pub(crate) struct Tracker {
    tx: watch::Sender<Progress>,
}

impl Tracker {
    pub(crate) fn new() -> (Self, watch::Receiver<Progress>) {
        let (tx, rx) = watch::channel(Progress::new());
        (Tracker { tx }, rx)
    }

    pub(crate) fn advance(&self, next: PushState) {
        self.tx.send_modify(|p| {
            if p.state.can_advance_to(next) {
                p.state = next;
            }
        });
    }

    /// Settle the acknowledge completion; later calls are ignored
    pub(crate) fn settle_acknowledged(&self, settlement: Settlement) {
        self.tx.send_modify(|p| {
            if p.acknowledged.is_some() {
                return;
            }
            match &settlement {
                Ok(Outcome::Completed) => advance_in_place(p, PushState::Acknowledged),
                _ => advance_in_place(p, PushState::Failed),
            }
            p.acknowledged = Some(settlement);
        });
    }

    /// Settle the send completion; later calls are ignored
    ///
    /// Send settles after acknowledge by construction: a send settlement
    /// arriving first also settles acknowledge as aborted.
    pub(crate) fn settle_sent(&self, settlement: Settlement) {
        self.tx.send_modify(|p| {
            if p.sent.is_some() {
                return;
            }
            if p.acknowledged.is_none() {
                p.acknowledged = Some(Err(PushError::Aborted));
            }
            match &settlement {
                Ok(Outcome::Completed) => advance_in_place(p, PushState::Sent),
                _ => advance_in_place(p, PushState::Failed),
            }
            p.sent = Some(settlement);
        });
    }
}

fn advance_in_place(p: &mut Progress, next: PushState) {
    if p.state.can_advance_to(next) {
        p.state = next;
    }
}

impl Drop for Tracker {
    // Guarantees both completions settle even if the task is torn down
    fn drop(&mut self) {
        let unsettled = {
            let p = self.tx.borrow();
            p.acknowledged.is_none() || p.sent.is_none()
        };
        if unsettled {
            self.settle_acknowledged(Err(PushError::Aborted));
            self.settle_sent(Err(PushError::Aborted));
        }
    }
}
