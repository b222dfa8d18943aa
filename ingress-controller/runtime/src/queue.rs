//! A deduplicating, rate-limited queue of reconciliation requests.

use crate::core::{Dispatch, IngressKey};
use ahash::AHashSet as HashSet;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    time::{self, Duration, MissedTickBehavior},
};
use tracing::{trace, warn};

#[cfg(test)]
mod tests;

/// Accepts reconciliation requests, holding at most one pending request per ingress.
#[derive(Clone, Debug)]
pub struct WorkQueue {
    pending: Arc<Mutex<HashSet<IngressKey>>>,
    tx: mpsc::UnboundedSender<IngressKey>,
}

/// Yields pending reconciliation requests no faster than one per period.
#[derive(Debug)]
pub struct Requests {
    pending: Arc<Mutex<HashSet<IngressKey>>>,
    rx: mpsc::UnboundedReceiver<IngressKey>,
    interval: time::Interval,
}

/// Creates a queue whose requests are released at most once per `period`.
///
/// # Panics
///
/// If `period` is zero.
pub fn channel(period: Duration) -> (WorkQueue, Requests) {
    let pending = Arc::new(Mutex::new(HashSet::default()));
    let (tx, rx) = mpsc::unbounded_channel();

    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let queue = WorkQueue {
        pending: pending.clone(),
        tx,
    };
    let requests = Requests {
        pending,
        rx,
        interval,
    };
    (queue, requests)
}

// === impl WorkQueue ===

impl WorkQueue {
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl Dispatch for WorkQueue {
    fn submit(&self, ingress: IngressKey) {
        if !self.pending.lock().insert(ingress.clone()) {
            trace!(%ingress, "Reconciliation already pending");
            return;
        }
        if self.tx.send(ingress).is_err() {
            warn!("Reconciliation queue closed");
        }
    }
}

// === impl Requests ===

impl Requests {
    /// Waits for the next request.
    ///
    /// Each request is released at least one period after the previous one, even when the queue
    /// was idle in between. Once a request is yielded it is no longer pending, so a later
    /// submission for the same ingress is queued again.
    pub async fn next(&mut self) -> Option<IngressKey> {
        let ingress = self.rx.recv().await?;
        self.interval.tick().await;
        self.pending.lock().remove(&ingress);
        Some(ingress)
    }
}
