//! Cancellable deferred events keyed by speaker.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct Pending {
    seq: u64,
    cancel: CancellationToken,
}

/// Debounce timers. Each key has at most one pending timer; scheduling a
/// new one or cancelling drops the old one.
///
/// A fired timer posts its event back to the session queue together with a
/// sequence number. The session accepts it only if [`DebounceTimers::fire`]
/// confirms the timer is still the current one for that key, so a timer
/// cancelled after its sleep already completed is ignored.
#[derive(Default)]
pub struct DebounceTimers {
    next_seq: u64,
    pending: HashMap<String, Pending>,
}

impl DebounceTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `make(seq)` to be sent on `tx` after `delay`.
    pub fn schedule<E, F>(&mut self, key: &str, delay: Duration, tx: mpsc::UnboundedSender<E>, make: F)
    where
        E: Send + 'static,
        F: FnOnce(u64) -> E + Send + 'static,
    {
        self.cancel(key);
        self.next_seq += 1;
        let seq = self.next_seq;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(make(seq));
                }
            }
        });
        self.pending.insert(key.to_string(), Pending { seq, cancel });
    }

    /// Cancels the pending timer for `key`. Returns true if one was pending.
    pub fn cancel(&mut self, key: &str) -> bool {
        match self.pending.remove(key) {
            Some(p) => {
                p.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Consumes a fired timer. Returns false for stale or unknown timers.
    pub fn fire(&mut self, key: &str, seq: u64) -> bool {
        match self.pending.get(key) {
            Some(p) if p.seq == seq => {
                self.pending.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, p) in self.pending.drain() {
            p.cancel.cancel();
        }
    }
}

impl Drop for DebounceTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
