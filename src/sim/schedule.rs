//! Deferred one-shot callbacks
//!
//! Timed effects (power-up expiry, level announcement, explosion flashes) are
//! queued here with the session epoch current at schedule time. They fire at the
//! start of the first tick whose timestamp reaches them; the caller drops any
//! entry whose epoch no longer matches the session.

/// What to do when a deferred entry comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    EndInvisibility,
    EndAgility,
    EndAnnouncement,
    ClearExplosion { id: u32 },
}

/// A scheduled callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deferred {
    pub due_ms: f64,
    /// Session epoch captured when scheduled
    pub epoch: u64,
    pub action: DeferredAction,
}

/// Pending deferred callbacks
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pending: Vec<Deferred>,
}

impl Schedule {
    /// Queue `action` to run `delay_ms` after `now_ms`
    pub fn after(&mut self, now_ms: f64, delay_ms: f64, epoch: u64, action: DeferredAction) {
        self.pending.push(Deferred {
            due_ms: now_ms + delay_ms,
            epoch,
            action,
        });
    }

    /// Remove and return every entry due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<Deferred> {
        let mut due: Vec<Deferred> = Vec::new();
        self.pending.retain(|d| {
            if d.due_ms <= now_ms {
                due.push(*d);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due
    }

    /// Push back every entry of `epoch` by `span_ms`
    pub fn shift_epoch(&mut self, epoch: u64, span_ms: f64) {
        for d in self.pending.iter_mut().filter(|d| d.epoch == epoch) {
            d.due_ms += span_ms;
        }
    }

    /// Earliest pending due time
    pub fn next_due(&self) -> Option<f64> {
        self.pending.iter().map(|d| d.due_ms).min_by(f64::total_cmp)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
