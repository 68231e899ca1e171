//! Logical clock and deferred actions
//!
//! Delays (round transition, feedback fade, projectile lifetime) are
//! scheduled against simulation time and drained by `tick`; nothing blocks.

/// Work deferred to a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Show the next term and spawn its targets
    SpawnRound { round_index: usize },
    /// Return a still-active projectile to the pool
    ExpireProjectile { projectile_id: u32 },
    /// Hide the hit feedback message
    ClearFeedback { shown_at_round: usize },
}

#[derive(Debug, Clone)]
struct Deferred {
    due_ms: f64,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    action: DeferredAction,
}

/// Monotonic clock (milliseconds) with a queue of pending actions
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: f64,
    next_seq: u64,
    pending: Vec<Deferred>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now_ms
    }

    pub fn advance(&mut self, dt_secs: f32) {
        self.now_ms += f64::from(dt_secs.max(0.0)) * 1000.0;
    }

    pub fn schedule(&mut self, delay_ms: f64, action: DeferredAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Deferred {
            due_ms: self.now_ms + delay_ms.max(0.0),
            seq,
            action,
        });
    }

    /// Remove and return every action due at the current time, in due order
    pub fn drain_due(&mut self) -> Vec<DeferredAction> {
        let now = self.now_ms;
        let mut due: Vec<Deferred> = Vec::new();
        self.pending.retain(|d| {
            if d.due_ms <= now {
                due.push(d.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|d| d.action).collect()
    }

    /// Drop every pending action matching `cancel`
    pub fn cancel_where(&mut self, mut cancel: impl FnMut(&DeferredAction) -> bool) {
        self.pending.retain(|d| !cancel(&d.action));
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_fire_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(1000.0, DeferredAction::SpawnRound { round_index: 1 });
        s.schedule(500.0, DeferredAction::ExpireProjectile { projectile_id: 7 });

        s.advance(0.4);
        assert!(s.drain_due().is_empty());

        s.advance(0.7);
        assert_eq!(
            s.drain_due(),
            vec![
                DeferredAction::ExpireProjectile { projectile_id: 7 },
                DeferredAction::SpawnRound { round_index: 1 },
            ]
        );
        assert_eq!(s.pending_len(), 0);
    }

    #[test]
    fn test_cancel_and_clear() {
        let mut s = Scheduler::new();
        s.schedule(10.0, DeferredAction::ExpireProjectile { projectile_id: 1 });
        s.schedule(10.0, DeferredAction::SpawnRound { round_index: 2 });
        s.cancel_where(|a| matches!(a, DeferredAction::ExpireProjectile { .. }));
        assert_eq!(s.pending_len(), 1);
        s.advance(0.02);
        assert_eq!(s.drain_due(), vec![DeferredAction::SpawnRound { round_index: 2 }]);

        s.schedule(10.0, DeferredAction::ClearFeedback { shown_at_round: 0 });
        s.clear();
        s.advance(1.0);
        assert!(s.drain_due().is_empty());
    }
}
