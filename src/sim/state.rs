//! Quiz session state and the per-round state machine
//!
//! Rounds move `AwaitingShot -> Resolving -> AwaitingShot` until the last
//! pair is resolved, then the session is `Complete`. The session is an
//! explicit object owned by the caller; dropping or `shutdown()` releases
//! every body and pending deferred action with it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pairs::{Pair, PairSet};
use super::projectile::{ProjectilePool, Turret};
use super::target::{Round, Target, spawn_targets};
use super::timer::{DeferredAction, Scheduler};
use crate::error::Result;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Targets are live, waiting for a hit
    AwaitingShot,
    /// Round resolved, next round spawns after the transition delay
    Resolving,
    /// Every pair has been played
    Complete,
    /// Torn down; ticks and callbacks are inert
    Closed,
}

/// What the outcome callback receives once per resolved round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotOutcome<'a> {
    /// Round (term) index the shot resolved
    pub round_index: usize,
    /// Definition text carried by the hit target
    pub definition: &'a str,
    pub correct: bool,
}

/// Outcome callback injected at construction
pub type OutcomeCallback = Box<dyn FnMut(&ShotOutcome<'_>)>;

/// Result of a resolved round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub round_index: usize,
    pub definition: String,
    pub correct: bool,
    pub score: u32,
    /// Round that will spawn after the delay (None when the session completed)
    pub next_round: Option<usize>,
}

/// Hit feedback message shown for a short time
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub correct: bool,
    pub round_index: usize,
    pub shown_at: f64,
}

impl Feedback {
    pub fn message(&self) -> &'static str {
        if self.correct {
            "✓ Correct!"
        } else {
            "✗ Wrong! Moving to next..."
        }
    }
}

/// Final tally surfaced when the session completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u32,
    pub total: usize,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Final Score: {} / {}", self.score, self.total)
    }
}

/// Monotonic entity id source shared by targets and projectiles
#[derive(Debug, Clone)]
pub(crate) struct EntityIds {
    next: u32,
}

impl EntityIds {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn next(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// A single-player quiz session
pub struct Session {
    pub settings: Settings,
    pub(crate) pairs: PairSet,
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    /// Authoritative round index (0..=pairs.len())
    pub(crate) round_index: usize,
    pub(crate) score: u32,
    pub(crate) phase: SessionPhase,
    /// Round whose term is on screen
    pub(crate) round: Option<Round>,
    /// Live targets of the current round only
    pub(crate) targets: Vec<Target>,
    pub(crate) projectiles: ProjectilePool,
    pub(crate) turret: Turret,
    pub(crate) scheduler: Scheduler,
    pub(crate) feedback: Option<Feedback>,
    pub(crate) rounds_spawned: u32,
    ids: EntityIds,
    on_outcome: Option<OutcomeCallback>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("round_index", &self.round_index)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .field("targets", &self.targets.len())
            .field("projectiles", &self.projectiles.active_count())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session at round 0.
    ///
    /// Fails with `InsufficientData` for fewer than 4 pairs and
    /// `MalformedPair` for blank entries; no round is spawned in that case.
    pub fn new(
        pairs: Vec<Pair>,
        settings: Settings,
        seed: u64,
        on_outcome: impl FnMut(&ShotOutcome<'_>) + 'static,
    ) -> Result<Self> {
        Ok(Self::from_pair_set(
            PairSet::new(pairs)?,
            settings,
            seed,
            on_outcome,
        ))
    }

    pub fn from_pair_set(
        pairs: PairSet,
        settings: Settings,
        seed: u64,
        on_outcome: impl FnMut(&ShotOutcome<'_>) + 'static,
    ) -> Self {
        let turret = Turret::new(
            settings.field_width,
            settings.field_height,
            settings.turret_offset,
        );
        let mut session = Self {
            projectiles: ProjectilePool::new(settings.pool_capacity),
            settings,
            pairs,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            round_index: 0,
            score: 0,
            phase: SessionPhase::AwaitingShot,
            round: None,
            targets: Vec::new(),
            turret,
            scheduler: Scheduler::new(),
            feedback: None,
            rounds_spawned: 0,
            ids: EntityIds::new(),
            on_outcome: Some(Box::new(on_outcome)),
        };

        log::info!(
            "Quiz session started: {} pairs, seed {}",
            session.pairs.len(),
            seed
        );
        session.spawn_round(0);
        session
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.next()
    }

    pub fn pairs(&self) -> &PairSet {
        &self.pairs
    }

    pub fn round_index(&self) -> usize {
        self.round_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn projectiles(&self) -> &ProjectilePool {
        &self.projectiles
    }

    pub fn turret(&self) -> &Turret {
        &self.turret
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    /// Logical clock (ms since start or restart)
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Number of rounds spawned since start or restart
    pub fn rounds_spawned(&self) -> u32 {
        self.rounds_spawned
    }

    pub fn pending_actions(&self) -> usize {
        self.scheduler.pending_len()
    }

    /// Final tally, once complete
    pub fn summary(&self) -> Option<SessionSummary> {
        self.is_complete().then_some(SessionSummary {
            score: self.score,
            total: self.pairs.len(),
        })
    }

    /// Term prompt for the HUD (empty once complete)
    pub fn term_prompt(&self) -> String {
        match (&self.round, self.phase) {
            (_, SessionPhase::Complete | SessionPhase::Closed) => String::new(),
            (Some(round), _) => format!("Match: \"{}\"", round.term),
            (None, _) => String::new(),
        }
    }

    pub fn score_text(&self) -> String {
        format!("Score: {} / {}", self.score, self.pairs.len())
    }

    /// Rotate the turret toward the pointer
    pub fn aim(&mut self, pointer: Vec2) {
        self.turret.aim_at(pointer);
    }

    /// Fire from the turret along its aim.
    ///
    /// Returns the projectile id, or `None` when the pool is exhausted (the
    /// shot is dropped) or the session no longer accepts shots.
    pub fn fire(&mut self) -> Option<u32> {
        if matches!(self.phase, SessionPhase::Complete | SessionPhase::Closed) {
            return None;
        }

        let id = self.next_entity_id();
        let now = self.scheduler.now();
        let vel = self.turret.muzzle_velocity(self.settings.projectile_speed);
        let fired = self
            .projectiles
            .acquire(
                id,
                self.turret.pos,
                vel,
                self.settings.projectile_radius,
                now,
            )
            .is_some();

        if !fired {
            log::debug!(
                "Projectile pool exhausted ({}), shot dropped",
                self.projectiles.capacity()
            );
            return None;
        }

        self.scheduler.schedule(
            self.settings.projectile_lifetime_ms,
            DeferredAction::ExpireProjectile { projectile_id: id },
        );
        Some(id)
    }

    /// Resolve a projectile/target overlap.
    ///
    /// Resolves at most once per round: outside `AwaitingShot`, or for a
    /// projectile/target that is no longer live, this is a no-op.
    pub fn resolve_hit(&mut self, projectile_id: u32, target_id: u32) -> Option<Resolution> {
        if self.phase != SessionPhase::AwaitingShot {
            log::debug!(
                "Ignoring overlap {}/{} in phase {:?}",
                projectile_id,
                target_id,
                self.phase
            );
            return None;
        }
        let target = self.targets.iter().find(|t| t.id == target_id)?;
        self.projectiles.get(projectile_id)?;

        let definition = target.definition().to_owned();
        let correct = target.correct;
        let round_index = self.round_index;

        self.projectiles.release(projectile_id);

        if let Some(callback) = self.on_outcome.as_mut() {
            callback(&ShotOutcome {
                round_index,
                definition: &definition,
                correct,
            });
        }

        if correct {
            self.score += 1;
        }

        // No second chance: every target (and its label) goes
        self.targets.clear();

        let now = self.scheduler.now();
        self.feedback = Some(Feedback {
            correct,
            round_index,
            shown_at: now,
        });
        self.scheduler.schedule(
            self.settings.feedback_ms,
            DeferredAction::ClearFeedback {
                shown_at_round: round_index,
            },
        );

        self.round_index += 1;
        let next_round = if self.round_index < self.pairs.len() {
            self.phase = SessionPhase::Resolving;
            self.scheduler.schedule(
                self.settings.round_delay_ms,
                DeferredAction::SpawnRound {
                    round_index: self.round_index,
                },
            );
            Some(self.round_index)
        } else {
            self.phase = SessionPhase::Complete;
            self.scheduler
                .cancel_where(|a| matches!(a, DeferredAction::SpawnRound { .. }));
            log::info!(
                "Quiz complete: {} / {}",
                self.score,
                self.pairs.len()
            );
            None
        };

        log::info!(
            "Round {} resolved: {:?} ({})",
            round_index + 1,
            definition,
            if correct { "correct" } else { "wrong" }
        );

        Some(Resolution {
            round_index,
            definition,
            correct,
            score: self.score,
            next_round,
        })
    }

    /// Spawn the targets for `index` if it is the round the session expects.
    ///
    /// Returns false (and spawns nothing) once complete or closed.
    pub(crate) fn spawn_round(&mut self, index: usize) -> bool {
        if matches!(self.phase, SessionPhase::Complete | SessionPhase::Closed)
            || index != self.round_index
        {
            return false;
        }

        // Stale-target guard
        self.targets.clear();

        let Some(round) = Round::build(
            &self.pairs,
            index,
            self.settings.distractor_count,
            &mut self.rng,
        ) else {
            return false;
        };

        let ids = &mut self.ids;
        let targets = spawn_targets(&round, &self.settings, &mut self.rng, || ids.next());

        log::info!(
            "Round {} / {}: {:?} with {} candidates",
            index + 1,
            self.pairs.len(),
            round.term,
            round.candidates.len()
        );

        self.targets = targets;
        self.round = Some(round);
        self.rounds_spawned += 1;
        self.phase = SessionPhase::AwaitingShot;
        true
    }

    /// Re-enter at round 0 with score 0 (keeps pairs, settings and callback).
    ///
    /// A closed session stays closed: its callback is gone.
    pub fn restart(&mut self, seed: u64) {
        if self.phase == SessionPhase::Closed {
            log::debug!("Ignoring restart of a closed session");
            return;
        }
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.round_index = 0;
        self.score = 0;
        self.phase = SessionPhase::AwaitingShot;
        self.round = None;
        self.targets.clear();
        self.projectiles.clear();
        self.scheduler = Scheduler::new();
        self.feedback = None;
        self.rounds_spawned = 0;
        self.ids = EntityIds::new();

        log::info!("Quiz restarted with seed {}", seed);
        self.spawn_round(0);
    }

    /// Release every body, timer and the outcome callback
    pub fn shutdown(&mut self) {
        self.targets.clear();
        self.projectiles.clear();
        self.scheduler.clear();
        self.feedback = None;
        self.on_outcome = None;
        self.phase = SessionPhase::Closed;
        log::info!("Quiz session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pairs() -> Vec<Pair> {
        vec![
            Pair::new("API", "Contract between software components"),
            Pair::new("REST", "Stateless architectural style over HTTP"),
            Pair::new("JSON", "Lightweight text data format"),
            Pair::new("HTTP", "Request/response protocol of the web"),
        ]
    }

    fn session() -> Session {
        Session::new(pairs(), Settings::default(), 42, |_| {}).expect("valid session")
    }

    #[test]
    fn test_new_spawns_first_round() {
        let s = session();
        assert_eq!(s.phase(), SessionPhase::AwaitingShot);
        assert_eq!(s.round_index(), 0);
        assert_eq!(s.targets().len(), 4);
        assert_eq!(s.rounds_spawned(), 1);
        assert_eq!(s.term_prompt(), "Match: \"API\"");
        assert_eq!(s.score_text(), "Score: 0 / 4");
    }

    #[test]
    fn test_refuses_three_pairs() {
        let mut short = pairs();
        short.pop();
        let err = Session::new(short, Settings::default(), 1, |_| {}).unwrap_err();
        assert!(matches!(err, crate::QuizError::InsufficientData { found: 3, .. }));
    }

    #[test]
    fn test_wrong_hit_ends_round_without_score() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut s = Session::new(pairs(), Settings::default(), 9, move |o| {
            sink.borrow_mut().push((o.definition.to_string(), o.correct));
        })
        .expect("valid session");

        let wrong = s.targets().iter().find(|t| !t.correct).map(|t| t.id).expect("distractor");
        let shot = s.fire().expect("pool has room");
        let res = s.resolve_hit(shot, wrong).expect("resolves");

        assert!(!res.correct);
        assert_eq!(res.next_round, Some(1));
        assert_eq!(s.score(), 0);
        assert_eq!(s.round_index(), 1);
        assert_eq!(s.phase(), SessionPhase::Resolving);
        assert!(s.targets().is_empty());
        assert_eq!(s.projectiles().active_count(), 0);
        assert_eq!(seen.borrow().len(), 1);
        assert!(!seen.borrow()[0].1);
        assert_eq!(s.feedback().map(|f| f.message()), Some("✗ Wrong! Moving to next..."));
    }

    #[test]
    fn test_second_overlap_same_round_is_ignored() {
        let mut s = session();
        let ids: Vec<u32> = s.targets().iter().map(|t| t.id).collect();
        let a = s.fire().expect("shot a");
        let b = s.fire().expect("shot b");
        assert!(s.resolve_hit(a, ids[0]).is_some());
        assert!(s.resolve_hit(b, ids[1]).is_none());
        assert_eq!(s.round_index(), 1);
        // Second projectile survives, it just didn't resolve anything
        assert_eq!(s.projectiles().active_count(), 1);
    }

    #[test]
    fn test_restart_resets_to_round_zero() {
        let mut s = session();
        let t = s.targets().iter().find(|t| t.correct).map(|t| t.id).expect("correct");
        let p = s.fire().expect("shot");
        s.resolve_hit(p, t);
        assert_eq!(s.score(), 1);

        s.restart(77);
        assert_eq!(s.score(), 0);
        assert_eq!(s.round_index(), 0);
        assert_eq!(s.phase(), SessionPhase::AwaitingShot);
        assert_eq!(s.targets().len(), 4);
        assert_eq!(s.pending_actions(), 0);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        let mut s = Session::new(pairs(), Settings::default(), 5, move |_| {
            *sink.borrow_mut() += 1;
        })
        .expect("valid session");
        s.fire();
        s.shutdown();

        assert_eq!(s.phase(), SessionPhase::Closed);
        assert!(s.targets().is_empty());
        assert_eq!(s.projectiles().active_count(), 0);
        assert_eq!(s.pending_actions(), 0);
        assert!(s.fire().is_none());
        assert!(s.resolve_hit(1, 1).is_none());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_restart_after_shutdown_stays_closed() {
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        let mut s = Session::new(pairs(), Settings::default(), 12, move |_| {
            *sink.borrow_mut() += 1;
        })
        .expect("valid session");
        s.shutdown();
        s.restart(5);

        assert_eq!(s.phase(), SessionPhase::Closed);
        assert!(s.targets().is_empty());
        assert_eq!(s.rounds_spawned(), 1);
        assert!(s.fire().is_none());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_targets_and_projectiles_share_id_sequence() {
        let mut s = session();
        let mut ids: Vec<u32> = s.targets().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        ids.push(s.fire().expect("shot"));
        assert_eq!(ids[4], 5);
        assert_eq!(s.next_entity_id(), 6);
    }

    #[test]
    fn test_summary_display() {
        let summary = SessionSummary { score: 3, total: 4 };
        assert_eq!(summary.to_string(), "Final Score: 3 / 4");
    }
}
