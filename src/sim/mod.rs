//! Deterministic quiz simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order for targets, slot order for projectiles)
//! - No rendering or platform dependencies

pub mod collision;
pub mod distractor;
pub mod pairs;
pub mod projectile;
pub mod state;
pub mod target;
pub mod tick;
pub mod timer;

pub use collision::{Aabb, CollisionResult, circle_aabb_collision};
pub use distractor::{pick_distractors, shuffle};
pub use pairs::{Pair, PairSet};
pub use projectile::{Projectile, ProjectilePool, Turret};
pub use state::{
    Feedback, OutcomeCallback, Resolution, Session, SessionPhase, SessionSummary, ShotOutcome,
};
pub use target::{Candidate, Label, Round, Target, TargetLifecycle, spawn_targets};
pub use tick::{TickEvents, TickInput, tick};
pub use timer::{DeferredAction, Scheduler};
