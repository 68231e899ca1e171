//! Match Blaster - a match-the-following shooting quiz
//!
//! Core modules:
//! - `sim`: Deterministic quiz session (rounds, targets, projectiles, collisions)
//! - `worksheet`: Persistent term/definition sheet and its recorded connections
//! - `renderer`: Draw surface abstraction, connection lines and the play field
//! - `settings`: Data-driven game tuning

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod worksheet;

pub use error::QuizError;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz frame loop)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// A round needs 1 correct definition + 3 distractors
    pub const MIN_PAIRS: usize = 4;
    pub const DISTRACTOR_COUNT: usize = 3;

    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Target defaults (boxes carrying a definition label)
    pub const TARGET_WIDTH: f32 = 140.0;
    pub const TARGET_HEIGHT: f32 = 80.0;
    pub const TARGET_SPEED: f32 = 30.0;
    pub const TARGET_JITTER: f32 = 30.0;
    pub const TARGET_SPACING: f32 = 180.0;
    pub const TARGET_START_X: f32 = 100.0;
    /// Targets spawn this far above the field (y range)
    pub const SPAWN_Y_MIN: f32 = -100.0;
    pub const SPAWN_Y_MAX: f32 = -50.0;
    /// Distance below the field before a target wraps back to the top
    pub const WRAP_MARGIN: f32 = 100.0;
    /// Horizontal inset for wrapped targets
    pub const WRAP_INSET: f32 = 100.0;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 500.0;
    pub const PROJECTILE_RADIUS: f32 = 6.0;
    pub const PROJECTILE_LIFETIME_MS: f64 = 3000.0;
    pub const PROJECTILE_POOL_CAPACITY: usize = 50;
    pub const PROJECTILE_CULL_MARGIN: f32 = 50.0;

    /// Turret sits this far above the bottom edge
    pub const TURRET_OFFSET: f32 = 80.0;

    /// Pause between a resolved shot and the next round's spawn
    pub const ROUND_DELAY_MS: f64 = 1000.0;
    /// How long hit feedback stays visible (fade in + hold + fade out)
    pub const FEEDBACK_MS: f64 = 1200.0;
}

/// Unit vector for an angle (radians, screen space: +y is down)
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle from `from` toward `to` (radians, screen space)
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
