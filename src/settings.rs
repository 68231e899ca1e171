//! Game tuning and preferences
//!
//! Persisted in LocalStorage on the web; native builds always use defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// Quiz tuning (all distances in field pixels, times in milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Targets ===
    pub target_width: f32,
    pub target_height: f32,
    /// Downward speed (px/s)
    pub target_speed: f32,
    /// Horizontal velocity is drawn from [-jitter, jitter]
    pub target_jitter: f32,
    /// Horizontal cadence between spawned targets
    pub target_spacing: f32,
    pub target_start_x: f32,
    pub spawn_y_min: f32,
    pub spawn_y_max: f32,
    pub wrap_margin: f32,
    pub wrap_inset: f32,
    /// Distractors per round (correct + this many candidates)
    pub distractor_count: usize,

    // === Projectiles ===
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_lifetime_ms: f64,
    pub pool_capacity: usize,
    pub cull_margin: f32,

    // === Turret ===
    pub turret_offset: f32,

    // === Pacing ===
    pub round_delay_ms: f64,
    pub feedback_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            target_width: TARGET_WIDTH,
            target_height: TARGET_HEIGHT,
            target_speed: TARGET_SPEED,
            target_jitter: TARGET_JITTER,
            target_spacing: TARGET_SPACING,
            target_start_x: TARGET_START_X,
            spawn_y_min: SPAWN_Y_MIN,
            spawn_y_max: SPAWN_Y_MAX,
            wrap_margin: WRAP_MARGIN,
            wrap_inset: WRAP_INSET,
            distractor_count: DISTRACTOR_COUNT,

            projectile_speed: PROJECTILE_SPEED,
            projectile_radius: PROJECTILE_RADIUS,
            projectile_lifetime_ms: PROJECTILE_LIFETIME_MS,
            pool_capacity: PROJECTILE_POOL_CAPACITY,
            cull_margin: PROJECTILE_CULL_MARGIN,

            turret_offset: TURRET_OFFSET,

            round_delay_ms: ROUND_DELAY_MS,
            feedback_ms: FEEDBACK_MS,
        }
    }
}

impl Settings {
    /// Parse settings JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "match_blaster_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"pool_capacity": 10, "target_speed": 45.0}"#)
            .expect("valid json");
        assert_eq!(settings.pool_capacity, 10);
        assert_eq!(settings.target_speed, 45.0);
        assert_eq!(settings.field_width, FIELD_WIDTH);
        assert_eq!(settings.distractor_count, 3);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(Settings::from_json("{not json").is_err());
    }
}
