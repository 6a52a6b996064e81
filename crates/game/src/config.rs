//! Simulation configuration.

use serde::{Deserialize, Serialize};
use skyhop_physics::MovementConfig;

use crate::error::{GameError, GameResult};

/// Game simulation configuration.
///
/// Every field has a default, so a tuning file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Movement physics configuration.
    pub movement: MovementConfig,

    /// Mouse sensitivity (milliradians of yaw per pixel).
    pub mouse_sensitivity: f32,

    /// Seed for hazard patrol choices.
    pub seed: u64,

    /// Horizontal distance at which a star is picked up.
    pub star_pickup_radius: f32,

    /// Vertical distance at which a star is picked up.
    pub star_pickup_height: f32,

    /// Seconds between collecting a star and removing it.
    pub star_removal_delay: f32,

    /// Upward speed given to the player after stomping a hazard.
    pub stomp_bounce_speed: f32,

    /// Seconds between defeating a hazard and removing it.
    pub hazard_removal_delay: f32,

    /// Seconds an instruction notice stays up.
    pub notice_duration: f32,

    /// Seconds the hub welcome notice stays up.
    pub welcome_duration: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            movement: MovementConfig::default(),
            mouse_sensitivity: 2.0,
            seed: 0x5eed,
            star_pickup_radius: 1.2,
            star_pickup_height: 2.0,
            star_removal_delay: 1.0,
            stomp_bounce_speed: 8.0,
            hazard_removal_delay: 0.3,
            notice_duration: 2.0,
            welcome_duration: 5.0,
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON tuning file, filling missing fields with defaults.
    pub fn from_json_str(json: &str) -> GameResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> GameResult<()> {
        if self.tick_rate == 0 {
            return Err(GameError::InvalidValue {
                field: "tick_rate",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.movement.max_frame_delta <= 0.0 {
            return Err(GameError::InvalidValue {
                field: "movement.max_frame_delta",
                reason: format!("must be positive, got {}", self.movement.max_frame_delta),
            });
        }
        if self.movement.chain_window < 0.0 {
            return Err(GameError::InvalidValue {
                field: "movement.chain_window",
                reason: format!("must not be negative, got {}", self.movement.chain_window),
            });
        }
        Ok(())
    }

    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}
