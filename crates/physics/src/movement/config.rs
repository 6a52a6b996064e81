//! Movement configuration constants.
//!
//! All movement parameters are grouped here for easy tuning. The values
//! that differed between iterations of the game (jump chain window, wall
//! slide policy, jump force) are plain fields so a level or a tuning file
//! can pick either feel.

use serde::{Deserialize, Serialize};

use crate::collision::TraceShape;

/// How falling speed is limited while sliding down a wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WallSlideClamp {
    /// Fall speed never exceeds `max_fall_speed` (meters/second).
    Absolute { max_fall_speed: f32 },
    /// Fall speed is scaled by `factor` every frame of wall contact.
    Relative { factor: f32 },
}

impl WallSlideClamp {
    /// Apply the clamp to a downward vertical velocity.
    pub fn apply(self, vertical_velocity: f32) -> f32 {
        if vertical_velocity >= 0.0 {
            return vertical_velocity;
        }
        match self {
            Self::Absolute { max_fall_speed } => vertical_velocity.max(-max_fall_speed.abs()),
            Self::Relative { factor } => vertical_velocity * factor.clamp(0.0, 1.0),
        }
    }
}

/// Configuration for controller movement physics.
///
/// All values use metric units (meters, seconds) unless otherwise noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Body
    // ========================================================================
    /// Collision shape used by every query. Never changes at runtime.
    pub shape: TraceShape,

    // ========================================================================
    // Horizontal Movement
    // ========================================================================
    /// Target running speed (meters/second).
    pub run_speed: f32,

    /// Blend rate toward the target velocity while input is held on the ground (1/s).
    pub run_acceleration: f32,

    /// Blend rate toward rest when input is released on the ground (1/s).
    pub run_deceleration: f32,

    /// Airborne blend rate as a fraction of `run_acceleration`.
    pub air_control: f32,

    /// Blend rates on `SLICK` ground as a fraction of the normal rates.
    pub slick_control: f32,

    // ========================================================================
    // Physics
    // ========================================================================
    /// Gravity acceleration (meters/second²).
    pub gravity: f32,

    /// Largest frame time integrated in one step (seconds).
    pub max_frame_delta: f32,

    // ========================================================================
    // Jumping
    // ========================================================================
    /// Base jump velocity (meters/second).
    pub jump_force: f32,

    /// Jump force multipliers for chain stages 1, 2 and 3. Strictly increasing.
    pub chain_multipliers: [f32; 3],

    /// Time after a jump or landing during which the next jump chains (seconds).
    pub chain_window: f32,

    /// Horizontal speed required to continue a jump chain (meters/second).
    pub chain_min_speed: f32,

    /// Horizontal speed required for a long jump (meters/second).
    pub long_jump_min_speed: f32,

    /// Vertical velocity of a long jump (meters/second).
    pub long_jump_vertical: f32,

    /// Forward impulse added by a long jump (meters/second).
    pub long_jump_forward_boost: f32,

    /// Vertical velocity of a wall jump (meters/second).
    pub wall_jump_force: f32,

    /// Impulse away from the wall added by a wall jump (meters/second).
    pub wall_jump_kickoff: f32,

    /// Fall speed policy while touching a wall.
    pub wall_slide: WallSlideClamp,

    // ========================================================================
    // Triple jump pulse (cosmetic)
    // ========================================================================
    /// Peak visual scale factor of the triple-jump pulse.
    pub pulse_peak_scale: f32,

    /// Time to grow to the peak (seconds).
    pub pulse_rise_time: f32,

    /// Time to shrink back to normal (seconds).
    pub pulse_fall_time: f32,

    // ========================================================================
    // Collision
    // ========================================================================
    /// Distance kept between the shape and any surface it slides against (meters).
    pub skin_width: f32,

    /// How far below the shape the ground probe reaches (meters).
    pub ground_probe_distance: f32,

    /// How far ahead of the shape the wall probe reaches (meters).
    pub wall_probe_distance: f32,

    /// Minimum surface normal Y to be considered ground (cos of max slope angle).
    /// 0.7 ≈ 45 degrees
    pub min_ground_normal: f32,

    /// Maximum contacts resolved per frame.
    pub max_slide_iterations: usize,

    /// Overbounce factor for velocity clipping. `1.0` removes exactly the
    /// into-surface component.
    pub overbounce: f32,

    // ========================================================================
    // World bounds
    // ========================================================================
    /// Falling below this height triggers a respawn.
    pub fall_out_height: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            shape: TraceShape::PLAYER,

            run_speed: 7.0,
            run_acceleration: 10.0,
            run_deceleration: 8.0,
            air_control: 0.08,
            slick_control: 0.25,

            gravity: 30.0,
            max_frame_delta: 0.066, // ~15 FPS minimum

            jump_force: 10.0,
            chain_multipliers: [1.0, 1.2, 1.5],
            chain_window: 0.4,
            chain_min_speed: 5.0,
            long_jump_min_speed: 4.0,
            long_jump_vertical: 7.0,
            long_jump_forward_boost: 10.0,
            wall_jump_force: 9.0,
            wall_jump_kickoff: 6.0,
            wall_slide: WallSlideClamp::Absolute { max_fall_speed: 3.0 },

            pulse_peak_scale: 1.2,
            pulse_rise_time: 0.1,
            pulse_fall_time: 0.2,

            skin_width: 0.02,
            ground_probe_distance: 0.1,
            wall_probe_distance: 0.1,
            min_ground_normal: 0.7,
            max_slide_iterations: 4,
            overbounce: 1.0,

            fall_out_height: -30.0,
        }
    }
}

impl MovementConfig {
    /// The floatier feel of the first iteration: higher jumps, a generous
    /// one-second chain window and a slower run.
    pub fn classic() -> Self {
        Self {
            run_speed: 5.0,
            gravity: 25.0,
            jump_force: 12.0,
            chain_window: 1.0,
            chain_min_speed: 3.5,
            long_jump_min_speed: 3.0,
            long_jump_vertical: 9.6,
            long_jump_forward_boost: 3.0,
            wall_jump_force: 13.2,
            wall_slide: WallSlideClamp::Relative { factor: 0.9 },
            ..Default::default()
        }
    }

    /// Vertical velocity for chain stage `stage` (1-based, clamped to 1..=3).
    pub fn chain_jump_velocity(&self, stage: u8) -> f32 {
        let index = usize::from(stage.clamp(1, 3)) - 1;
        self.jump_force * self.chain_multipliers[index]
    }

    /// Run speed, optionally replaced by a per-level override.
    pub fn effective_run_speed(&self, speed_override: Option<f32>) -> f32 {
        speed_override.unwrap_or(self.run_speed)
    }
}
