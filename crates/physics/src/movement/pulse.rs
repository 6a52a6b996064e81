//! Triple-jump scale pulse.
//!
//! Purely cosmetic: the factor is published for rendering and never feeds
//! the collision shape. The pulse always ends at exactly `1.0`, whether it
//! runs to completion or is cancelled.

use serde::{Deserialize, Serialize};

use super::config::MovementConfig;

/// A time-bounded grow-then-shrink animation of the visual scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalePulse {
    /// Seconds since the pulse started, `None` when idle.
    elapsed: Option<f32>,
}

impl ScalePulse {
    /// Start (or restart) the pulse.
    pub fn start(&mut self) {
        self.elapsed = Some(0.0);
    }

    /// Stop the pulse and restore the original scale.
    pub fn cancel(&mut self) {
        self.elapsed = None;
    }

    /// Whether the pulse is running.
    pub fn is_active(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Advance the animation, finishing it once both phases have elapsed.
    pub fn advance(&mut self, delta_time: f32, config: &MovementConfig) {
        if let Some(elapsed) = self.elapsed.as_mut() {
            *elapsed += delta_time;
            if *elapsed >= config.pulse_rise_time + config.pulse_fall_time {
                self.elapsed = None;
            }
        }
    }

    /// Current visual scale multiplier.
    pub fn factor(&self, config: &MovementConfig) -> f32 {
        let Some(elapsed) = self.elapsed else {
            return 1.0;
        };
        let peak = config.pulse_peak_scale;

        if elapsed < config.pulse_rise_time {
            // Ease out toward the peak
            let t = elapsed / config.pulse_rise_time;
            let eased = 1.0 - (1.0 - t) * (1.0 - t);
            1.0 + (peak - 1.0) * eased
        } else {
            // Ease in back to rest
            let t = ((elapsed - config.pulse_rise_time) / config.pulse_fall_time.max(f32::EPSILON)).min(1.0);
            peak + (1.0 - peak) * t * t
        }
    }
}
