//! Jump chain state machine.
//!
//! Jumps are driven by discrete "jump pressed" edges, never by a held
//! button. From the ground the machine picks one of three transitions:
//!
//! 1. **Long jump** - modifier held and running faster than
//!    `long_jump_min_speed`. Never chains; resets the chain to 0.
//! 2. **Chain jump** - running faster than `chain_min_speed`. Each jump
//!    within `chain_window` of the previous jump or landing advances the
//!    chain (1 → 2 → 3) with strictly increasing force. A fourth attempt
//!    while the chain is saturated does nothing.
//! 3. **Plain jump** - anything slower. Base force, chain set to 1.
//!
//! In the air only a valid wall contact allows a jump. The contact is taken
//! out of the state when consumed, so it can never be read twice.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::config::MovementConfig;
use super::state::ControllerState;

/// Which transition a jump request produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    /// Chain stage 1, 2 or 3.
    Chain(u8),
    /// Slow jump at base force.
    Plain,
    /// Running long jump.
    Long,
    /// Kick off a wall.
    Wall,
}

/// Chain counter and timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JumpChain {
    /// Chained jumps since the window last expired, in `0..=3`.
    count: u8,

    /// Seconds since the last jump or landing.
    timer: f32,
}

impl JumpChain {
    /// Highest chain stage.
    pub const MAX_CHAIN: u8 = 3;

    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current chain count.
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Seconds since the last jump or landing.
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Advance the timer. A grounded controller whose window has run out
    /// loses its chain before any jump is evaluated this frame.
    pub fn tick(&mut self, delta_time: f32, grounded: bool, chain_window: f32) {
        self.timer += delta_time;
        if grounded && self.timer > chain_window && self.count != 0 {
            log::debug!("jump chain timed out at {}", self.count);
            self.count = 0;
        }
    }

    /// Touching down restarts the chain window.
    pub fn on_landed(&mut self) {
        self.timer = 0.0;
    }

    /// Forget the chain entirely (respawn).
    pub fn reset(&mut self) {
        self.count = 0;
        self.timer = 0.0;
    }

    fn within_window(&self, chain_window: f32) -> bool {
        self.timer <= chain_window
    }
}

/// Evaluate a jump request against the current state.
///
/// Reads the grounded and wall classification left by the previous
/// integrator pass. On success the state's velocity, chain and grounded
/// flag are updated and the transition is returned; otherwise nothing
/// changes.
pub fn try_jump(
    state: &mut ControllerState,
    long_jump_held: bool,
    config: &MovementConfig,
) -> Option<JumpKind> {
    let kind = if state.grounded {
        ground_jump(state, long_jump_held, config)?
    } else {
        wall_jump(state, config)?
    };

    // Leave the ground now so the integrator doesn't clamp the jump away
    state.grounded = false;
    state.wall_contact = None;
    state.chain.timer = 0.0;

    log::debug!(
        "jump {:?}: chain={} vy={:.2}",
        kind,
        state.chain.count,
        state.velocity.y
    );

    Some(kind)
}

fn ground_jump(
    state: &mut ControllerState,
    long_jump_held: bool,
    config: &MovementConfig,
) -> Option<JumpKind> {
    let speed = state.horizontal_speed();

    if long_jump_held && speed > config.long_jump_min_speed {
        let heading = state.horizontal_direction();
        state.velocity.y = config.long_jump_vertical;
        state.velocity += heading * config.long_jump_forward_boost;
        state.chain.count = 0;
        return Some(JumpKind::Long);
    }

    if !state.chain.within_window(config.chain_window) {
        state.chain.count = 0;
    }

    if speed > config.chain_min_speed {
        if state.chain.count >= JumpChain::MAX_CHAIN {
            log::debug!("jump rejected: chain saturated");
            return None;
        }
        state.chain.count += 1;
        state.velocity.y = config.chain_jump_velocity(state.chain.count);
        return Some(JumpKind::Chain(state.chain.count));
    }

    state.chain.count = 1;
    state.velocity.y = config.jump_force;
    Some(JumpKind::Plain)
}

fn wall_jump(state: &mut ControllerState, config: &MovementConfig) -> Option<JumpKind> {
    let contact = state.wall_contact.take()?;

    let away = Vec3::new(contact.normal.x, 0.0, contact.normal.z).normalize_or_zero();
    state.velocity.y = config.wall_jump_force;
    state.velocity += away * config.wall_jump_kickoff;
    state.chain.count = 1;

    Some(JumpKind::Wall)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::state::WallContact;

    const FRAME: f32 = 1.0 / 60.0;

    fn running_state(config: &MovementConfig) -> ControllerState {
        let mut state = ControllerState::new(Vec3::new(0.0, 0.9, 0.0));
        state.grounded = true;
        state.velocity = Vec3::new(config.chain_min_speed + 1.0, 0.0, 0.0);
        state
    }

    /// Put the controller back on the ground after `seconds`, keeping its run.
    fn land_after(state: &mut ControllerState, seconds: f32, config: &MovementConfig) {
        state.chain.tick(seconds, true, config.chain_window);
        state.grounded = true;
        state.velocity.y = 0.0;
    }

    #[test]
    fn test_triple_jump_sequence() {
        let config = MovementConfig::default();
        let mut state = running_state(&config);

        let mut counts = Vec::new();
        let mut velocities = Vec::new();

        for i in 0..3 {
            if i > 0 {
                land_after(&mut state, 0.1, &config);
            }
            let kind = try_jump(&mut state, false, &config);
            assert!(matches!(kind, Some(JumpKind::Chain(_))));
            counts.push(state.chain.count());
            velocities.push(state.velocity.y);
        }

        assert_eq!(counts, vec![1, 2, 3]);
        assert_eq!(velocities[0], config.jump_force * 1.0);
        assert_eq!(velocities[1], config.jump_force * 1.2);
        assert_eq!(velocities[2], config.jump_force * 1.5);
        assert!(velocities[0] < velocities[1] && velocities[1] < velocities[2]);
    }

    #[test]
    fn test_fourth_chained_jump_has_no_effect() {
        let config = MovementConfig::default();
        let mut state = running_state(&config);

        for i in 0..3 {
            if i > 0 {
                land_after(&mut state, 0.1, &config);
            }
            try_jump(&mut state, false, &config);
        }

        land_after(&mut state, 0.1, &config);
        let before = state.clone();

        assert_eq!(try_jump(&mut state, false, &config), None);
        assert!(state.grounded, "rejected jump must not leave the ground");
        assert_eq!(state.velocity, before.velocity);
        assert_eq!(state.chain.count(), 3);
    }

    #[test]
    fn test_chain_times_out_while_grounded() {
        let config = MovementConfig::default();
        let mut state = running_state(&config);

        try_jump(&mut state, false, &config);
        land_after(&mut state, 0.1, &config);
        try_jump(&mut state, false, &config);
        assert_eq!(state.chain.count(), 2);

        // Stand on the ground past the window without jumping
        land_after(&mut state, 0.0, &config);
        state.chain.tick(config.chain_window + 0.05, true, config.chain_window);
        assert_eq!(state.chain.count(), 0);

        // The next jump starts a fresh chain
        assert_eq!(try_jump(&mut state, false, &config), Some(JumpKind::Chain(1)));
        assert_eq!(state.velocity.y, config.chain_jump_velocity(1));
    }

    #[test]
    fn test_chain_does_not_time_out_in_the_air() {
        let config = MovementConfig::default();
        let mut chain = JumpChain { count: 2, timer: 0.0 };

        chain.tick(config.chain_window * 3.0, false, config.chain_window);
        assert_eq!(chain.count(), 2);

        chain.on_landed();
        assert_eq!(chain.timer(), 0.0);
    }

    #[test]
    fn test_long_jump_resets_chain() {
        let config = MovementConfig::default();
        let mut state = running_state(&config);

        try_jump(&mut state, false, &config);
        land_after(&mut state, 0.1, &config);
        assert_eq!(state.chain.count(), 1);

        let speed_before = state.horizontal_speed();
        assert_eq!(try_jump(&mut state, true, &config), Some(JumpKind::Long));
        assert_eq!(state.chain.count(), 0);
        assert_eq!(state.velocity.y, config.long_jump_vertical);
        assert!((state.horizontal_speed() - (speed_before + config.long_jump_forward_boost)).abs() < 0.001);
        assert!(!state.grounded);
    }

    #[test]
    fn test_long_jump_takes_priority_over_chain() {
        let config = MovementConfig::default();
        let mut state = running_state(&config);

        // Fast enough for both; modifier held picks the long jump
        assert_eq!(try_jump(&mut state, true, &config), Some(JumpKind::Long));
    }

    #[test]
    fn test_long_jump_needs_speed() {
        let config = MovementConfig::default();
        let mut state = running_state(&config);
        state.velocity = Vec3::new(config.long_jump_min_speed - 1.0, 0.0, 0.0);

        assert_eq!(try_jump(&mut state, true, &config), Some(JumpKind::Plain));
        assert_eq!(state.chain.count(), 1);
    }

    #[test]
    fn test_plain_jump_when_slow() {
        let config = MovementConfig::default();
        let mut state = running_state(&config);
        state.velocity = Vec3::ZERO;

        assert_eq!(try_jump(&mut state, false, &config), Some(JumpKind::Plain));
        assert_eq!(state.velocity.y, config.jump_force);
        assert_eq!(state.chain.count(), 1);
        assert!(!state.grounded);
    }

    #[test]
    fn test_airborne_without_wall_cannot_jump() {
        let config = MovementConfig::default();
        let mut state = ControllerState::new(Vec3::new(0.0, 5.0, 0.0));
        state.velocity = Vec3::new(2.0, -4.0, 0.0);

        assert_eq!(try_jump(&mut state, false, &config), None);
        assert_eq!(state.velocity, Vec3::new(2.0, -4.0, 0.0));
    }

    #[test]
    fn test_wall_jump_consumes_contact() {
        let config = MovementConfig::default();
        let mut state = ControllerState::new(Vec3::new(0.0, 5.0, 0.0));
        state.velocity = Vec3::new(0.0, -3.0, 0.0);
        state.wall_contact = Some(WallContact { normal: Vec3::NEG_X, brush: 7 });

        assert_eq!(try_jump(&mut state, false, &config), Some(JumpKind::Wall));
        assert_eq!(state.velocity.y, config.wall_jump_force);
        assert!((state.velocity.x + config.wall_jump_kickoff).abs() < 0.001);
        assert!(state.wall_contact.is_none());
        assert_eq!(state.chain.count(), 1);

        // Immediate second press: the contact is gone
        let after_first = state.velocity;
        assert_eq!(try_jump(&mut state, false, &config), None);
        assert_eq!(state.velocity, after_first);
    }

    #[test]
    fn test_jump_resets_timer() {
        let config = MovementConfig::default();
        let mut state = running_state(&config);
        state.chain.tick(0.3, true, config.chain_window);

        try_jump(&mut state, false, &config);
        assert_eq!(state.chain.timer(), 0.0);

        state.chain.tick(FRAME, false, config.chain_window);
        assert!((state.chain.timer() - FRAME).abs() < 1e-6);
    }
}
