//! Player input handling.
//!
//! Converts raw key states into a [`ControlInput`] for the controller.
//! Jump, interact and restart fire on the frame the key goes down; holding
//! a key never repeats them.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use skyhop_physics::ControlInput;

/// Raw player input for a single frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInput {
    /// Movement keys held.
    pub movement: MovementInput,

    /// Mouse delta this frame (pixels).
    pub mouse_delta: (f32, f32),

    /// Action keys held.
    pub actions: ActionInput,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action key states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInput {
    pub jump: bool,
    /// Long jump modifier (shift).
    pub long_jump: bool,
    /// Enter a portal (E).
    pub interact: bool,
    /// Return to the hub (R).
    pub restart: bool,
}

impl RawInput {
    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.movement.forward || self.movement.backward || self.movement.left || self.movement.right
    }

    /// Movement axis from the held keys: x = right, y = forward.
    pub fn move_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.movement.forward {
            axis.y += 1.0;
        }
        if self.movement.backward {
            axis.y -= 1.0;
        }
        if self.movement.right {
            axis.x += 1.0;
        }
        if self.movement.left {
            axis.x -= 1.0;
        }

        // Normalize diagonal movement
        if axis.length_squared() > 1.0 {
            axis = axis.normalize();
        }
        axis
    }
}

/// Controller input plus the edges the frame driver handles itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub control: ControlInput,
    pub restart_pressed: bool,
}

/// Tracks the previous frame's keys and the accumulated camera yaw.
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    previous: ActionInput,
    yaw: f32,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera yaw in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    /// Map one frame of raw input.
    ///
    /// # Arguments
    ///
    /// * `mouse_sensitivity` - Milliradians of yaw per pixel of mouse motion
    pub fn map(&mut self, raw: &RawInput, mouse_sensitivity: f32) -> FrameInput {
        self.yaw = (self.yaw + raw.mouse_delta.0 * mouse_sensitivity * 0.001)
            .rem_euclid(std::f32::consts::TAU);

        let now = raw.actions;
        let before = std::mem::replace(&mut self.previous, now);

        FrameInput {
            control: ControlInput {
                move_axis: raw.move_axis(),
                yaw: self.yaw,
                jump_pressed: now.jump && !before.jump,
                long_jump_held: now.long_jump,
                interact_pressed: now.interact && !before.interact,
            },
            restart_pressed: now.restart && !before.restart,
        }
    }
}
