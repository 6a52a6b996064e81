//! Controller state, per-frame input and the published view.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::{BrushId, SurfaceFlags};

use super::jump::{JumpChain, JumpKind};
use super::pulse::ScalePulse;

/// A wall the controller is touching while airborne.
///
/// Set by the integrator's side probe, consumed by at most one wall jump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallContact {
    /// Surface normal of the wall, pointing away from it.
    pub normal: Vec3,
    /// Brush the probe touched.
    pub brush: BrushId,
}

/// High-level phase derived from the kinematic state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementPhase {
    /// Standing or running on walkable ground.
    Grounded,
    /// In the air with no wall to jump from.
    Airborne,
    /// In the air and touching a wall.
    WallClinging,
}

/// Complete kinematic state of the controller.
///
/// Owned exclusively by its [`CharacterController`](super::CharacterController);
/// other entities only ever see a [`ControllerView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerState {
    /// Centre of the collision shape in world space.
    pub position: Vec3,

    /// Velocity in world space (meters/second).
    pub velocity: Vec3,

    /// Whether the last ground probe found walkable ground.
    pub grounded: bool,

    /// Ground surface normal (valid while grounded).
    pub ground_normal: Vec3,

    /// Surface flags of the ground (empty while airborne).
    pub ground_surface: SurfaceFlags,

    /// Wall touched by the last side probe, if any.
    pub wall_contact: Option<WallContact>,

    /// Seconds since the controller last left the ground.
    pub airborne_time: f32,

    /// Jump chain counter and timer.
    pub chain: JumpChain,

    /// Cosmetic triple-jump scale pulse.
    pub pulse: ScalePulse,
}

impl ControllerState {
    /// Create a new state at the given position, airborne and at rest.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            grounded: false,
            ground_normal: Vec3::Y,
            ground_surface: SurfaceFlags::NONE,
            wall_contact: None,
            airborne_time: 0.0,
            chain: JumpChain::default(),
            pulse: ScalePulse::default(),
        }
    }

    /// Current phase as seen by the jump state machine.
    pub fn phase(&self) -> MovementPhase {
        if self.grounded {
            MovementPhase::Grounded
        } else if self.wall_contact.is_some() {
            MovementPhase::WallClinging
        } else {
            MovementPhase::Airborne
        }
    }

    /// Get current horizontal (XZ) speed.
    pub fn horizontal_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }

    /// Unit direction of horizontal travel, zero when standing still.
    pub fn horizontal_direction(&self) -> Vec3 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).normalize_or_zero()
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// Input for a single frame.
///
/// Directions are held state; `jump_pressed` and `interact_pressed` are
/// edges, true only on the frame the button went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    /// Movement axis: x = right, y = forward, each in -1.0..=1.0.
    pub move_axis: Vec2,

    /// Camera yaw in radians; movement is relative to it.
    pub yaw: f32,

    /// Jump went down this frame.
    pub jump_pressed: bool,

    /// Long jump modifier is held.
    pub long_jump_held: bool,

    /// Interact went down this frame.
    pub interact_pressed: bool,
}

impl ControlInput {
    /// Horizontal forward direction for the camera yaw.
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_yaw, 0.0, sin_yaw)
    }

    /// Horizontal right direction for the camera yaw.
    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(-sin_yaw, 0.0, cos_yaw)
    }

    /// World-space desired direction scaled by stick deflection (length <= 1).
    ///
    /// A centred stick yields `Vec3::ZERO`.
    pub fn wish_direction(&self) -> Vec3 {
        let wish = self.forward() * self.move_axis.y + self.right() * self.move_axis.x;
        let magnitude = wish.length().min(1.0);
        wish.normalize_or_zero() * magnitude
    }
}

/// Things that happened during a controller update, for cosmetic listeners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ControllerEvent {
    /// A jump transition fired.
    Jumped(JumpKind),
    /// Touched down after being airborne.
    Landed {
        /// Seconds spent in the air.
        airborne_time: f32,
    },
    /// Walked off an edge without jumping.
    LeftGround,
    /// Started touching a wall while airborne.
    WallTouched,
    /// Position and velocity were reset to the spawn point.
    Respawned,
}

/// Result of one controller update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Events in the order they happened.
    pub events: Vec<ControllerEvent>,
}

impl FrameReport {
    /// The jump fired this frame, if any.
    pub fn jump(&self) -> Option<JumpKind> {
        self.events.iter().find_map(|event| match event {
            ControllerEvent::Jumped(kind) => Some(*kind),
            _ => None,
        })
    }

    /// Whether the controller respawned this frame.
    pub fn respawned(&self) -> bool {
        self.events.contains(&ControllerEvent::Respawned)
    }
}

/// Read-only snapshot published to the camera, UI, audio and other entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerView {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    pub touching_wall: bool,
    pub chain_count: u8,
    pub airborne_time: f32,
    /// Visual scale multiplier from the triple-jump pulse. Never affects collision.
    pub scale_factor: f32,
}
