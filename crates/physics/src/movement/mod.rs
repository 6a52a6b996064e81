//! Platformer movement for a single kinematic controller.
//!
//! This module implements:
//!
//! - Run smoothing with separate ground and air rates
//! - Gravity and multi-plane collision sliding
//! - Ground and wall classification each frame
//! - A jump chain (single/double/triple), long jump and wall jump
//! - A cosmetic scale pulse on the third chained jump
//!
//! # Design
//!
//! Movement is controlled by the [`CharacterController`] which takes a
//! [`ControlInput`] and updates its [`ControllerState`] against anything
//! implementing [`CollisionQuery`](crate::collision::CollisionQuery).
//!
//! All movement is deterministic: the same inputs and frame deltas always
//! produce the same states.

mod config;
mod controller;
mod integrator;
mod jump;
mod pulse;
mod state;

pub use config::{MovementConfig, WallSlideClamp};
pub use controller::CharacterController;
pub use integrator::{clip_velocity, integrate, slide_move, SlideOutcome};
pub use jump::{try_jump, JumpChain, JumpKind};
pub use pulse::ScalePulse;
pub use state::{
    ControlInput, ControllerEvent, ControllerState, ControllerView, FrameReport, MovementPhase,
    WallContact,
};
