//! Skyhop Physics
//!
//! A kinematic character controller for a single capsule moving through a
//! static world: swept-shape collision, slide resolution and a platformer
//! jump chain (single/double/triple, long jump, wall jump).
//!
//! # Architecture
//!
//! The crate is split into two systems:
//!
//! - **Collision**: Sweeps capsules/boxes through the world, returns the nearest hit
//! - **Movement**: Uses collision casts to integrate the controller each frame
//!
//! ```text
//! input ──► JumpChain ──► MovementIntegrator ──► ControllerView
//!              ▲                 │
//!              └── previous ─────┘
//!                  frame's ground/wall classification
//! ```
//!
//! The jump chain reads the classification produced by the *previous*
//! frame's integrator pass. That one frame of latency is part of the
//! contract and is covered by tests.

pub mod collision;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    BrushId, CollisionQuery, CollisionWorld, ContentFlags, ExcludeSet, ShapeHit, SurfaceFlags,
    TraceShape,
};
pub use movement::{
    CharacterController, ControlInput, ControllerEvent, ControllerState, ControllerView,
    FrameReport, JumpChain, JumpKind, MovementConfig, MovementPhase, WallContact, WallSlideClamp,
};
