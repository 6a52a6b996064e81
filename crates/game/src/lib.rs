//! Skyhop Game Logic
//!
//! This crate wraps the movement controller in a small platformer:
//!
//! - Levels (hub plus four worlds) baked into collision geometry
//! - Stars, patrolling hazards, kill planes and portals
//! - Star progress and level unlocks
//! - Input edge mapping and the per-frame driver
//!
//! # Architecture
//!
//! Entities never mutate the player. They read a snapshot and return
//! effects; the simulation applies them once every entity has run.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        Simulation::tick                        │
//! │  ┌─────────┐   ┌────────────┐   ┌──────────┐   ┌───────────┐  │
//! │  │ RawInput│──►│ Controller │──►│ Entities │──►│ Effects   │  │
//! │  │ (edges) │   │ (physics)  │   │ (snapshot│   │ schedule, │  │
//! │  └─────────┘   └────────────┘   │  only)   │   │ level swap│  │
//! │                                 └──────────┘   └───────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod arena;
pub mod config;
pub mod entity;
pub mod error;
pub mod input;
pub mod level;
pub mod notice;
pub mod progress;
pub mod schedule;
pub mod simulation;

// Re-export main types
pub use arena::{EntityArena, EntityId};
pub use config::SimulationConfig;
pub use entity::{Effect, Entity};
pub use error::{GameError, GameResult};
pub use input::{ActionInput, InputMapper, MovementInput, RawInput};
pub use level::{LevelCatalog, LevelId, LevelLayout};
pub use progress::Progress;
pub use schedule::ScheduledQueue;
pub use simulation::{Simulation, TickReport};

// Re-export physics types for convenience
pub use skyhop_physics::{
    CharacterController, CollisionWorld, ControlInput, ControllerView, JumpKind, MovementConfig,
};
