//! Collision queries for the character controller.
//!
//! This module provides world collision testing using capsule and box shapes.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: The collision environment containing all level geometry
//! - [`CollisionQuery`]: The read-only cast interface the integrator depends on
//! - [`ShapeHit`]: Output from a swept-shape cast
//! - [`TraceShape`]: Shape used for casting (capsule, box or point)
//!
//! # Casting
//!
//! A cast sweeps a shape from an origin along a unit direction and reports
//! the nearest surface it would touch:
//! - How far the shape traveled before contact
//! - The contact point on the world surface
//! - Surface normal at the contact
//! - Content flags and brush id of what was hit

mod flags;
mod query;
mod trace;
mod world;

pub use flags::{ContentFlags, SurfaceFlags};
pub use query::{CollisionQuery, ExcludeSet};
pub use trace::{ShapeHit, TraceShape};
pub use world::{BrushId, CollisionBrush, CollisionWorld};
