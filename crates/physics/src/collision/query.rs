//! The read-only query interface the movement code depends on.

use glam::Vec3;

use super::flags::ContentFlags;
use super::trace::{ShapeHit, TraceShape};
use super::world::BrushId;

/// Brushes a cast must ignore, typically the caster's own collider.
pub type ExcludeSet<'a> = &'a [BrushId];

/// Swept-shape queries against level geometry.
///
/// Implementations are stateless per call and must not mutate anything:
/// the same query against the same geometry always returns the same hit.
pub trait CollisionQuery {
    /// Sweep `shape` from `origin` along `direction` for up to `max_distance`.
    ///
    /// `direction` is normalized internally; a zero direction never hits.
    /// Returns the nearest hit on a brush whose contents intersect `mask`
    /// and whose id is not in `exclude`.
    fn cast_shape(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        shape: TraceShape,
        mask: ContentFlags,
        exclude: ExcludeSet<'_>,
    ) -> Option<ShapeHit>;
}
