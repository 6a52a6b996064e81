//! Collision world containing all static level geometry.
//!
//! The collision world stores collidable brushes and answers swept-shape
//! and ray queries against them. A world is built once per level and then
//! only read; level transitions replace the whole world.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{self, Ray, ShapeCastOptions};
use parry3d::shape::SharedShape;

use super::flags::{ContentFlags, SurfaceFlags};
use super::query::{CollisionQuery, ExcludeSet};
use super::trace::{ShapeHit, TraceShape};

/// Stable identifier of a brush within one world.
pub type BrushId = u32;

/// A cast is only blocked by surfaces it moves into. Anything flatter than
/// this (in cosine between direction and normal) counts as sliding along.
const APPROACH_EPSILON: f32 = 1.0e-3;

/// Gap left between a resolved shape and the surface it was pushed onto.
const PENETRATION_CLEARANCE: f32 = 0.01;

/// Times the resolve lift doubles before giving up.
const MAX_RESOLVE_LIFTS: usize = 4;

/// A piece of collision geometry in the world.
#[derive(Debug, Clone)]
pub struct CollisionBrush {
    /// Unique identifier for this brush.
    pub id: BrushId,
    /// The collision shape.
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub transform: Isometry<Real>,
    /// Content flags (solid, hazard clip).
    pub contents: ContentFlags,
    /// Surface flags (slick, no wall jump, ...).
    pub surface: SurfaceFlags,
}

/// The collision world containing all geometry of one level.
///
/// Supports:
/// - Box brushes (axis-aligned)
/// - Convex hull brushes
///
/// # Thread Safety
///
/// The collision world is immutable after construction and can be safely
/// shared behind an `Arc` by every entity that queries it.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    brushes: Vec<CollisionBrush>,
    next_id: BrushId,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            brushes: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `contents` - Content flags for collision filtering
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, contents: ContentFlags) -> BrushId {
        self.add_box_with_surface(center, half_extents, contents, SurfaceFlags::NONE)
    }

    /// Add an axis-aligned box with surface properties.
    pub fn add_box_with_surface(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        contents: ContentFlags,
        surface: SurfaceFlags,
    ) -> BrushId {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        let transform = Isometry::translation(center.x, center.y, center.z);
        self.push_brush(shape, transform, contents, surface)
    }

    /// Add a convex hull to the world.
    ///
    /// Returns the brush ID, or `None` if the points don't span a volume.
    pub fn add_convex_hull(&mut self, points: &[Vec3], contents: ContentFlags) -> Option<BrushId> {
        let parry_points: Vec<Point<Real>> = points.iter().map(|p| Point::new(p.x, p.y, p.z)).collect();
        let shape = SharedShape::convex_hull(&parry_points)?;
        Some(self.push_brush(shape, Isometry::identity(), contents, SurfaceFlags::NONE))
    }

    /// Get the number of collision brushes.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Iterate over all brushes.
    pub fn brushes(&self) -> impl Iterator<Item = &CollisionBrush> {
        self.brushes.iter()
    }

    /// Cast a ray (point shape) through the world.
    ///
    /// # Arguments
    ///
    /// * `origin` - Ray starting position
    /// * `direction` - Ray direction (will be normalized)
    /// * `max_distance` - Maximum cast distance
    /// * `mask` - Content flags to collide with
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ContentFlags,
        exclude: ExcludeSet<'_>,
    ) -> Option<ShapeHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );

        let mut closest: Option<ShapeHit> = None;

        for brush in self.candidates(mask, exclude) {
            let Some(toi) = brush.shape.cast_ray(&brush.transform, &ray, max_distance, true) else {
                continue;
            };
            if closest.as_ref().is_some_and(|hit| hit.distance <= toi) {
                continue;
            }

            let normal = Self::ray_normal(&ray, toi, brush);
            closest = Some(ShapeHit {
                distance: toi,
                point: origin + dir * toi,
                normal,
                contents: brush.contents,
                surface: brush.surface,
                brush: brush.id,
                started_in_solid: toi == 0.0,
            });
        }

        closest
    }

    /// Check if a shape at `position` overlaps solid geometry.
    pub fn point_in_solid(&self, position: Vec3, shape: TraceShape, mask: ContentFlags) -> bool {
        let test_shape = Self::parry_shape(shape);
        let test_transform = Self::shape_transform(position);

        self.candidates(mask, &[]).any(|brush| {
            query::intersection_test(
                &test_transform,
                test_shape.as_ref(),
                &brush.transform,
                brush.shape.as_ref(),
            )
            .unwrap_or(false)
        })
    }

    /// Resolve collision by pushing a shape out of solid geometry.
    ///
    /// The shape is lifted until it overlaps nothing, then swept back down
    /// onto the first surface below. Returns the corrected position, or
    /// `position` unchanged when it was already clear or no clear pose
    /// above it was found.
    pub fn resolve_penetration(&self, position: Vec3, shape: TraceShape, mask: ContentFlags) -> Vec3 {
        if !self.point_in_solid(position, shape, mask) {
            return position;
        }

        let mut lift = (shape.half_height() * 2.0).max(1.0);
        for _ in 0..MAX_RESOLVE_LIFTS {
            let lifted = position + Vec3::Y * lift;
            if self.point_in_solid(lifted, shape, mask) {
                lift *= 2.0;
                continue;
            }

            let settle = self
                .cast_shape(lifted, Vec3::NEG_Y, lift, shape, mask, &[])
                .map_or(0.0, |hit| (hit.distance - PENETRATION_CLEARANCE).max(0.0));
            let resolved = lifted - Vec3::Y * settle;
            log::debug!("pushed out of solid {:?} -> {:?}", position, resolved);
            return resolved;
        }

        log::warn!("no clear position above {:?}", position);
        position
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn push_brush(
        &mut self,
        shape: SharedShape,
        transform: Isometry<Real>,
        contents: ContentFlags,
        surface: SurfaceFlags,
    ) -> BrushId {
        let id = self.next_id;
        self.next_id += 1;

        self.brushes.push(CollisionBrush {
            id,
            shape,
            transform,
            contents,
            surface,
        });

        id
    }

    fn candidates<'a>(
        &'a self,
        mask: ContentFlags,
        exclude: ExcludeSet<'a>,
    ) -> impl Iterator<Item = &'a CollisionBrush> + 'a {
        self.brushes
            .iter()
            .filter(move |brush| mask.intersects(brush.contents) && !exclude.contains(&brush.id))
    }

    fn sweep(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        shape: TraceShape,
        mask: ContentFlags,
        exclude: ExcludeSet<'_>,
    ) -> Option<ShapeHit> {
        let cast_shape = Self::parry_shape(shape);
        let cast_transform = Self::shape_transform(origin);
        let velocity = Vector::new(dir.x, dir.y, dir.z);
        let at_rest = Vector::zeros();

        let mut closest: Option<ShapeHit> = None;

        for brush in self.candidates(mask, exclude) {
            // With a unit velocity, time of impact is the distance traveled.
            let result = query::cast_shapes(
                &cast_transform,
                &velocity,
                cast_shape.as_ref(),
                &brush.transform,
                &at_rest,
                brush.shape.as_ref(),
                ShapeCastOptions::with_max_time_of_impact(max_distance),
            );

            let hit = match result {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(unsupported) => {
                    log::trace!("shape cast unsupported against brush {}: {:?}", brush.id, unsupported);
                    continue;
                }
            };

            let world_normal = brush.transform.transform_vector(&hit.normal2);
            let normal = Vec3::new(world_normal.x, world_normal.y, world_normal.z).normalize_or_zero();

            // Touching a surface we are not moving into does not block.
            if normal.dot(dir) > -APPROACH_EPSILON {
                continue;
            }

            let distance = hit.time_of_impact.max(0.0);
            if closest.as_ref().is_some_and(|c| c.distance <= distance) {
                continue;
            }

            let world_point = brush.transform * hit.witness2;
            closest = Some(ShapeHit {
                distance,
                point: Vec3::new(world_point.x, world_point.y, world_point.z),
                normal,
                contents: brush.contents,
                surface: brush.surface,
                brush: brush.id,
                started_in_solid: hit.time_of_impact <= 0.0,
            });
        }

        closest
    }

    /// Create a parry3d shape from a [`TraceShape`].
    fn parry_shape(shape: TraceShape) -> SharedShape {
        match shape {
            TraceShape::Capsule { radius, height } => {
                // Parry capsules are defined by half the length of the inner segment
                let segment_half_height = (height / 2.0 - radius).max(0.0);
                SharedShape::capsule_y(segment_half_height, radius)
            }
            TraceShape::Box { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            // A tiny sphere stands in for points in overlap tests
            TraceShape::Point => SharedShape::ball(0.001),
        }
    }

    /// Shapes are centred on their position.
    fn shape_transform(position: Vec3) -> Isometry<Real> {
        Isometry::translation(position.x, position.y, position.z)
    }

    fn ray_normal(ray: &Ray, toi: f32, brush: &CollisionBrush) -> Vec3 {
        match brush
            .shape
            .cast_ray_and_get_normal(&brush.transform, ray, toi + 0.01, true)
        {
            Some(intersection) => Vec3::new(
                intersection.normal.x,
                intersection.normal.y,
                intersection.normal.z,
            ),
            None => -Vec3::new(ray.dir.x, ray.dir.y, ray.dir.z).normalize_or_zero(),
        }
    }
}

impl CollisionQuery for CollisionWorld {
    fn cast_shape(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        shape: TraceShape,
        mask: ContentFlags,
        exclude: ExcludeSet<'_>,
    ) -> Option<ShapeHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        if shape.is_point() {
            return self.raycast(origin, dir, max_distance, mask, exclude);
        }

        self.sweep(origin, dir, max_distance, shape, mask, exclude)
    }
}

// ============================================================================
// Tests
// ============================================================================
