//! Cast results and shapes for collision queries.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::{ContentFlags, SurfaceFlags};
use super::world::BrushId;

/// Nearest surface reported by a swept-shape cast.
///
/// A cast that touches nothing within its maximum distance returns `None`
/// instead of a `ShapeHit`; a miss is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeHit {
    /// Distance the shape traveled along the cast direction before contact.
    ///
    /// `0.0` means the shape was already touching (or inside) the surface.
    pub distance: f32,

    /// Contact point on the world surface, in world space.
    pub point: Vec3,

    /// Unit surface normal at the contact, pointing away from the surface.
    pub normal: Vec3,

    /// Content flags of the brush that was hit.
    pub contents: ContentFlags,

    /// Surface flags of the brush that was hit.
    pub surface: SurfaceFlags,

    /// Id of the brush that was hit.
    pub brush: BrushId,

    /// Whether the shape already overlapped the brush at the cast origin.
    pub started_in_solid: bool,
}

impl ShapeHit {
    /// Whether the surface faces up enough to stand on.
    ///
    /// `threshold` is the cosine of the steepest walkable slope.
    #[inline]
    pub fn is_walkable(&self, threshold: f32) -> bool {
        self.normal.dot(Vec3::Y) > threshold
    }
}

/// Shape used for collision casts.
///
/// All shapes are centred on the cast origin:
///
/// - **Capsule**: A vertical pill shape (cylinder with hemisphere caps). Best for
///   the player as it slides over edges and slopes smoothly.
///
/// - **Box**: An axis-aligned bounding box. Matches the block-shaped player
///   of earlier iterations and is used for hazards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TraceShape {
    /// A vertical capsule (pill shape).
    ///
    /// Half the height extends above and below the origin.
    Capsule {
        /// Radius of the capsule cylinder and end caps.
        radius: f32,
        /// Total height from bottom of lower cap to top of upper cap.
        height: f32,
    },

    /// An axis-aligned bounding box.
    Box {
        /// Half-size in each axis (x, y, z).
        half_extents: Vec3,
    },

    /// A single point (infinitely small).
    ///
    /// Used for ray probes like hazard ledge checks.
    Point,
}

impl TraceShape {
    /// The player's standing capsule.
    pub const PLAYER: Self = Self::Capsule {
        radius: 0.4,  // 40cm radius
        height: 1.8,  // 180cm tall
    };

    /// Get the horizontal radius of this shape.
    pub fn radius(&self) -> f32 {
        match self {
            Self::Capsule { radius, .. } => *radius,
            Self::Box { half_extents } => half_extents.x.max(half_extents.z),
            Self::Point => 0.0,
        }
    }

    /// Distance from the shape's centre to its lowest point.
    pub fn half_height(&self) -> f32 {
        match self {
            Self::Capsule { radius, height } => (height / 2.0).max(*radius),
            Self::Box { half_extents } => half_extents.y,
            Self::Point => 0.0,
        }
    }

    /// Get a bounding box that fully contains this shape, relative to its centre.
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        match self {
            Self::Capsule { radius, .. } => {
                let half_height = self.half_height();
                (
                    Vec3::new(-*radius, -half_height, -*radius),
                    Vec3::new(*radius, half_height, *radius),
                )
            }
            Self::Box { half_extents } => (-*half_extents, *half_extents),
            Self::Point => (Vec3::ZERO, Vec3::ZERO),
        }
    }

    /// Check if this is a point cast (raycast).
    #[inline]
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point)
    }
}

impl Default for TraceShape {
    fn default() -> Self {
        Self::PLAYER
    }
}
