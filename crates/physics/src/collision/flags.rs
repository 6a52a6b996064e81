//! Content and surface flags for collision filtering.
//!
//! These flags determine what a cast can hit and what properties
//! surfaces have for gameplay purposes.

use serde::{Deserialize, Serialize};

/// Content flags describe what type of volume a brush is.
///
/// Used to filter collision casts - the controller ignores hazard clips when
/// resolving movement, while hazards use their own mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    /// Empty space - nothing here.
    pub const EMPTY: Self = Self(0);

    /// Solid level geometry - platforms, walls, floors.
    pub const SOLID: Self = Self(1 << 0);

    /// Hazard clip - blocks patrolling hazards but not the controller.
    pub const HAZARD_CLIP: Self = Self(1 << 1);

    /// Standard mask for controller movement casts.
    pub const MASK_PLAYER_SOLID: Self = Self::SOLID;

    /// Standard mask for hazard patrol probes.
    pub const MASK_HAZARD_SOLID: Self = Self(Self::SOLID.0 | Self::HAZARD_CLIP.0);

    /// Check if these flags contain a specific flag.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the given flags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ContentFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Surface flags describe properties of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceFlags(pub u32);

impl SurfaceFlags {
    /// No special properties.
    pub const NONE: Self = Self(0);

    /// Slippery surface (ice).
    pub const SLICK: Self = Self(1 << 0);

    /// Surface cannot be wall-jumped from.
    pub const NO_WALL_JUMP: Self = Self(1 << 1);

    /// Check if these flags contain a specific flag.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for SurfaceFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_mask() {
        let mask = ContentFlags::MASK_PLAYER_SOLID;
        assert!(mask.contains(ContentFlags::SOLID));
        assert!(!mask.intersects(ContentFlags::HAZARD_CLIP));
    }

    #[test]
    fn test_hazard_mask() {
        let mask = ContentFlags::MASK_HAZARD_SOLID;
        assert!(mask.contains(ContentFlags::SOLID));
        assert!(mask.intersects(ContentFlags::HAZARD_CLIP));
    }

    #[test]
    fn test_surface_flags_combine() {
        let flags = SurfaceFlags::SLICK | SurfaceFlags::NO_WALL_JUMP;
        assert!(flags.contains(SurfaceFlags::SLICK));
        assert!(flags.contains(SurfaceFlags::NO_WALL_JUMP));
        assert!(!SurfaceFlags::NONE.contains(SurfaceFlags::SLICK));
    }
}
