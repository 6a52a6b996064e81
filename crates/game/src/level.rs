//! Level catalog: platform layouts, entity placements and spawn points.
//!
//! Levels are data. Loading one bakes its platforms into a fresh
//! [`CollisionWorld`]; the old world is dropped as a whole.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skyhop_physics::{CollisionWorld, ContentFlags, SurfaceFlags};

use crate::error::GameError;

/// Every level in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelId {
    Hub,
    Grass,
    Desert,
    Ice,
    Lava,
}

impl LevelId {
    /// All levels in load order.
    pub const ALL: [LevelId; 5] = [
        LevelId::Hub,
        LevelId::Grass,
        LevelId::Desert,
        LevelId::Ice,
        LevelId::Lava,
    ];

    /// Lowercase identifier used in config files and logs.
    pub fn name(self) -> &'static str {
        match self {
            LevelId::Hub => "hub",
            LevelId::Grass => "grass",
            LevelId::Desert => "desert",
            LevelId::Ice => "ice",
            LevelId::Lava => "lava",
        }
    }

    /// Title-cased name shown to the player.
    pub fn title(self) -> &'static str {
        match self {
            LevelId::Hub => "Hub",
            LevelId::Grass => "Grass",
            LevelId::Desert => "Desert",
            LevelId::Ice => "Ice",
            LevelId::Lava => "Lava",
        }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LevelId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LevelId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| GameError::UnknownLevel(s.to_string()))
    }
}

/// A solid axis-aligned platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Centre in world space.
    pub center: Vec3,
    /// Full size along each axis.
    pub size: Vec3,
}

impl Platform {
    /// Platform from a centre and full size.
    pub const fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    /// Height of the top face.
    pub fn top(&self) -> f32 {
        self.center.y + self.size.y * 0.5
    }
}

/// A doorway in the hub leading to another level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortalSpec {
    pub position: Vec3,
    pub target: LevelId,
    pub required_stars: u32,
}

/// Everything needed to build a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub id: LevelId,
    pub platforms: Vec<Platform>,
    /// Surface of every platform (ice is `SLICK`).
    pub surface: SurfaceFlags,
    /// Invisible walls that only stop hazards.
    pub hazard_clips: Vec<Platform>,
    pub stars: Vec<Vec3>,
    /// Starting points of patrolling hazards.
    pub patrollers: Vec<Vec3>,
    pub portals: Vec<PortalSpec>,
    /// Players below this height are sent back to spawn.
    pub kill_height: Option<f32>,
    /// Replaces the controller's run speed while in this level.
    pub speed_override: Option<f32>,
    /// Notice shown on arrival.
    pub welcome: Option<String>,
}

impl LevelLayout {
    fn empty(id: LevelId) -> Self {
        Self {
            id,
            platforms: Vec::new(),
            surface: SurfaceFlags::NONE,
            hazard_clips: Vec::new(),
            stars: Vec::new(),
            patrollers: Vec::new(),
            portals: Vec::new(),
            kill_height: None,
            speed_override: None,
            welcome: None,
        }
    }

    /// Top of the highest platform, if there are any.
    pub fn highest_top(&self) -> Option<f32> {
        self.platforms.iter().map(Platform::top).reduce(f32::max)
    }
}

/// Spawn used when a level has no platforms at all.
const FALLBACK_SPAWN: Vec3 = Vec3::new(0.0, 5.0, -10.0);

/// Hub spawn point.
const HUB_SPAWN: Vec3 = Vec3::new(0.0, 2.0, 0.0);

/// Lava surface height; touching anything below one unit above it kills.
const LAVA_SURFACE: f32 = -2.0;

/// The built-in levels.
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    layouts: BTreeMap<LevelId, LevelLayout>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelCatalog {
    /// Catalog with the hub and the four worlds.
    pub fn builtin() -> Self {
        let layouts = LevelId::ALL
            .into_iter()
            .map(|id| (id, builtin_layout(id)))
            .collect();
        Self { layouts }
    }

    /// Catalog from custom layouts. Levels without a layout load empty.
    pub fn from_layouts(layouts: impl IntoIterator<Item = LevelLayout>) -> Self {
        Self {
            layouts: layouts.into_iter().map(|layout| (layout.id, layout)).collect(),
        }
    }

    /// Layout for a level.
    pub fn layout(&self, id: LevelId) -> LevelLayout {
        self.layouts
            .get(&id)
            .cloned()
            .unwrap_or_else(|| LevelLayout::empty(id))
    }

    /// Look up a level by name.
    pub fn resolve(&self, name: &str) -> Result<LevelId, GameError> {
        name.parse()
    }

    /// Bake a level's platforms and hazard clips into a new collision world.
    pub fn rebuild(&self, id: LevelId) -> CollisionWorld {
        let mut world = CollisionWorld::new();
        if let Some(layout) = self.layouts.get(&id) {
            for platform in &layout.platforms {
                world.add_box_with_surface(
                    platform.center,
                    platform.size * 0.5,
                    ContentFlags::SOLID,
                    layout.surface,
                );
            }
            for clip in &layout.hazard_clips {
                world.add_box(clip.center, clip.size * 0.5, ContentFlags::HAZARD_CLIP);
            }
        }
        log::debug!("rebuilt {} with {} brushes", id, world.brush_count());
        world
    }

    /// Where the player appears in a level.
    ///
    /// The hub has a fixed spawn. Other levels spawn above the world origin,
    /// two units higher than their tallest platform.
    pub fn spawn_point_for(&self, id: LevelId) -> Vec3 {
        if id == LevelId::Hub {
            return HUB_SPAWN;
        }
        self.layouts
            .get(&id)
            .and_then(LevelLayout::highest_top)
            .map_or(FALLBACK_SPAWN, |top| Vec3::new(0.0, top + 2.0, 0.0))
    }
}

fn platform(x: f32, y: f32, z: f32, sx: f32, sy: f32, sz: f32) -> Platform {
    Platform::new(Vec3::new(x, y, z), Vec3::new(sx, sy, sz))
}

/// Four hazard clip walls around a square pad, `height` tall, standing on `floor`.
fn pad_fence(center: Vec3, half_width: f32, floor: f32, height: f32) -> Vec<Platform> {
    let y = floor + height * 0.5;
    let span = half_width * 2.0;
    let thickness = 0.2;
    vec![
        platform(center.x + half_width, y, center.z, thickness, height, span),
        platform(center.x - half_width, y, center.z, thickness, height, span),
        platform(center.x, y, center.z + half_width, span, height, thickness),
        platform(center.x, y, center.z - half_width, span, height, thickness),
    ]
}

fn points(coords: &[(f32, f32, f32)]) -> Vec<Vec3> {
    coords.iter().map(|&(x, y, z)| Vec3::new(x, y, z)).collect()
}

fn builtin_layout(id: LevelId) -> LevelLayout {
    let mut layout = LevelLayout::empty(id);

    match id {
        LevelId::Hub => {
            layout.platforms = vec![platform(0.0, -1.0, 0.0, 30.0, 1.0, 30.0)];
            layout.portals = vec![
                PortalSpec { position: Vec3::new(-10.0, 1.0, 8.0), target: LevelId::Grass, required_stars: 0 },
                PortalSpec { position: Vec3::new(10.0, 1.0, 8.0), target: LevelId::Desert, required_stars: 3 },
                PortalSpec { position: Vec3::new(-10.0, 1.0, -8.0), target: LevelId::Ice, required_stars: 8 },
                PortalSpec { position: Vec3::new(10.0, 1.0, -8.0), target: LevelId::Lava, required_stars: 15 },
            ];
            layout.welcome = Some("Welcome! WASD to move, Mouse to look, Space to jump.".to_string());
        }
        LevelId::Grass => {
            layout.platforms = vec![
                platform(0.0, 0.0, 0.0, 20.0, 1.0, 20.0),
                platform(8.0, 2.0, 5.0, 8.0, 1.0, 8.0),
                platform(-10.0, 4.0, -8.0, 6.0, 1.0, 6.0),
                platform(5.0, 6.0, 12.0, 10.0, 1.0, 4.0),
                platform(0.0, 8.0, -5.0, 3.0, 1.0, 3.0),
            ];
            layout.stars = points(&[
                (0.0, 2.0, 0.0),
                (8.0, 5.0, 5.0),
                (-10.0, 7.0, -8.0),
                (5.0, 9.0, 12.0),
                (0.0, 12.0, -5.0),
            ]);
            layout.patrollers = points(&[
                (3.0, 1.0, 3.0),
                (-5.0, 1.0, -2.0),
                (8.0, 4.0, 8.0),
                (-8.0, 6.0, -8.0),
            ]);
            // Keeps hazards off the landing spot under the spawn
            layout.hazard_clips = pad_fence(Vec3::ZERO, 2.0, 0.5, 1.5);
        }
        LevelId::Desert => {
            layout.platforms = vec![
                platform(0.0, 0.0, 0.0, 25.0, 1.0, 25.0),
                platform(15.0, 3.0, 8.0, 6.0, 1.0, 6.0),
                platform(-12.0, 5.0, -6.0, 8.0, 1.0, 4.0),
                platform(8.0, 8.0, -15.0, 4.0, 1.0, 8.0),
                // Pyramid
                platform(0.0, 4.0, 10.0, 3.0, 8.0, 3.0),
            ];
            layout.stars = points(&[
                (0.0, 2.0, 0.0),
                (15.0, 6.0, 8.0),
                (-12.0, 8.0, -6.0),
                (8.0, 11.0, -15.0),
                (0.0, 10.0, 10.0),
            ]);
            layout.patrollers = points(&[(4.0, 1.0, -4.0), (-6.0, 1.0, 5.0), (15.0, 5.0, 10.0)]);
        }
        LevelId::Ice => {
            layout.platforms = vec![
                platform(0.0, -1.0, 0.0, 20.0, 1.0, 20.0),
                platform(15.0, 4.0, 10.0, 6.0, 1.0, 6.0),
                platform(-12.0, 7.0, -8.0, 8.0, 1.0, 5.0),
                platform(10.0, 10.0, -12.0, 5.0, 1.0, 8.0),
            ];
            layout.stars = points(&[
                (0.0, 2.0, 0.0),
                (15.0, 7.0, 10.0),
                (-12.0, 10.0, -8.0),
                (10.0, 13.0, -12.0),
                (-5.0, 5.0, 5.0),
            ]);
            layout.patrollers = points(&[(5.0, 1.0, -3.0), (-4.0, 1.0, 6.0), (15.0, 6.0, 12.0)]);
            layout.speed_override = Some(8.0);
            layout.surface = SurfaceFlags::SLICK;
        }
        LevelId::Lava => {
            layout.platforms = vec![
                platform(0.0, 0.0, 0.0, 8.0, 1.0, 8.0),
                platform(12.0, 5.0, 8.0, 5.0, 1.0, 5.0),
                platform(-10.0, 8.0, -10.0, 6.0, 1.0, 4.0),
                platform(8.0, 12.0, -15.0, 4.0, 1.0, 6.0),
            ];
            layout.stars = points(&[
                (0.0, 3.0, 0.0),
                (12.0, 8.0, 8.0),
                (-10.0, 11.0, -10.0),
                (8.0, 15.0, -15.0),
                (5.0, 3.0, -5.0),
            ]);
            layout.patrollers = points(&[(6.0, 1.0, -2.0), (-3.0, 1.0, 4.0), (12.0, 7.0, 10.0)]);
            layout.kill_height = Some(LAVA_SURFACE + 1.0);
        }
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyhop_physics::{CollisionQuery, TraceShape};

    #[test]
    fn test_level_names_round_trip() {
        for id in LevelId::ALL {
            assert_eq!(id.name().parse::<LevelId>().unwrap(), id);
        }
        assert_eq!("Desert".parse::<LevelId>().unwrap(), LevelId::Desert);
    }

    #[test]
    fn test_unknown_level() {
        let err = LevelCatalog::builtin().resolve("moon").unwrap_err();
        assert!(matches!(err, GameError::UnknownLevel(name) if name == "moon"));
    }

    #[test]
    fn test_hub_spawn_is_fixed() {
        let catalog = LevelCatalog::builtin();
        assert_eq!(catalog.spawn_point_for(LevelId::Hub), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_spawn_above_highest_platform() {
        let catalog = LevelCatalog::builtin();
        // Grass: tallest platform is centred at y = 8 with height 1
        assert_eq!(catalog.spawn_point_for(LevelId::Grass), Vec3::new(0.0, 10.5, 0.0));
        // Desert: the y = 8 ledge tops out at 8.5, above the pyramid at 8.0
        assert_eq!(catalog.spawn_point_for(LevelId::Desert), Vec3::new(0.0, 10.5, 0.0));
        // Lava: tallest platform top at 12.5
        assert_eq!(catalog.spawn_point_for(LevelId::Lava), Vec3::new(0.0, 14.5, 0.0));
    }

    #[test]
    fn test_empty_level_uses_fallback_spawn() {
        let catalog = LevelCatalog::from_layouts([]);
        assert_eq!(catalog.spawn_point_for(LevelId::Grass), FALLBACK_SPAWN);
        assert_eq!(catalog.rebuild(LevelId::Grass).brush_count(), 0);
    }

    #[test]
    fn test_rebuild_bakes_every_platform() {
        let catalog = LevelCatalog::builtin();
        for id in LevelId::ALL {
            let layout = catalog.layout(id);
            assert_eq!(
                catalog.rebuild(id).brush_count(),
                layout.platforms.len() + layout.hazard_clips.len()
            );
        }
    }

    #[test]
    fn test_hub_ground_is_solid() {
        let world = LevelCatalog::builtin().rebuild(LevelId::Hub);
        let hit = world
            .cast_shape(
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::NEG_Y,
                10.0,
                TraceShape::PLAYER,
                ContentFlags::MASK_PLAYER_SOLID,
                &[],
            )
            .expect("hub ground");
        // Ground top is at y = -0.5
        assert!((hit.point.y + 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_level_features() {
        let catalog = LevelCatalog::builtin();
        assert_eq!(catalog.layout(LevelId::Ice).speed_override, Some(8.0));
        assert_eq!(catalog.layout(LevelId::Lava).kill_height, Some(-1.0));
        assert_eq!(catalog.layout(LevelId::Hub).portals.len(), 4);
        assert!(catalog.layout(LevelId::Grass).speed_override.is_none());
    }

    #[test]
    fn test_ice_platforms_are_slick() {
        let world = LevelCatalog::builtin().rebuild(LevelId::Ice);
        assert!(world.brushes().all(|brush| brush.surface.contains(SurfaceFlags::SLICK)));

        let grass = LevelCatalog::builtin().rebuild(LevelId::Grass);
        assert!(grass.brushes().all(|brush| !brush.surface.contains(SurfaceFlags::SLICK)));
    }

    #[test]
    fn test_spawn_pad_fence_only_stops_hazards() {
        let world = LevelCatalog::builtin().rebuild(LevelId::Grass);
        let origin = Vec3::new(0.0, 1.0, 0.0);

        let hazard_hit = world
            .raycast(origin, Vec3::X, 5.0, ContentFlags::MASK_HAZARD_SOLID, &[])
            .expect("fence stops hazards");
        assert!((hazard_hit.distance - 1.9).abs() < 1e-3, "distance={}", hazard_hit.distance);

        let player_hit = world.raycast(origin, Vec3::X, 5.0, ContentFlags::MASK_PLAYER_SOLID, &[]);
        assert!(player_hit.is_none());
    }
}
