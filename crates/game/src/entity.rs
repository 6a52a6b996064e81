//! Level entities: stars, hazards and portals.
//!
//! Entities never touch the player or the level directly. Each frame they
//! read a snapshot through [`EntityContext`] and return [`Effect`]s; the
//! frame driver applies those after every entity has run.

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use skyhop_physics::{CollisionWorld, ContentFlags, ControllerView, TraceShape};

use crate::config::SimulationConfig;
use crate::level::LevelId;
use crate::progress::Progress;

/// Read-only view of the frame handed to every entity.
pub struct EntityContext<'a> {
    /// Player state after this frame's controller update.
    pub player: &'a ControllerView,
    /// Player collision shape, for overlap tests.
    pub player_shape: TraceShape,
    pub world: &'a CollisionWorld,
    pub progress: &'a Progress,
    pub config: &'a SimulationConfig,
    /// Interact went down this frame.
    pub interact_pressed: bool,
    /// Simulation clock in seconds.
    pub time: f64,
    /// Shared deterministic random source.
    pub rng: &'a mut SmallRng,
}

impl EntityContext<'_> {
    /// Whether the player's bounding box overlaps a box at `center`.
    fn player_overlaps(&self, center: Vec3, half_extents: Vec3) -> bool {
        let (min, max) = self.player_shape.bounding_box();
        let player_half = (max - min) * 0.5;
        let gap = (self.player.position - center).abs();
        gap.cmple(player_half + half_extents).all()
    }
}

/// Something an entity wants done to the rest of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Add one to the star count.
    CollectStar,
    /// Change the player's velocity at the start of its next update.
    Impulse(Vec3),
    /// Send the player back to the spawn point at the end of the frame.
    Respawn,
    /// Show an instruction notice.
    ShowNotice(String),
    /// Hide the current notice if it starts with this text.
    ClearNotice { prefix: String },
    /// Load another level at the end of the frame.
    EnterLevel(LevelId),
    /// Remove the emitting entity after a delay in seconds.
    Despawn { after: f32 },
}

/// Effects produced by one entity in one frame.
pub type Effects = Vec<Effect>;

/// Distance on the ground plane.
fn distance_xz(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

// ============================================================================
// Star
// ============================================================================

/// A collectible star that bobs and spins until picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Resting position; the bob oscillates around it.
    pub origin: Vec3,
    pub position: Vec3,
    /// Spin angle in radians.
    pub spin: f32,
    collected: bool,
}

impl Star {
    const SPIN_SPEED: f32 = 50.0 * std::f32::consts::PI / 180.0;
    const BOB_AMPLITUDE: f32 = 0.2;
    const BOB_SPEED: f64 = 2.0;

    pub fn new(position: Vec3) -> Self {
        Self {
            origin: position,
            position,
            spin: 0.0,
            collected: false,
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    fn advance(&mut self, delta_time: f32, ctx: &EntityContext<'_>) -> Effects {
        self.spin = (self.spin + Self::SPIN_SPEED * delta_time) % std::f32::consts::TAU;
        self.position.y = self.origin.y + (ctx.time * Self::BOB_SPEED).sin() as f32 * Self::BOB_AMPLITUDE;

        let player = ctx.player.position;
        let in_reach = distance_xz(self.position, player) < ctx.config.star_pickup_radius
            && (self.position.y - player.y).abs() < ctx.config.star_pickup_height;

        if !in_reach {
            return Vec::new();
        }

        // Disabled at once so it can't be counted twice before removal
        self.collected = true;
        vec![
            Effect::CollectStar,
            Effect::Despawn {
                after: ctx.config.star_removal_delay,
            },
        ]
    }
}

// ============================================================================
// Patroller
// ============================================================================

/// A hazard that wanders along the axes near its starting point.
///
/// Landing on it from above defeats it and bounces the player; any other
/// touch sends the player back to spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patroller {
    pub position: Vec3,
    pub start: Vec3,
    /// One of the four horizontal axis directions.
    pub direction: Vec3,
    pub speed: f32,
    pub patrol_radius: f32,
    defeated: bool,
}

impl Patroller {
    pub const HALF_EXTENTS: Vec3 = Vec3::new(0.5, 0.4, 0.5);
    const DIRECTIONS: [Vec3; 4] = [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];
    const WALL_CHECK_DISTANCE: f32 = 0.6;
    const LEDGE_CHECK_DEPTH: f32 = 2.0;
    /// Player must fall faster than this to stomp.
    const STOMP_MIN_FALL_SPEED: f32 = 1.0;
    /// Player centre must be this far above the hazard centre to stomp.
    const STOMP_MIN_HEIGHT: f32 = 0.5;

    pub fn new(position: Vec3, rng: &mut SmallRng) -> Self {
        Self {
            position,
            start: position,
            direction: Self::random_direction(rng),
            speed: 2.0,
            patrol_radius: 5.0,
            defeated: false,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    fn random_direction(rng: &mut SmallRng) -> Vec3 {
        Self::DIRECTIONS[rng.gen_range(0..Self::DIRECTIONS.len())]
    }

    /// A random axis direction that closes the distance to `start`.
    fn homeward_direction(&self, rng: &mut SmallRng) -> Vec3 {
        let home = self.start - self.position;
        let candidates: Vec<Vec3> = Self::DIRECTIONS
            .into_iter()
            .filter(|direction| direction.dot(home) > 0.0)
            .collect();
        if candidates.is_empty() {
            return self.direction;
        }
        candidates[rng.gen_range(0..candidates.len())]
    }

    fn blocked_ahead(&self, world: &CollisionWorld) -> bool {
        let mask = ContentFlags::MASK_HAZARD_SOLID;

        let wall_ahead = world
            .raycast(self.position, self.direction, Self::WALL_CHECK_DISTANCE, mask, &[])
            .is_some();
        let ledge_ahead = world
            .raycast(
                self.position + self.direction * Self::WALL_CHECK_DISTANCE,
                Vec3::NEG_Y,
                Self::LEDGE_CHECK_DEPTH,
                mask,
                &[],
            )
            .is_none();

        wall_ahead || ledge_ahead
    }

    fn advance(&mut self, delta_time: f32, ctx: &mut EntityContext<'_>) -> Effects {
        let outside_area = distance_xz(self.position, self.start) > self.patrol_radius;
        let heading_away = self.direction.dot(self.start - self.position) <= 0.0;

        if outside_area && heading_away {
            self.direction = self.homeward_direction(ctx.rng);
        } else if self.blocked_ahead(ctx.world) {
            self.direction = Self::random_direction(ctx.rng);
        }
        self.position += self.direction * self.speed * delta_time;

        if !ctx.player_overlaps(self.position, Self::HALF_EXTENTS) {
            return Vec::new();
        }

        let player = ctx.player;
        let stomped = player.velocity.y < -Self::STOMP_MIN_FALL_SPEED
            && player.position.y > self.position.y + Self::STOMP_MIN_HEIGHT;

        if stomped {
            self.defeated = true;
            log::debug!("patroller stomped at {:?}", self.position);
            // Sets the player's vertical speed to the bounce speed exactly
            let bounce = ctx.config.stomp_bounce_speed - player.velocity.y;
            vec![
                Effect::Impulse(Vec3::Y * bounce),
                Effect::Despawn {
                    after: ctx.config.hazard_removal_delay,
                },
            ]
        } else {
            log::debug!("player hit by patroller at {:?}", self.position);
            vec![Effect::Respawn]
        }
    }
}

// ============================================================================
// Kill plane
// ============================================================================

/// Lava or a bottomless pit: anything below `kill_below` respawns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KillPlane {
    pub kill_below: f32,
}

impl KillPlane {
    pub fn new(kill_below: f32) -> Self {
        Self { kill_below }
    }

    fn advance(&self, ctx: &EntityContext<'_>) -> Effects {
        if ctx.player.position.y < self.kill_below {
            vec![Effect::Respawn]
        } else {
            Vec::new()
        }
    }
}

// ============================================================================
// Portal
// ============================================================================

/// A doorway to another level, gated by a star requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub position: Vec3,
    pub target: LevelId,
    pub required_stars: u32,
    unlocked: bool,
    /// Notice emitted for the player standing inside, and when.
    shown: Option<(String, f64)>,
}

impl Portal {
    pub const HALF_EXTENTS: Vec3 = Vec3::new(1.0, 1.5, 0.25);

    pub fn new(position: Vec3, target: LevelId, required_stars: u32) -> Self {
        Self {
            position,
            target,
            required_stars,
            unlocked: false,
            shown: None,
        }
    }

    /// Unlock state as of the last frame.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Prompt shown while standing in an open portal.
    pub fn prompt(&self) -> String {
        format!("Press 'E' to enter {}", self.target.title())
    }

    fn advance(&mut self, ctx: &EntityContext<'_>) -> Effects {
        self.unlocked = ctx.progress.stars >= self.required_stars;

        if !ctx.player_overlaps(self.position, Self::HALF_EXTENTS) {
            return match self.shown.take() {
                Some((text, _)) => vec![Effect::ClearNotice { prefix: text }],
                None => Vec::new(),
            };
        }

        let text = if self.unlocked {
            self.prompt()
        } else {
            format!("Need {} more stars!", self.required_stars - ctx.progress.stars)
        };

        // Re-sent only when it changes or is about to time out
        let mut effects = Vec::new();
        let refresh_after = f64::from(ctx.config.notice_duration);
        let stale = match &self.shown {
            Some((shown, at)) => *shown != text || ctx.time - at >= refresh_after,
            None => true,
        };
        if stale {
            effects.push(Effect::ShowNotice(text.clone()));
            self.shown = Some((text, ctx.time));
        }

        if self.unlocked && ctx.interact_pressed {
            effects.push(Effect::EnterLevel(self.target));
        }
        effects
    }
}

// ============================================================================
// Entity
// ============================================================================

/// Every kind of level entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Star(Star),
    Patroller(Patroller),
    KillPlane(KillPlane),
    Portal(Portal),
}

impl Entity {
    /// Run one frame.
    pub fn advance(&mut self, delta_time: f32, ctx: &mut EntityContext<'_>) -> Effects {
        match self {
            Entity::Star(star) => star.advance(delta_time, ctx),
            Entity::Patroller(patroller) => patroller.advance(delta_time, ctx),
            Entity::KillPlane(plane) => plane.advance(ctx),
            Entity::Portal(portal) => portal.advance(ctx),
        }
    }

    /// Whether the entity still takes part in the frame. Collected stars
    /// and defeated hazards stay in the arena until their removal is due.
    pub fn is_active(&self) -> bool {
        match self {
            Entity::Star(star) => !star.collected,
            Entity::Patroller(patroller) => !patroller.defeated,
            Entity::KillPlane(_) | Entity::Portal(_) => true,
        }
    }

    /// World position, if the entity has one.
    pub fn position(&self) -> Option<Vec3> {
        match self {
            Entity::Star(star) => Some(star.position),
            Entity::Patroller(patroller) => Some(patroller.position),
            Entity::KillPlane(_) => None,
            Entity::Portal(portal) => Some(portal.position),
        }
    }
}
