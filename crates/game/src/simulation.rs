//! Game simulation - the main game loop.
//!
//! One [`Simulation::tick`] runs a whole frame in a fixed order:
//!
//! 1. Map raw keys to input edges
//! 2. Advance the player controller against the current level geometry
//! 3. Advance every active entity against a snapshot of the player
//! 4. Apply the entities' effects
//! 5. Run scheduled work that has come due
//! 6. Swap in a new level if one was requested this frame
//!
//! The level geometry lives behind an [`Arc`] and is only replaced between
//! frames, so nothing observes a half-built world.

use std::sync::Arc;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use skyhop_physics::{CharacterController, CollisionWorld, ControllerView, FrameReport};

use crate::arena::{EntityArena, EntityId};
use crate::config::SimulationConfig;
use crate::entity::{Effect, Entity, EntityContext, KillPlane, Patroller, Portal, Star};
use crate::error::GameResult;
use crate::input::{InputMapper, RawInput};
use crate::level::{LevelCatalog, LevelId};
use crate::notice::NoticeBoard;
use crate::progress::Progress;
use crate::schedule::ScheduledQueue;

/// Deferred work owned by the frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// Hide the notice shown with this token, unless it was replaced.
    HideNotice(u64),
    /// Remove an entity from the arena.
    RemoveEntity(EntityId),
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Controller events (jumps, landings, wall contact).
    pub controller: FrameReport,
    /// Stars picked up this tick.
    pub stars_collected: u32,
    /// The player was sent back to spawn.
    pub respawned: bool,
    /// A level finished loading at the end of the tick.
    pub level_loaded: Option<LevelId>,
}

/// The main game simulation.
///
/// Owns the player controller, the current level and everything in it.
/// Runs deterministically: the same config, seed and inputs always produce
/// the same states.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame/tick number.
    pub frame: u64,

    /// Simulation clock in seconds.
    time: f64,

    config: SimulationConfig,
    catalog: LevelCatalog,
    progress: Progress,

    /// Geometry of the current level.
    world: Arc<CollisionWorld>,

    controller: CharacterController,
    entities: EntityArena,
    schedule: ScheduledQueue<Scheduled>,
    notices: NoticeBoard,
    input: InputMapper,
    rng: SmallRng,

    /// Level to load at the end of the current tick.
    pending_level: Option<LevelId>,
}

impl Simulation {
    /// Create a simulation in the hub.
    pub fn new(config: SimulationConfig, catalog: LevelCatalog) -> Self {
        let controller = CharacterController::new(config.movement.clone(), Vec3::ZERO);
        let rng = SmallRng::seed_from_u64(config.seed);

        let mut sim = Self {
            frame: 0,
            time: 0.0,
            config,
            catalog,
            progress: Progress::new(),
            world: Arc::new(CollisionWorld::new()),
            controller,
            entities: EntityArena::new(),
            schedule: ScheduledQueue::new(),
            notices: NoticeBoard::new(),
            input: InputMapper::new(),
            rng,
            pending_level: None,
        };
        sim.load_level(LevelId::Hub);
        sim
    }

    /// Create a simulation with default configuration and the built-in levels.
    pub fn with_defaults() -> Self {
        Self::new(SimulationConfig::default(), LevelCatalog::builtin())
    }

    /// Advance by one tick of the configured rate.
    pub fn step(&mut self, raw: &RawInput) -> TickReport {
        let delta_time = self.config.delta_time();
        self.tick(raw, delta_time)
    }

    /// Advance the simulation by `delta_time` seconds.
    pub fn tick(&mut self, raw: &RawInput, delta_time: f32) -> TickReport {
        let delta_time = delta_time.clamp(0.0, self.config.movement.max_frame_delta);
        let mut report = TickReport::default();

        // Input
        let frame_input = self.input.map(raw, self.config.mouse_sensitivity);
        if frame_input.restart_pressed {
            log::info!("restart requested");
            self.pending_level = Some(LevelId::Hub);
        }

        // Player
        let spawn_point = self.spawn_point();
        let world = Arc::clone(&self.world);
        report.controller =
            self.controller
                .update(&frame_input.control, world.as_ref(), spawn_point, delta_time);
        report.respawned = report.controller.respawned();

        // Entities, against the finished player state
        let view = self.controller.view();
        let mut effects = Vec::new();
        {
            let mut ctx = EntityContext {
                player: &view,
                player_shape: self.controller.config.shape,
                world: world.as_ref(),
                progress: &self.progress,
                config: &self.config,
                interact_pressed: frame_input.control.interact_pressed,
                time: self.time,
                rng: &mut self.rng,
            };
            for (id, entity) in self.entities.iter_mut() {
                if !entity.is_active() {
                    continue;
                }
                effects.extend(entity.advance(delta_time, &mut ctx).into_iter().map(|e| (id, e)));
            }
        }

        let mut respawn = false;
        for (id, effect) in effects {
            respawn |= self.apply_effect(id, effect, &mut report);
        }
        if respawn {
            self.controller.respawn(spawn_point);
            report.respawned = true;
        }

        // Scheduled work
        self.time += f64::from(delta_time);
        for item in self.schedule.drain_due(self.time) {
            match item {
                Scheduled::HideNotice(token) => self.notices.expire(token),
                Scheduled::RemoveEntity(id) => {
                    self.entities.remove(id);
                }
            }
        }

        // Level transition
        if let Some(level) = self.pending_level.take() {
            self.load_level(level);
            report.level_loaded = Some(level);
        }

        self.frame += 1;
        report
    }

    /// Apply one effect. Returns true when the player must respawn.
    fn apply_effect(&mut self, id: EntityId, effect: Effect, report: &mut TickReport) -> bool {
        match effect {
            Effect::CollectStar => {
                self.progress.collect_star();
                report.stars_collected += 1;
            }
            Effect::Impulse(impulse) => self.controller.push_impulse(impulse),
            Effect::Respawn => return true,
            Effect::ShowNotice(text) => self.show_notice(text, self.config.notice_duration),
            Effect::ClearNotice { prefix } => self.notices.clear_matching(&prefix),
            Effect::EnterLevel(level) => {
                if let Err(err) = self.request_level(level) {
                    log::warn!("{}", err);
                }
            }
            Effect::Despawn { after } => {
                self.schedule
                    .push(self.time + f64::from(after), Scheduled::RemoveEntity(id));
            }
        }
        false
    }

    fn show_notice(&mut self, text: String, duration: f32) {
        let token = self.notices.show(text);
        self.schedule
            .push(self.time + f64::from(duration), Scheduled::HideNotice(token));
    }

    /// Ask for a level change at the end of the next tick.
    pub fn request_level(&mut self, level: LevelId) -> GameResult<()> {
        self.progress.check_entry(level)?;
        self.pending_level = Some(level);
        Ok(())
    }

    /// [`request_level`](Self::request_level) by name.
    pub fn request_level_by_name(&mut self, name: &str) -> GameResult<()> {
        let level = self.catalog.resolve(name)?;
        self.request_level(level)
    }

    /// Replace the current level: new geometry, new entities, player at spawn.
    fn load_level(&mut self, level: LevelId) {
        let layout = self.catalog.layout(level);

        self.world = Arc::new(self.catalog.rebuild(level));
        self.entities.clear();
        self.schedule
            .retain(|item| !matches!(item, Scheduled::RemoveEntity(_)));
        self.notices.hide();

        for &position in &layout.stars {
            self.entities.insert(Entity::Star(Star::new(position)));
        }
        for &position in &layout.patrollers {
            let patroller = Patroller::new(position, &mut self.rng);
            self.entities.insert(Entity::Patroller(patroller));
        }
        if let Some(kill_below) = layout.kill_height {
            self.entities.insert(Entity::KillPlane(KillPlane::new(kill_below)));
        }
        for portal in &layout.portals {
            self.entities.insert(Entity::Portal(Portal::new(
                portal.position,
                portal.target,
                portal.required_stars,
            )));
        }

        self.progress.current = level;
        self.controller.speed_override = layout.speed_override;
        let spawn_point = self.catalog.spawn_point_for(level);
        self.controller.spawn_at(spawn_point, &self.world);

        if let Some(welcome) = layout.welcome {
            self.show_notice(welcome, self.config.welcome_duration);
        }

        log::info!(
            "loaded level {} ({} brushes, {} entities)",
            level,
            self.world.brush_count(),
            self.entities.len()
        );
    }

    /// Spawn point of the current level.
    pub fn spawn_point(&self) -> Vec3 {
        self.catalog.spawn_point_for(self.progress.current)
    }

    /// Point the camera. Mouse motion keeps turning from here.
    pub fn set_camera_yaw(&mut self, yaw: f32) {
        self.input.set_yaw(yaw);
    }

    pub fn level(&self) -> LevelId {
        self.progress.current
    }

    /// Published player state.
    pub fn view(&self) -> ControllerView {
        self.controller.view()
    }

    pub fn controller(&self) -> &CharacterController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CharacterController {
        &mut self.controller
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Progress, e.g. to restore a save.
    pub fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    /// Instruction notice on screen, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notices.text()
    }

    pub fn entities(&self) -> &EntityArena {
        &self.entities
    }

    pub fn world(&self) -> &Arc<CollisionWorld> {
        &self.world
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulation clock in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }
}

// ============================================================================
// Tests
// ============================================================================
