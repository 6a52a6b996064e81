//! Character controller facade.
//!
//! Owns the [`ControllerState`] and runs one frame in a fixed order:
//!
//! 1. Clamp the frame delta
//! 2. Apply impulses pushed since the last frame
//! 3. Tick the jump chain timer
//! 4. Smooth horizontal velocity toward the input direction
//! 5. Evaluate a jump edge against the previous frame's classification
//! 6. Integrate (gravity, slide, ground and wall probes)
//! 7. Advance the scale pulse
//! 8. Respawn when fallen out of the world

use glam::Vec3;

use crate::collision::{CollisionQuery, CollisionWorld, ContentFlags, SurfaceFlags};

use super::config::MovementConfig;
use super::integrator::integrate;
use super::jump::{try_jump, JumpChain, JumpKind};
use super::state::{ControlInput, ControllerEvent, ControllerState, ControllerView, FrameReport};

/// Player movement controller.
///
/// # Example
///
/// ```ignore
/// let mut controller = CharacterController::new(MovementConfig::default(), spawn);
///
/// // Each frame:
/// let report = controller.update(&input, &world, spawn, delta_time);
/// let view = controller.view();
/// ```
#[derive(Debug, Clone)]
pub struct CharacterController {
    /// Movement configuration.
    pub config: MovementConfig,

    /// Kinematic state, mutated only by `update` and `respawn`.
    pub state: ControllerState,

    /// Run speed replacement set by the current level.
    pub speed_override: Option<f32>,

    /// Velocity changes queued by other entities for the next update.
    impulses: Vec<Vec3>,
}

impl CharacterController {
    /// Create a controller at rest at `position`.
    pub fn new(config: MovementConfig, position: Vec3) -> Self {
        Self {
            config,
            state: ControllerState::new(position),
            speed_override: None,
            impulses: Vec::new(),
        }
    }

    /// Queue a velocity change. Applied at the start of the next update,
    /// never in the middle of the current one.
    pub fn push_impulse(&mut self, impulse: Vec3) {
        self.impulses.push(impulse);
    }

    /// Number of impulses waiting for the next update.
    pub fn pending_impulses(&self) -> usize {
        self.impulses.len()
    }

    /// Update the controller for one frame.
    ///
    /// `spawn_point` is where the controller reappears if it falls below
    /// `fall_out_height` this frame.
    pub fn update<Q: CollisionQuery + ?Sized>(
        &mut self,
        input: &ControlInput,
        world: &Q,
        spawn_point: Vec3,
        delta_time: f32,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        // Clamp delta time to prevent tunneling after a stall
        let delta_time = delta_time.clamp(0.0, self.config.max_frame_delta);

        self.apply_impulses();

        self.state
            .chain
            .tick(delta_time, self.state.grounded, self.config.chain_window);

        self.accelerate(input, delta_time);

        if input.jump_pressed {
            if let Some(kind) = try_jump(&mut self.state, input.long_jump_held, &self.config) {
                if kind == JumpKind::Chain(JumpChain::MAX_CHAIN) {
                    self.state.pulse.start();
                }
                report.events.push(ControllerEvent::Jumped(kind));
            }
        }

        integrate(
            &mut self.state,
            world,
            &self.config,
            delta_time,
            &mut report.events,
        );

        self.state.pulse.advance(delta_time, &self.config);

        if self.state.position.y < self.config.fall_out_height {
            self.respawn(spawn_point);
            report.events.push(ControllerEvent::Respawned);
        }

        log::trace!(
            "controller pos={:?} vel={:?} grounded={} wall={}",
            self.state.position,
            self.state.velocity,
            self.state.grounded,
            self.state.wall_contact.is_some()
        );

        report
    }

    /// Reset to `spawn_point` at rest. Calling it twice in a row leaves the
    /// same state as calling it once.
    pub fn respawn(&mut self, spawn_point: Vec3) {
        self.state.position = spawn_point;
        self.state.velocity = Vec3::ZERO;
        self.state.grounded = false;
        self.state.ground_normal = Vec3::Y;
        self.state.ground_surface = SurfaceFlags::NONE;
        self.state.wall_contact = None;
        self.state.airborne_time = 0.0;
        self.state.chain.reset();
        self.state.pulse.cancel();
        self.impulses.clear();

        log::info!("respawned at {:?}", spawn_point);
    }

    /// Place the controller at a spawn point, pushed out of any geometry
    /// the shape would start embedded in.
    pub fn spawn_at(&mut self, spawn_point: Vec3, world: &CollisionWorld) {
        let position =
            world.resolve_penetration(spawn_point, self.config.shape, ContentFlags::MASK_PLAYER_SOLID);
        self.respawn(position);
    }

    /// Read-only snapshot for the camera, UI, audio and other entities.
    pub fn view(&self) -> ControllerView {
        ControllerView {
            position: self.state.position,
            velocity: self.state.velocity,
            grounded: self.state.grounded,
            touching_wall: self.state.wall_contact.is_some(),
            chain_count: self.state.chain.count(),
            airborne_time: self.state.airborne_time,
            scale_factor: self.state.pulse.factor(&self.config),
        }
    }

    fn apply_impulses(&mut self) {
        for impulse in self.impulses.drain(..) {
            self.state.velocity += impulse;
            if impulse.y > 0.0 {
                self.state.grounded = false;
                self.state.wall_contact = None;
            }
        }
    }

    /// Smooth horizontal velocity toward `wish_direction * run_speed`.
    ///
    /// Grounded: accelerates with input held, decelerates when released,
    /// both scaled down on slick ground.
    /// Airborne: a fraction of the acceleration steers the current motion.
    fn accelerate(&mut self, input: &ControlInput, delta_time: f32) {
        let wish = input.wish_direction();
        let target = wish * self.config.effective_run_speed(self.speed_override);

        let mut rate = if !self.state.grounded {
            self.config.run_acceleration * self.config.air_control
        } else if wish != Vec3::ZERO {
            self.config.run_acceleration
        } else {
            self.config.run_deceleration
        };
        if self.state.grounded && self.state.ground_surface.contains(SurfaceFlags::SLICK) {
            rate *= self.config.slick_control;
        }

        let t = (rate * delta_time).min(1.0);
        self.state.velocity.x += (target.x - self.state.velocity.x) * t;
        self.state.velocity.z += (target.z - self.state.velocity.z) * t;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const FRAME: f32 = 1.0 / 60.0;

    fn floor_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(200.0, 0.5, 200.0),
            ContentFlags::SOLID,
        );
        world
    }

    fn run_forward() -> ControlInput {
        ControlInput {
            move_axis: Vec2::new(0.0, 1.0),
            ..Default::default()
        }
    }

    fn settle(controller: &mut CharacterController, world: &CollisionWorld) {
        for _ in 0..10 {
            controller.update(&ControlInput::default(), world, Vec3::ZERO, FRAME);
        }
        assert!(controller.state.grounded);
    }

    #[test]
    fn test_falls_out_and_respawns() {
        let world = CollisionWorld::new();
        let spawn = Vec3::new(0.0, 10.0, 0.0);
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(0.0, -29.9, 0.0));
        controller.state.velocity.y = -6.0;
        controller.state.velocity.x = 3.0;

        let report = controller.update(&ControlInput::default(), &world, spawn, FRAME);

        assert!(report.respawned());
        assert_eq!(controller.state.position, spawn);
        assert_eq!(controller.state.velocity, Vec3::ZERO);
        assert_eq!(controller.state.chain.count(), 0);
        assert!(controller.state.wall_contact.is_none());
    }

    #[test]
    fn test_respawn_is_idempotent() {
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(4.0, 2.0, 1.0));
        controller.state.velocity = Vec3::new(1.0, 2.0, 3.0);
        controller.push_impulse(Vec3::Y);

        let spawn = Vec3::new(0.0, 5.0, 0.0);
        controller.respawn(spawn);
        let once = controller.state.clone();
        controller.respawn(spawn);

        assert_eq!(controller.state.position, once.position);
        assert_eq!(controller.state.velocity, once.velocity);
        assert_eq!(controller.state.chain, once.chain);
        assert_eq!(controller.pending_impulses(), 0);
    }

    #[test]
    fn test_three_jump_chain_while_running() {
        let world = floor_world();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0));
        settle(&mut controller, &world);

        // Build up speed
        for _ in 0..90 {
            controller.update(&run_forward(), &world, Vec3::ZERO, FRAME);
        }
        assert!(controller.state.horizontal_speed() > controller.config.chain_min_speed);

        let mut kinds = Vec::new();
        let mut peaks = Vec::new();
        let mut pulse_seen = false;

        while kinds.len() < 3 {
            // Press on the first grounded frame
            let input = ControlInput {
                jump_pressed: controller.state.grounded,
                ..run_forward()
            };
            let report = controller.update(&input, &world, Vec3::ZERO, FRAME);
            if let Some(kind) = report.jump() {
                kinds.push(kind);
                peaks.push(controller.state.velocity.y);
            }
            pulse_seen |= controller.view().scale_factor > 1.0;
            assert!(controller.state.position.x < 150.0, "never completed the chain");
        }

        assert_eq!(kinds, vec![JumpKind::Chain(1), JumpKind::Chain(2), JumpKind::Chain(3)]);
        assert!(peaks[0] < peaks[1] && peaks[1] < peaks[2]);
        assert_eq!(controller.view().chain_count, 3);
        assert!(pulse_seen || controller.state.pulse.is_active());
    }

    #[test]
    fn test_chain_times_out_while_standing() {
        let world = floor_world();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0));
        settle(&mut controller, &world);

        let press = ControlInput {
            jump_pressed: true,
            ..Default::default()
        };
        let report = controller.update(&press, &world, Vec3::ZERO, FRAME);
        assert!(report.jump().is_some());
        assert_eq!(controller.view().chain_count, 1);

        let mut landings = 0;
        for _ in 0..180 {
            let report = controller.update(&ControlInput::default(), &world, Vec3::ZERO, FRAME);
            landings += report
                .events
                .iter()
                .filter(|event| matches!(event, ControllerEvent::Landed { .. }))
                .count();
        }

        assert_eq!(landings, 1, "landed once and stayed down");
        assert!(controller.state.grounded);
        assert_eq!(controller.view().chain_count, 0);
    }

    #[test]
    fn test_jump_reads_previous_frame_classification() {
        let world = floor_world();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(0.0, 0.95, 0.0));
        let press = ControlInput {
            jump_pressed: true,
            ..Default::default()
        };

        // Lands this frame, but the jump was evaluated before the integrator
        let report = controller.update(&press, &world, Vec3::ZERO, FRAME);
        assert_eq!(report.jump(), None);
        assert!(controller.state.grounded);

        // Next frame sees the grounded classification
        let report = controller.update(&press, &world, Vec3::ZERO, FRAME);
        assert!(report.jump().is_some());
        assert!(controller.state.velocity.y > 0.0);
    }

    #[test]
    fn test_wall_jump_fires_once_per_contact() {
        let mut world = floor_world();
        world.add_box(Vec3::new(5.5, 20.0, 0.0), Vec3::new(0.5, 20.0, 20.0), ContentFlags::SOLID);

        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(4.5, 10.0, 0.0));
        controller.state.velocity = Vec3::new(4.0, -5.0, 0.0);

        controller.update(&ControlInput::default(), &world, Vec3::ZERO, FRAME);
        assert!(controller.view().touching_wall);

        let press = ControlInput {
            jump_pressed: true,
            ..Default::default()
        };
        let mut wall_jumps = 0;
        for _ in 0..2 {
            let report = controller.update(&press, &world, Vec3::ZERO, FRAME);
            if report.jump() == Some(JumpKind::Wall) {
                wall_jumps += 1;
            }
        }

        assert_eq!(wall_jumps, 1);
        assert!(controller.state.velocity.x < 0.0, "kicked away from the wall");
        assert!(controller.state.velocity.y > 0.0);
    }

    #[test]
    fn test_impulse_applies_on_next_update() {
        let world = floor_world();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0));
        settle(&mut controller, &world);

        controller.push_impulse(Vec3::new(0.0, 8.0, 0.0));
        assert!(controller.state.grounded, "not applied until the next update");
        assert_eq!(controller.state.velocity.y, 0.0);

        controller.update(&ControlInput::default(), &world, Vec3::ZERO, FRAME);
        assert!(!controller.state.grounded);
        assert!(controller.state.velocity.y > 7.0);
        assert_eq!(controller.pending_impulses(), 0);
    }

    #[test]
    fn test_speed_override_caps_run() {
        let world = floor_world();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0));
        controller.speed_override = Some(2.0);
        settle(&mut controller, &world);

        for _ in 0..180 {
            controller.update(&run_forward(), &world, Vec3::ZERO, FRAME);
        }

        let speed = controller.state.horizontal_speed();
        assert!((speed - 2.0).abs() < 0.05, "speed={}", speed);
    }

    #[test]
    fn test_releasing_input_decelerates() {
        let world = floor_world();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0));
        settle(&mut controller, &world);

        for _ in 0..60 {
            controller.update(&run_forward(), &world, Vec3::ZERO, FRAME);
        }
        let running = controller.state.horizontal_speed();

        for _ in 0..120 {
            controller.update(&ControlInput::default(), &world, Vec3::ZERO, FRAME);
        }
        assert!(controller.state.horizontal_speed() < running * 0.1);
    }

    #[test]
    fn test_slick_ground_slides_further() {
        let mut ice = CollisionWorld::new();
        ice.add_box_with_surface(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(200.0, 0.5, 200.0),
            ContentFlags::SOLID,
            SurfaceFlags::SLICK,
        );

        let coast = |world: &CollisionWorld| {
            let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0));
            settle(&mut controller, world);
            for _ in 0..120 {
                controller.update(&run_forward(), world, Vec3::ZERO, FRAME);
            }
            for _ in 0..20 {
                controller.update(&ControlInput::default(), world, Vec3::ZERO, FRAME);
            }
            controller.state.horizontal_speed()
        };

        let on_ice = coast(&ice);
        let on_floor = coast(&floor_world());
        assert!(on_ice > on_floor * 2.0, "ice={} floor={}", on_ice, on_floor);
    }

    #[test]
    fn test_spawn_at_pushes_out_of_floor() {
        let world = floor_world();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::ZERO);

        // Half a metre into the floor
        controller.spawn_at(Vec3::new(0.0, 0.4, 0.0), &world);

        assert!(controller.state.position.y >= 0.9 - 1e-3, "pos={:?}", controller.state.position);
        assert!(!world.point_in_solid(
            controller.state.position + Vec3::Y * 0.01,
            controller.config.shape,
            ContentFlags::MASK_PLAYER_SOLID
        ));
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let world = CollisionWorld::new();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec3::new(0.0, 10.0, 0.0));

        controller.update(&ControlInput::default(), &world, Vec3::ZERO, 5.0);

        let max_dt = controller.config.max_frame_delta;
        let expected_vy = -controller.config.gravity * max_dt;
        assert!((controller.state.velocity.y - expected_vy).abs() < 1e-4);
    }
}
