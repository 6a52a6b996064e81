//! End-to-end scenarios through the frame driver.

use glam::Vec3;
use skyhop_game::{Entity, JumpKind, LevelId, RawInput, Simulation};

fn forward() -> RawInput {
    let mut input = RawInput::default();
    input.movement.forward = true;
    input
}

fn settle(sim: &mut Simulation) {
    for _ in 0..90 {
        sim.step(&RawInput::default());
    }
    assert!(sim.view().grounded);
}

/// Walk from the hub centre toward a portal until its notice appears.
fn walk_to_portal(sim: &mut Simulation, target: Vec3, expected_notice: &str) {
    let from = sim.view().position;
    sim.set_camera_yaw((target.z - from.z).atan2(target.x - from.x));

    for _ in 0..600 {
        sim.step(&forward());
        if sim.notice() == Some(expected_notice) {
            return;
        }
    }
    panic!(
        "never reached portal at {:?}, ended at {:?} with notice {:?}",
        target,
        sim.view().position,
        sim.notice()
    );
}

#[test]
fn test_enter_grass_through_portal() {
    let mut sim = Simulation::with_defaults();
    settle(&mut sim);

    walk_to_portal(&mut sim, Vec3::new(-10.0, 1.0, 8.0), "Press 'E' to enter Grass");

    let mut input = RawInput::default();
    input.actions.interact = true;
    let report = sim.step(&input);

    assert_eq!(report.level_loaded, Some(LevelId::Grass));
    assert_eq!(sim.level(), LevelId::Grass);
    assert_eq!(sim.view().position, Vec3::new(0.0, 10.5, 0.0));
}

#[test]
fn test_locked_portal_shows_missing_stars() {
    let mut sim = Simulation::with_defaults();
    settle(&mut sim);

    walk_to_portal(&mut sim, Vec3::new(10.0, 1.0, 8.0), "Need 3 more stars!");

    let mut input = RawInput::default();
    input.actions.interact = true;
    let report = sim.step(&input);

    assert_eq!(report.level_loaded, None);
    assert_eq!(sim.level(), LevelId::Hub);
}

#[test]
fn test_star_collected_and_removed() {
    let mut sim = Simulation::with_defaults();
    sim.request_level(LevelId::Grass).unwrap();
    sim.step(&RawInput::default());

    let stars_in_level = |sim: &Simulation| {
        sim.entities()
            .iter()
            .filter(|(_, entity)| matches!(entity, Entity::Star(_)))
            .count()
    };
    assert_eq!(stars_in_level(&sim), 5);

    // Falling from the spawn passes through the star above the origin
    let mut collected = 0;
    for _ in 0..60 {
        collected += sim.step(&RawInput::default()).stars_collected;
    }
    assert_eq!(collected, 1);
    assert_eq!(sim.progress().stars, 1);

    // Still in the arena until its removal comes due
    assert_eq!(stars_in_level(&sim), 5);
    for _ in 0..90 {
        sim.step(&RawInput::default());
    }
    assert_eq!(stars_in_level(&sim), 4);
    assert_eq!(sim.progress().stars, 1);
}

#[test]
fn test_lava_sends_player_back_to_spawn() {
    let mut sim = Simulation::with_defaults();
    sim.progress_mut().stars = 15;
    sim.request_level(LevelId::Lava).unwrap();
    sim.step(&RawInput::default());

    let spawn = sim.spawn_point();
    assert_eq!(spawn, Vec3::new(0.0, 14.5, 0.0));

    // Off the edge of every platform
    sim.controller_mut().state.position = Vec3::new(20.0, 0.0, 20.0);

    let mut respawned = false;
    for _ in 0..120 {
        if sim.step(&RawInput::default()).respawned {
            respawned = true;
            break;
        }
    }

    assert!(respawned);
    assert_eq!(sim.view().position, spawn);
    assert_eq!(sim.view().velocity, Vec3::ZERO);
}

#[test]
fn test_triple_jump_in_hub() {
    let mut sim = Simulation::with_defaults();
    settle(&mut sim);

    let mut kinds = Vec::new();
    let mut max_scale: f32 = 1.0;

    for _ in 0..600 {
        let view = sim.view();
        let speed = Vec3::new(view.velocity.x, 0.0, view.velocity.z).length();

        let mut input = forward();
        input.actions.jump = view.grounded && speed > 5.5;

        let report = sim.step(&input);
        if let Some(kind) = report.controller.jump() {
            kinds.push(kind);
        }
        max_scale = max_scale.max(sim.view().scale_factor);

        if kinds.len() == 3 {
            break;
        }
    }

    assert_eq!(
        kinds,
        vec![JumpKind::Chain(1), JumpKind::Chain(2), JumpKind::Chain(3)]
    );
    assert_eq!(sim.view().chain_count, 3);
    assert!(max_scale > 1.0);
    assert_eq!(sim.level(), LevelId::Hub);
}

#[test]
fn test_restart_from_any_level() {
    let mut sim = Simulation::with_defaults();
    sim.request_level_by_name("grass").unwrap();
    sim.step(&RawInput::default());
    assert_eq!(sim.level(), LevelId::Grass);

    let mut input = RawInput::default();
    input.actions.restart = true;
    sim.step(&input);

    assert_eq!(sim.level(), LevelId::Hub);
    assert_eq!(sim.view().position, Vec3::new(0.0, 2.0, 0.0));
}
