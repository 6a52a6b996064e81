//! Movement integrator: gravity, swept slide resolution and the ground/wall
//! classification the jump machine reads on the next frame.

use glam::Vec3;

use crate::collision::{CollisionQuery, ContentFlags, SurfaceFlags, TraceShape};

use super::config::MovementConfig;
use super::state::{ControllerEvent, ControllerState, WallContact};

/// Most contact planes remembered during one slide.
const MAX_CLIP_PLANES: usize = 5;

/// Clip velocity against a surface normal.
///
/// Removes the component of velocity going into the surface. With an
/// `overbounce` of `1.0` the result is exactly perpendicular to `normal`;
/// larger values push slightly away to avoid sticking.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal);

    let adjusted_backoff = if backoff < 0.0 {
        backoff * overbounce
    } else {
        backoff / overbounce
    };

    velocity - normal * adjusted_backoff
}

/// Summary of a slide move.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlideOutcome {
    /// Number of surfaces the shape touched.
    pub contacts: usize,
    /// Whether motion was stopped entirely (pinned in a corner or embedded).
    pub blocked: bool,
}

/// Move through the world, sliding along every surface that is hit.
///
/// Each iteration casts the shape along the remaining displacement plus
/// `skin_width`. On a hit the shape advances to the contact minus the skin
/// and the velocity loses its component along the contact normal, so a
/// glancing hit keeps the tangential motion. The remaining frame time is
/// then spent with the clipped velocity.
pub fn slide_move<Q: CollisionQuery + ?Sized>(
    world: &Q,
    position: &mut Vec3,
    velocity: &mut Vec3,
    shape: TraceShape,
    delta_time: f32,
    config: &MovementConfig,
) -> SlideOutcome {
    let mut outcome = SlideOutcome::default();
    let mut time_remaining = delta_time;
    let original_velocity = *velocity;
    let mut planes = [Vec3::ZERO; MAX_CLIP_PLANES];
    let mut num_planes = 0;

    for _ in 0..config.max_slide_iterations.max(1) {
        let displacement = *velocity * time_remaining;
        let length = displacement.length();
        if length < 1.0e-6 {
            break;
        }
        let direction = displacement / length;

        let Some(hit) = world.cast_shape(
            *position,
            direction,
            length + config.skin_width,
            shape,
            ContentFlags::MASK_PLAYER_SOLID,
            &[],
        ) else {
            *position += displacement;
            return outcome;
        };

        let travel = (hit.distance - config.skin_width).clamp(0.0, length);
        *position += direction * travel;
        time_remaining *= 1.0 - travel / length;
        outcome.contacts += 1;

        log::trace!(
            "slide contact brush={} normal={:?} travel={:.3}",
            hit.brush,
            hit.normal,
            travel
        );

        if num_planes < MAX_CLIP_PLANES {
            planes[num_planes] = hit.normal;
            num_planes += 1;
        }

        // Find a clipped velocity that goes into none of the touched planes
        let mut resolved = None;
        for i in 0..num_planes {
            let clipped = clip_velocity(*velocity, planes[i], config.overbounce);
            let valid = (0..num_planes)
                .filter(|&j| j != i)
                .all(|j| clipped.dot(planes[j]) >= -0.01);
            if valid {
                resolved = Some(clipped);
                break;
            }
        }

        match resolved {
            Some(clipped) => *velocity = clipped,
            None if num_planes >= 2 => {
                // Slide along the crease between the first two planes
                let crease = planes[0].cross(planes[1]).normalize_or_zero();
                *velocity = crease * original_velocity.dot(crease);
                if velocity.dot(planes[0]) < -0.01 || velocity.dot(planes[1]) < -0.01 {
                    *velocity = Vec3::ZERO;
                }
            }
            None => *velocity = Vec3::ZERO,
        }

        if *velocity == Vec3::ZERO {
            outcome.blocked = true;
            break;
        }
    }

    outcome
}

/// Integrate one frame of motion and reclassify ground and wall contact.
///
/// Order:
/// 1. Gravity when airborne
/// 2. Lift off the resting contact by up to `skin_width` if the last frame
///    ended on the ground
/// 3. Slide move along `velocity * delta_time`
/// 4. Ground probe: walkable hit while not rising ⇒ grounded, vertical
///    velocity zeroed, shape snapped onto the contact
/// 5. Only when not grounded: side probe along the frame's horizontal
///    heading; a steep hit is a wall contact and limits the fall speed
///
/// Grounded and wall contact are never both set when this returns.
///
/// A grounded shape rests in exact contact with the floor. Casts that start
/// in exact contact have no reliable normal, so every cast near the floor
/// starts from a pose lifted by the skin and the ground snap brings the
/// shape back down.
pub fn integrate<Q: CollisionQuery + ?Sized>(
    state: &mut ControllerState,
    world: &Q,
    config: &MovementConfig,
    delta_time: f32,
    events: &mut Vec<ControllerEvent>,
) {
    let shape = config.shape;
    let was_grounded = state.grounded;
    let had_wall = state.wall_contact.is_some();
    // Still at the pose of the last landing: grounded, or launched off it this frame
    let resting = was_grounded || state.airborne_time == 0.0;

    if !state.grounded {
        state.velocity.y -= config.gravity * delta_time;
    }

    if resting {
        lift_off_ground(state, world, config);
    }

    // Heading before collisions eat the into-wall component
    let heading = state.horizontal_direction();

    slide_move(
        world,
        &mut state.position,
        &mut state.velocity,
        shape,
        delta_time,
        config,
    );

    if check_ground(state, world, config) {
        state.wall_contact = None;
        if !was_grounded {
            log::debug!("landed after {:.2}s at {:?}", state.airborne_time, state.position);
            events.push(ControllerEvent::Landed {
                airborne_time: state.airborne_time,
            });
            state.chain.on_landed();
            state.airborne_time = 0.0;
        }
        return;
    }

    if was_grounded {
        events.push(ControllerEvent::LeftGround);
    }
    state.airborne_time += delta_time;

    state.wall_contact = check_wall(state, world, config, heading);
    if let Some(contact) = state.wall_contact {
        state.velocity.y = config.wall_slide.apply(state.velocity.y);
        if !had_wall {
            log::debug!("wall contact normal={:?}", contact.normal);
            events.push(ControllerEvent::WallTouched);
        }
    }
}

/// Raise the shape by up to `skin_width`, stopping short of any ceiling.
fn lift_off_ground<Q: CollisionQuery + ?Sized>(
    state: &mut ControllerState,
    world: &Q,
    config: &MovementConfig,
) {
    let skin = config.skin_width;
    let lift = match world.cast_shape(
        state.position,
        Vec3::Y,
        skin * 2.0,
        config.shape,
        ContentFlags::MASK_PLAYER_SOLID,
        &[],
    ) {
        // Starting contact is the floor being left, not a ceiling
        Some(ceiling) if !ceiling.started_in_solid => (ceiling.distance - skin).clamp(0.0, skin),
        _ => skin,
    };
    state.position.y += lift;
}

fn check_ground<Q: CollisionQuery + ?Sized>(
    state: &mut ControllerState,
    world: &Q,
    config: &MovementConfig,
) -> bool {
    // Probe from a skin above so a resting shape never starts in contact
    let origin = state.position + Vec3::Y * config.skin_width;
    let hit = world.cast_shape(
        origin,
        Vec3::NEG_Y,
        config.ground_probe_distance + config.skin_width,
        config.shape,
        ContentFlags::MASK_PLAYER_SOLID,
        &[],
    );

    match hit {
        Some(hit) if hit.is_walkable(config.min_ground_normal) && state.velocity.y <= 0.0 => {
            state.grounded = true;
            state.ground_normal = hit.normal;
            state.ground_surface = hit.surface;
            state.velocity.y = 0.0;
            // Embedded hits report zero distance and leave the shape where it is
            state.position.y = state.position.y.min(origin.y - hit.distance);
            true
        }
        _ => {
            state.grounded = false;
            state.ground_normal = Vec3::Y;
            state.ground_surface = SurfaceFlags::NONE;
            false
        }
    }
}

fn check_wall<Q: CollisionQuery + ?Sized>(
    state: &ControllerState,
    world: &Q,
    config: &MovementConfig,
    heading: Vec3,
) -> Option<WallContact> {
    if heading == Vec3::ZERO {
        return None;
    }

    let hit = world.cast_shape(
        state.position,
        heading,
        config.wall_probe_distance + config.skin_width,
        config.shape,
        ContentFlags::MASK_PLAYER_SOLID,
        &[],
    )?;

    if hit.is_walkable(config.min_ground_normal) || hit.surface.contains(SurfaceFlags::NO_WALL_JUMP) {
        return None;
    }

    Some(WallContact {
        normal: hit.normal,
        brush: hit.brush,
    })
}

// ============================================================================
// Tests
// ============================================================================
