//! Skyhop - headless runner.
//!
//! Plays a scripted input tape through the simulation and logs what the
//! player does. Usage:
//!
//! ```text
//! skyhop [TUNING.json] [--level NAME] [--classic]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use skyhop_game::{LevelCatalog, MovementConfig, RawInput, Simulation, SimulationConfig};

/// Command line options.
#[derive(Debug, Default)]
struct Options {
    tuning: Option<PathBuf>,
    level: Option<String>,
    classic: bool,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut options = Self::default();
        let mut args = args.peekable();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--level" => {
                    let name = args.next().context("--level needs a level name")?;
                    options.level = Some(name);
                }
                "--classic" => options.classic = true,
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                path => options.tuning = Some(PathBuf::from(path)),
            }
        }

        Ok(options)
    }
}

/// One stretch of the input tape: hold `input` for `frames` ticks.
struct Segment {
    label: &'static str,
    frames: u32,
    input: fn(&Simulation) -> RawInput,
}

fn idle(_: &Simulation) -> RawInput {
    RawInput::default()
}

fn run(_: &Simulation) -> RawInput {
    let mut input = RawInput::default();
    input.movement.forward = true;
    input
}

/// Run forward and hop on landing. Jump is tapped on alternate frames so
/// a rejected press doesn't leave the key held.
fn chain_jumps(sim: &Simulation) -> RawInput {
    let mut input = run(sim);
    input.actions.jump = sim.view().grounded && sim.frame % 2 == 0;
    input
}

/// Run forward holding the long jump modifier and hop on every landing.
fn long_jumps(sim: &Simulation) -> RawInput {
    let mut input = chain_jumps(sim);
    input.actions.long_jump = true;
    input
}

fn turn_around(_: &Simulation) -> RawInput {
    RawInput {
        mouse_delta: (std::f32::consts::PI / 0.002 / 30.0, 0.0),
        ..Default::default()
    }
}

const TAPE: &[Segment] = &[
    Segment { label: "settle", frames: 60, input: idle },
    Segment { label: "run", frames: 30, input: run },
    Segment { label: "chain jumps", frames: 150, input: chain_jumps },
    Segment { label: "turn", frames: 30, input: turn_around },
    Segment { label: "stop", frames: 60, input: idle },
    Segment { label: "run", frames: 30, input: run },
    Segment { label: "long jumps", frames: 90, input: long_jumps },
    Segment { label: "stop", frames: 60, input: idle },
];

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::parse(std::env::args().skip(1))?;

    let mut config = match &options.tuning {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading tuning file {}", path.display()))?;
            SimulationConfig::from_json_str(&json)
                .with_context(|| format!("parsing tuning file {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if options.classic {
        config.movement = MovementConfig::classic();
    }

    let mut sim = Simulation::new(config, LevelCatalog::builtin());
    if let Some(name) = &options.level {
        // Running a level directly skips the star gates
        let level = name.parse()?;
        sim.progress_mut().unlocked.insert(level);
        sim.request_level(level)?;
        sim.step(&RawInput::default());
    }

    for segment in TAPE {
        log::info!("-- {} ({} frames)", segment.label, segment.frames);
        for _ in 0..segment.frames {
            let input = (segment.input)(&sim);
            let report = sim.step(&input);

            if let Some(kind) = report.controller.jump() {
                let view = sim.view();
                log::info!(
                    "frame {}: {:?} chain={} vy={:.2}",
                    sim.frame,
                    kind,
                    view.chain_count,
                    view.velocity.y
                );
            }
            if report.respawned {
                log::info!("frame {}: respawned", sim.frame);
            }
        }

        let view = sim.view();
        log::info!(
            "pos=({:.2}, {:.2}, {:.2}) speed={:.2} grounded={} wall={} stars={} level={}",
            view.position.x,
            view.position.y,
            view.position.z,
            glam::Vec2::new(view.velocity.x, view.velocity.z).length(),
            view.grounded,
            view.touching_wall,
            sim.progress().stars,
            sim.level()
        );
        if let Some(notice) = sim.notice() {
            log::info!("notice: {}", notice);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_options() {
        let options = Options::parse(args(&["tuning.json", "--level", "ice", "--classic"])).unwrap();
        assert_eq!(options.tuning, Some(PathBuf::from("tuning.json")));
        assert_eq!(options.level.as_deref(), Some("ice"));
        assert!(options.classic);
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        assert!(Options::parse(args(&["--fly"])).is_err());
        assert!(Options::parse(args(&["--level"])).is_err());
    }
}
