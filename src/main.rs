//! Headless demo: stream a world around a scripted player walk and print
//! what the simulation does.
//!
//! ```text
//! emberwild [--seed N] [--ticks N] [--config path.json]
//! ```

use emberwild::core::Error;
use emberwild::sim::{InputIntent, SimConfig, SimEvent, World};
use glam::Vec3;

struct Args {
    seed: Option<u32>,
    ticks: u64,
    config: Option<std::path::PathBuf>,
}

fn parse_args() -> Result<Args, Error> {
    let mut args = Args {
        seed: None,
        ticks: 600,
        config: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .ok_or_else(|| Error::Config(format!("{name} requires a value")))
        };
        match arg.as_str() {
            "--seed" => {
                args.seed = Some(
                    value("--seed")?
                        .parse()
                        .map_err(|_| Error::Config("--seed must be a u32".into()))?,
                );
            }
            "--ticks" => {
                args.ticks = value("--ticks")?
                    .parse()
                    .map_err(|_| Error::Config("--ticks must be a u64".into()))?;
            }
            "--config" => {
                args.config = Some(value("--config")?.into());
            }
            other => {
                return Err(Error::Config(format!("unknown argument '{other}'")));
            }
        }
    }
    Ok(args)
}

fn run() -> Result<(), Error> {
    emberwild::core::logging::init();
    let args = parse_args()?;

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    log::info!("world seed {}", config.seed);

    let mut world = World::new(config);
    world.spawn_player(0.0, 0.0);

    // Scripted input: run east, sprint on every third second.
    let dt = 1.0 / 60.0;
    let mut deaths = 0u32;
    let mut damage_events = 0u32;
    for tick in 0..args.ticks {
        let second = tick / 60;
        let input = InputIntent {
            move_dir: Vec3::new(1.0, 0.0, 0.0),
            sprint: second % 3 == 2,
            ..Default::default()
        };
        world.update(&input, dt);

        for event in world.drain_events() {
            match &event {
                SimEvent::AgentDied { .. } => deaths += 1,
                SimEvent::DamageApplied { .. } | SimEvent::PlayerDamaged { .. } => {
                    damage_events += 1
                }
                _ => {}
            }
            log::info!("{event:?}");
        }

        if tick % 60 == 0 {
            if let Some(player) = world.player() {
                let p = player.position;
                let biome = world.height.biome_at(p.x, p.z);
                log::info!(
                    "t={:>4} pos=({:6.1}, {:5.1}, {:6.1}) {:?} state={:?} hp={:.0} stamina={:.0}",
                    tick,
                    p.x,
                    p.y,
                    p.z,
                    biome,
                    player.locomotion.state,
                    player.hp,
                    player.locomotion.stamina,
                );
            }
        }
    }

    log::info!(
        "done: {} ticks, {} chunks resident, {} agents, {} damage events, {} deaths",
        world.clock.tick(),
        world.streamer.len(),
        world.agent_count(),
        damage_events,
        deaths,
    );
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
