//! Headless demo: walks an avatar around an arena, chases a minion, and
//! prints the resulting reports.
//!
//! Usage: `arena_nav [config.ron|config.json] [map.png]`

use std::path::Path as FsPath;

use arena_nav::prelude::*;

const FRAME: f32 = 1.0 / 60.0;

/// Border walls plus a centre wall with a gap at the top
fn generated_arena() -> Result<WalkabilityBitmap, NavError> {
    WalkabilityBitmap::from_fn(200, 200, |u, v| {
        let border = u < 4 || v < 4 || u >= 196 || v >= 196;
        let centre_wall = (96..104).contains(&u) && !(140..160).contains(&v);
        if border || centre_wall { 255 } else { WalkabilityBitmap::OPEN }
    })
}

fn load_config(path: Option<&str>) -> Result<SimulationConfig, ConfigError> {
    match path {
        Some(p) if p.ends_with(".json") => SimulationConfig::load_json(p),
        Some(p) => SimulationConfig::load_ron(p),
        None => Ok(SimulationConfig::default()),
    }
}

fn run_frames(sim: &mut Simulation, frames: usize) {
    for _ in 0..frames {
        let outcome = sim.step(FRAME);
        if let Some(report) = outcome.report {
            log::debug!("report #{}: ({:.2}, {:.2})", report.seq, report.x, report.z);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match load_config(args.first().map(String::as_str)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    let spawn = Vec2::new(-20.0, 0.0);
    let mut sim = match args.get(1) {
        Some(map) => {
            let mut sim = Simulation::new(config, spawn);
            let pending = PendingBitmap::spawn(FsPath::new(map));
            while sim.poll_map_load(&pending) == OracleStatus::Pending {
                std::thread::sleep(std::time::Duration::from_millis(5));
            }
            sim
        }
        None => match generated_arena() {
            Ok(bitmap) => Simulation::with_bitmap(config, bitmap, spawn),
            Err(e) => {
                eprintln!("Map error: {e}");
                std::process::exit(1);
            }
        },
    };

    if sim.nav().status() != OracleStatus::Ready {
        eprintln!("Map failed to load; nothing is walkable");
        std::process::exit(1);
    }

    sim.set_team(Some(Team::Blue));
    sim.apply_minion_snapshot(&[
        MinionSnapshot::at(MinionId(1), Vec2::new(20.0, 5.0))
            .with_team(Team::Red)
            .with_velocity(Vec2::new(-1.0, 0.0)),
        MinionSnapshot::at(MinionId(2), Vec2::new(-25.0, -5.0)).with_team(Team::Blue),
    ]);

    // Walk around the centre wall
    match sim.command_move(Vec2::new(20.0, 0.0)) {
        Some(marker) => log::info!(
            "Moving to {marker} via {} waypoints",
            sim.avatar().current_path().len()
        ),
        None => log::warn!("Move refused"),
    }
    run_frames(&mut sim, 240);

    // Chase the enemy minion while it drifts
    if sim.command_attack(TargetRef::Minion(MinionId(1))) {
        log::info!("Chasing minion 1");
    }
    for frame in 0..180u32 {
        if frame % 6 == 0 {
            let x = 20.0 - frame as f32 / 60.0;
            sim.apply_minion_updates(&[MinionSnapshot::at(MinionId(1), Vec2::new(x, 5.0))
                .with_team(Team::Red)
                .with_velocity(Vec2::new(-1.0, 0.0))]);
        }
        sim.step(FRAME);
    }

    // The server drops the minion; pursuit ends
    sim.apply_minions_removed(&[MinionId(1)]);
    run_frames(&mut sim, 2);

    let snapshot = sim.debug_snapshot();
    for line in snapshot.lines() {
        log::info!("{line}");
    }
    match snapshot.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Snapshot error: {e}"),
    }
}
