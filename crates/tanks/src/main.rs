//! Tank Arena - headless tank battle runner

use anyhow::{Context, Result};
use clap::Parser;
use engine_core::Time;
use std::path::PathBuf;
use tanks::{ArenaConfig, Simulation};

/// Run a tank battle without a window and log how it goes.
#[derive(Parser, Debug)]
#[command(name = "tank-arena")]
#[command(about = "Run a headless tank battle")]
struct Args {
    /// Arena config file (defaults to ./arena.ron, or built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds before the battle is called
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Fixed timestep in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    step: f32,

    /// Override the config's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pace the simulation against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Seconds between scoreboard log lines (0 disables)
    #[arg(long, default_value_t = 10.0)]
    report_every: f32,

    /// Write the effective config to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ArenaConfig::from_path(path).with_context(|| format!("loading {}", path.display()))?,
        None => ArenaConfig::load(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    if let Some(path) = &args.write_config {
        config
            .save_to(path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote config to {}", path.display());
        return Ok(());
    }

    anyhow::ensure!(args.step > 0.0, "--step must be positive (got {})", args.step);

    let mut sim = Simulation::new(config).context("setting up the arena")?;
    log::info!(
        "Battle starting: {} tanks, seed {}, {:.0}s at {:.4}s per tick",
        sim.scoreboard().len(),
        sim.config().seed,
        args.seconds,
        args.step
    );
    sim.start_all();

    let mut next_report = args.report_every;
    let mut time = Time::new(args.step);

    while sim.elapsed() < args.seconds {
        if args.realtime {
            let due = time.poll();
            if due == 0 {
                std::thread::sleep(time.until_next_step());
                continue;
            }
            for _ in 0..due {
                sim.tick(args.step);
            }
        } else {
            sim.tick(args.step);
        }

        if args.report_every > 0.0 && sim.elapsed() >= next_report {
            next_report += args.report_every;
            log::info!("t = {:.1}s", sim.elapsed());
            for status in sim.scoreboard() {
                log::info!("  {}", status);
            }
        }

        let teams = sim.surviving_teams();
        if teams.len() <= 1 {
            match teams.first() {
                Some(team) => log::info!("Team {} wins after {:.1}s", team, sim.elapsed()),
                None => log::info!("No tanks left standing after {:.1}s", sim.elapsed()),
            }
            break;
        }
    }

    println!(
        "Final scoreboard after {:.1}s ({} frames, {} messages):",
        sim.elapsed(),
        sim.frames(),
        sim.messenger().sent_count()
    );
    for status in sim.scoreboard() {
        println!("  {}", status);
    }
    Ok(())
}
