//! pistongas CLI
//!
//! Runs the gas until the stop iteration while reading operator commands from stdin,
//! then prints per-phase timings and the collision count.

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use pistongas::command::{self, CommandInterface};
use pistongas::config::{SimConfig, SweepMode};
use pistongas::core::{Frame, Simulation, Visualizer};

/// 2D hard-disc gas with a movable piston
#[derive(Parser)]
#[command(name = "pistongas")]
#[command(about = "Simulate a 2D gas compressed by a piston", long_about = None)]
struct Cli {
    /// JSON configuration file (missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Buckets per axis of the broad-phase grid
    #[arg(long)]
    grid_degree: Option<usize>,

    /// Iteration at which the run stops
    #[arg(long)]
    stop_iteration: Option<u64>,

    /// Let the piston move and exchange momentum with the gas
    #[arg(long)]
    piston_active: bool,

    /// Piston mass
    #[arg(long)]
    piston_mass: Option<f64>,

    /// Constant force pushing the piston towards x = 0
    #[arg(long)]
    piston_force: Option<f64>,

    /// Number of particles handed to the visualizer
    #[arg(long)]
    visualized: Option<usize>,

    /// Seed for initial velocity directions
    #[arg(long)]
    seed: Option<u64>,

    /// Test every particle pair instead of using the grid
    #[arg(long)]
    full_sweep: bool,

    /// Do not read commands from stdin
    #[arg(long)]
    no_commands: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn build_config(&self) -> Result<SimConfig> {
        let mut cfg = match &self.config {
            Some(path) => SimConfig::from_json_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => SimConfig::default(),
        };
        if let Some(n) = self.grid_degree {
            cfg.grid_degree = n;
        }
        if let Some(n) = self.stop_iteration {
            cfg.stop_iteration = n;
        }
        if self.piston_active {
            cfg.piston.active = true;
        }
        if let Some(m) = self.piston_mass {
            cfg.piston.mass = m;
        }
        if let Some(f) = self.piston_force {
            cfg.piston.force = f;
        }
        if let Some(n) = self.visualized {
            cfg.visualized = n;
        }
        if let Some(s) = self.seed {
            cfg.seed = s;
        }
        if self.full_sweep {
            cfg.sweep = SweepMode::Full;
        }
        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }
}

/// Stand-in for a window: logs a short summary of the drawn particles.
struct LogVisualizer {
    every: u64,
}

impl Visualizer for LogVisualizer {
    fn draw(&mut self, frame: &Frame<'_>) {
        if frame.iteration % self.every != 0 {
            return;
        }
        let energy: f64 = frame.particles.iter().map(|p| p.kinetic_energy()).sum();
        debug!(
            "frame {}: {} particles drawn (E = {:.4}), piston at x = {:.2} in {}x{} box",
            frame.iteration,
            frame.particles.len(),
            energy,
            frame.piston.position,
            frame.box_size.x,
            frame.box_size.y
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("pistongas v{}", env!("CARGO_PKG_VERSION"));

    let cfg = cli.build_config()?;
    info!(
        "{} particles, grid {}x{}, piston {} (mass {})",
        cfg.particle_count(),
        cfg.grid_degree,
        cfg.grid_degree,
        if cfg.piston.active { "active" } else { "fixed" },
        cfg.piston.mass
    );
    let mut sim = Simulation::new(cfg).context("building simulation")?;

    let (client, server) = command::channel();
    let reader = if cli.no_commands {
        drop(client);
        None
    } else {
        let handle = thread::Builder::new()
            .name("commands".into())
            .spawn(move || {
                let stdin = std::io::stdin().lock();
                CommandInterface::new(stdin, std::io::stdout(), client).run()
            })
            .context("spawning command reader")?;
        Some(handle)
    };

    let summary = sim.run(Some(&server), &mut LogVisualizer { every: 100 });
    drop(server);

    println!("{summary}");

    if let Some(handle) = reader {
        settle_reader(handle, READER_GRACE)?;
    }
    Ok(())
}

/// How long the command reader gets to notice the run has ended.
const READER_GRACE: Duration = Duration::from_millis(200);

/// Join the command reader if it finishes within `grace`.
///
/// A reader parked in a blocking stdin read cannot be woken, so past the grace period the
/// process exits without it. Returns whether the reader was joined.
fn settle_reader(handle: JoinHandle<pistongas::Result<()>>, grace: Duration) -> Result<bool> {
    let deadline = Instant::now() + grace;
    while !handle.is_finished() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    if !handle.is_finished() {
        warn!("command reader still blocked on input; exiting without joining it");
        return Ok(false);
    }
    match handle.join() {
        Ok(res) => res.context("command reader failed")?,
        Err(_) => warn!("command reader panicked"),
    }
    Ok(true)
}
