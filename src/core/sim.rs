use crate::command::CommandServer;
use crate::config::{SimConfig, SweepMode};
use crate::core::boundary::{resolve_boundaries, WallImpulses};
use crate::core::collision::{sweep_all, sweep_grid};
use crate::core::diagnostics::{kinetic_energy, PhaseTimings, PressureReading};
use crate::core::grid::SpatialGrid;
use crate::core::integrator::integrate;
use crate::core::particle::generate_grid;
use crate::core::vector::Vec2;
use crate::core::{Particle, Piston};
use crate::error::{Error, Result};
use log::{debug, info, trace};
use rand::{rngs::StdRng, SeedableRng};
use std::fmt;
use std::time::{Duration, Instant};

/// What the tick loop hands to a renderer once per iteration.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub iteration: u64,
    /// The first `SimConfig::visualized` particles.
    pub particles: &'a [Particle],
    pub piston: &'a Piston,
    pub box_size: Vec2,
}

/// Drawing backend. Rendering lives outside this crate; implementors receive a
/// read-only view of the state between ticks.
pub trait Visualizer {
    fn draw(&mut self, frame: &Frame<'_>);
}

/// Visualizer that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVisualizer;

impl Visualizer for NullVisualizer {
    fn draw(&mut self, _frame: &Frame<'_>) {}
}

/// Totals reported when a run reaches its stop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub iterations: u64,
    pub elapsed: Duration,
    pub timings: PhaseTimings,
    pub collisions: u64,
    pub energy: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "iterations:        {}", self.iterations)?;
        writeln!(f, "run time:          {} ms", self.elapsed.as_millis())?;
        writeln!(f, "{}", self.timings)?;
        writeln!(f, "collisions:        {}", self.collisions)?;
        write!(f, "energy:            {}", self.energy)
    }
}

/// Fixed-timestep gas in a box closed by a piston.
///
/// Configuration is immutable after construction. Each call to `step` runs the whole
/// tick: integrate, wall and piston contacts, grid rebuild, pair sweep. External control
/// goes through `set_piston_position` and friends, which are only ever called between
/// ticks (directly, or by a `CommandServer` draining its queue).
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    pub particles: Vec<Particle>,
    pub piston: Piston,
    grid: SpatialGrid,
    impulses: WallImpulses,
    ticks_since_reset: u64,
    iteration: u64,
    collisions: u64,
    timings: PhaseTimings,
}

impl Simulation {
    /// Validate `config` and generate the particle groups it describes.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut particles = Vec::with_capacity(config.particle_count());
        for g in &config.groups {
            particles.extend(generate_grid(
                g.origin,
                g.extent,
                g.count_per_axis,
                g.mass,
                g.radius,
                g.speed,
                &mut rng,
            )?);
        }
        debug!(
            "generated {} particles in {} group(s), seed {}",
            particles.len(),
            config.groups.len(),
            config.seed
        );
        Self::assemble(config, particles)
    }

    /// Build a simulation around caller-supplied particles; `config.groups` is ignored.
    pub fn with_particles(config: SimConfig, particles: Vec<Particle>) -> Result<Self> {
        config.validate_frame()?;
        Self::assemble(config, particles)
    }

    fn assemble(config: SimConfig, particles: Vec<Particle>) -> Result<Self> {
        let mut piston = Piston::new(
            config.piston.mass,
            config.piston.position,
            config.piston.active,
        )?;
        piston.set_force(config.piston.force)?;
        let grid = SpatialGrid::new(config.grid_degree)?;
        Ok(Self {
            config,
            particles,
            piston,
            grid,
            impulses: WallImpulses::default(),
            ticks_since_reset: 0,
            iteration: 0,
            collisions: 0,
            timings: PhaseTimings::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Completed ticks since construction.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Completed ticks since the impulse accumulators were last reset.
    pub fn ticks_since_reset(&self) -> u64 {
        self.ticks_since_reset
    }

    /// Particle-particle collisions resolved so far.
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    pub fn impulses(&self) -> &WallImpulses {
        &self.impulses
    }

    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    /// Broad-phase grid as of the last tick.
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Total kinetic energy of the gas (the piston is not included).
    pub fn kinetic_energy(&self) -> f64 {
        kinetic_energy(&self.particles)
    }

    /// Time-averaged wall pressures since the last reset.
    pub fn pressure(&self) -> PressureReading {
        PressureReading::from_impulses(
            &self.impulses,
            self.config.dt,
            self.config.height,
            self.piston.position,
            self.ticks_since_reset,
        )
    }

    /// Move the piston face and restart pressure averaging.
    ///
    /// Errors: `Error::InvalidParam` if `position` is not in `(0, width]`.
    pub fn set_piston_position(&mut self, position: f64) -> Result<()> {
        if position > self.config.width {
            return Err(Error::InvalidParam(format!(
                "piston position {position} lies outside the box width {}",
                self.config.width
            )));
        }
        self.piston.set_position(position)?;
        self.reset_pressure();
        info!("piston moved to x = {position}; pressure accumulators reset");
        Ok(())
    }

    /// Set the constant force pushing the piston towards x = 0.
    pub fn set_piston_force(&mut self, force: f64) -> Result<()> {
        self.piston.set_force(force)
    }

    pub fn set_piston_active(&mut self, active: bool) {
        self.piston.active = active;
    }

    /// Zero the wall impulse accumulators and the averaging tick counter.
    pub fn reset_pressure(&mut self) {
        self.impulses.reset();
        self.ticks_since_reset = 0;
    }

    /// Advance the whole system by one timestep.
    pub fn step(&mut self) {
        let dt = self.config.dt;

        let t0 = Instant::now();
        integrate(&mut self.particles, &mut self.piston, dt);
        let t1 = Instant::now();

        resolve_boundaries(
            &mut self.particles,
            &mut self.piston,
            self.config.height,
            &mut self.impulses,
        );
        let t2 = Instant::now();

        let resolved = match self.config.sweep {
            SweepMode::Grid => {
                self.grid
                    .rebuild(&self.particles, self.piston.position, self.config.height);
                let t3 = Instant::now();
                self.timings.grid_update += t3 - t2;
                let n = sweep_grid(&mut self.particles, &self.grid);
                self.timings.object_collisions += t3.elapsed();
                n
            }
            SweepMode::Full => {
                let n = sweep_all(&mut self.particles);
                self.timings.object_collisions += t2.elapsed();
                n
            }
        };

        self.timings.movement += t1 - t0;
        self.timings.wall_collisions += t2 - t1;
        self.collisions += resolved;
        self.ticks_since_reset += 1;
        self.iteration += 1;
        trace!(
            "tick {}: {} collisions, piston x = {:.3}",
            self.iteration,
            resolved,
            self.piston.position
        );
    }

    /// Advance by `n` ticks.
    pub fn advance(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Run until `config.stop_iteration`, serving queued commands between ticks.
    ///
    /// Each iteration drains `commands` (if any), draws a frame, then steps. Commands
    /// therefore always observe and modify state at a tick boundary.
    pub fn run(
        &mut self,
        commands: Option<&CommandServer>,
        visualizer: &mut dyn Visualizer,
    ) -> RunSummary {
        let start = Instant::now();
        let visualized = self.config.visualized.min(self.particles.len());
        let box_size = Vec2::new(self.config.width, self.config.height);
        info!(
            "running {} particles until iteration {}",
            self.particles.len(),
            self.config.stop_iteration
        );

        while self.iteration < self.config.stop_iteration {
            if let Some(server) = commands {
                server.serve_pending(self);
            }

            let t0 = Instant::now();
            visualizer.draw(&Frame {
                iteration: self.iteration,
                particles: &self.particles[..visualized],
                piston: &self.piston,
                box_size,
            });
            self.timings.visualization += t0.elapsed();

            self.step();
            if self.iteration % 100 == 0 {
                debug!(
                    "iteration {}: E = {:.6}, collisions = {}",
                    self.iteration,
                    self.kinetic_energy(),
                    self.collisions
                );
            }
        }

        let summary = RunSummary {
            iterations: self.iteration,
            elapsed: start.elapsed(),
            timings: self.timings,
            collisions: self.collisions,
            energy: self.kinetic_energy(),
        };
        info!(
            "stopped at iteration {} after {} ms",
            summary.iterations,
            summary.elapsed.as_millis()
        );
        summary
    }
}
