//! Construction-time configuration.
//!
//! Everything here is fixed for the lifetime of a `Simulation`. Values can be built in
//! code or read from a JSON file; missing fields take their defaults.

use crate::core::boundary::WALL_MARGIN;
use crate::core::collision::SEPARATION_STEP_FRACTION;
use crate::core::vector::Vec2;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A lattice of identical particles generated at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleGroup {
    /// Position of the first lattice point.
    pub origin: Vec2,
    /// Span of the lattice along x and y.
    pub extent: Vec2,
    /// Lattice points per axis; the group holds `count_per_axis^2` particles.
    pub count_per_axis: usize,
    pub mass: f64,
    pub radius: f64,
    /// Initial speed of every particle; directions are random.
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PistonConfig {
    pub mass: f64,
    /// Initial x coordinate of the piston face.
    pub position: f64,
    /// Whether the piston moves and exchanges momentum with the gas.
    pub active: bool,
    /// Constant force pushing the piston towards x = 0.
    pub force: f64,
}

impl Default for PistonConfig {
    fn default() -> Self {
        Self {
            mass: 1000.0,
            position: 1000.0,
            active: false,
            force: 0.0,
        }
    }
}

/// How overlapping pairs are found each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Test pairs sharing a grid bucket.
    #[default]
    Grid,
    /// Test every pair.
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Box width; the piston may be placed anywhere in `(0, width]`.
    pub width: f64,
    pub height: f64,
    /// Fixed timestep.
    pub dt: f64,
    /// Buckets per axis of the broad-phase grid.
    pub grid_degree: usize,
    pub sweep: SweepMode,
    /// Seed for initial velocity directions.
    pub seed: u64,
    pub groups: Vec<ParticleGroup>,
    pub piston: PistonConfig,
    /// Number of particles handed to the visualizer each frame.
    pub visualized: usize,
    /// Iteration at which `Simulation::run` stops.
    pub stop_iteration: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 900.0,
            dt: 0.1,
            grid_degree: 300,
            sweep: SweepMode::Grid,
            seed: 0,
            groups: vec![
                ParticleGroup {
                    origin: Vec2::new(50.0, 50.0),
                    extent: Vec2::new(800.0, 350.0),
                    count_per_axis: 100,
                    mass: 1.0,
                    radius: 0.01,
                    speed: 1.0,
                },
                ParticleGroup {
                    origin: Vec2::new(50.0, 500.0),
                    extent: Vec2::new(800.0, 350.0),
                    count_per_axis: 100,
                    mass: 2.0,
                    radius: 0.01,
                    speed: 1.0,
                },
            ],
            piston: PistonConfig::default(),
            visualized: 1000,
            stop_iteration: 1000,
        }
    }
}

impl SimConfig {
    /// Read a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: SimConfig = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Total number of particles the groups will generate.
    pub fn particle_count(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.count_per_axis * g.count_per_axis)
            .sum()
    }

    /// Reject every value the physics cannot handle.
    pub fn validate(&self) -> Result<()> {
        self.validate_frame()?;
        if self.groups.is_empty() {
            return Err(Error::InvalidParam(
                "at least one particle group is required".into(),
            ));
        }
        for (k, g) in self.groups.iter().enumerate() {
            self.validate_group(k, g)?;
        }
        Ok(())
    }

    /// Validate box, timestep, grid and piston settings, ignoring the particle groups.
    pub fn validate_frame(&self) -> Result<()> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("dt", self.dt)?;
        if self.grid_degree == 0 {
            return Err(Error::InvalidParam("grid_degree must be > 0".into()));
        }

        positive("piston.mass", self.piston.mass)?;
        positive("piston.position", self.piston.position)?;
        if self.piston.position > self.width {
            return Err(Error::InvalidParam(format!(
                "piston.position {} lies outside the box width {}",
                self.piston.position, self.width
            )));
        }
        if !self.piston.force.is_finite() {
            return Err(Error::InvalidParam("piston.force must be finite".into()));
        }
        Ok(())
    }

    fn validate_group(&self, k: usize, g: &ParticleGroup) -> Result<()> {
        let field = |name: &str| format!("groups[{k}].{name}");
        if g.count_per_axis == 0 {
            return Err(Error::InvalidParam(format!(
                "{} must be > 0",
                field("count_per_axis")
            )));
        }
        positive(&field("mass"), g.mass)?;
        positive(&field("radius"), g.radius)?;
        if !g.speed.is_finite() || g.speed < 0.0 {
            return Err(Error::InvalidParam(format!(
                "{} must be finite and >= 0",
                field("speed")
            )));
        }
        if !g.origin.is_finite() || !g.extent.is_finite() {
            return Err(Error::InvalidParam(format!(
                "{} and {} must be finite",
                field("origin"),
                field("extent")
            )));
        }
        // The de-penetration step must stay well above the spacing of f64 values at box scale.
        let scale = self.width.max(self.height);
        let step = SEPARATION_STEP_FRACTION * 2.0 * g.radius;
        if step <= MIN_RESOLVED_ULPS * f64::EPSILON * scale {
            return Err(Error::MathError(format!(
                "{} = {} is too small to separate pairs in a box of size {scale}",
                field("radius"),
                g.radius
            )));
        }
        if self.height <= 2.0 * (g.radius + WALL_MARGIN) {
            return Err(Error::InvalidParam(format!(
                "height must exceed 2 * ({} + {WALL_MARGIN})",
                field("radius")
            )));
        }

        let lo = g.origin.min(g.origin + g.extent);
        let hi = g.origin.max(g.origin + g.extent);
        let inside = lo.x >= g.radius
            && lo.y >= g.radius
            && hi.x <= self.piston.position - g.radius
            && hi.y <= self.height - g.radius;
        if !inside {
            return Err(Error::InvalidParam(format!(
                "group {k} spans {lo}..{hi}, outside the region between the walls and the piston"
            )));
        }
        Ok(())
    }
}

/// Smallest separation step accepted, in units of machine epsilon times the box size.
const MIN_RESOLVED_ULPS: f64 = 1024.0;

fn positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParam(format!("{name} must be finite and > 0")));
    }
    Ok(())
}
