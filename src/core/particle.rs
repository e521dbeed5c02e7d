use crate::core::vector::Vec2;
use crate::error::{Error, Result};
use rand::Rng;
use std::f64::consts::TAU;

/// A rigid disc of the gas.
///
/// Particles live in a `Vec<Particle>` for the whole run; other components refer to
/// them by index into that vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Mass (> 0).
    pub mass: f64,
    /// Disc radius (> 0).
    pub radius: f64,
    /// Center position.
    pub position: Vec2,
    /// Velocity.
    pub velocity: Vec2,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` or `mass` is non-positive or any component is NaN/inf.
    pub fn new(mass: f64, radius: f64, position: Vec2, velocity: Vec2) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !position.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !velocity.is_finite() {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            mass,
            radius,
            position,
            velocity,
        })
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Returns true if the discs of `self` and `other` overlap.
    #[inline]
    pub fn overlaps(&self, other: &Particle) -> bool {
        self.position.distance(other.position) < self.radius + other.radius
    }
}

/// Generate an `n` x `n` lattice of identical particles.
///
/// Particle (i, j) sits at `origin + extent / (n - 1) * (i, j)`; a single particle
/// (`n == 1`) sits at `origin`. Every particle moves with speed `speed` in a direction
/// drawn uniformly from `rng`, so a seeded generator gives a reproducible gas.
pub fn generate_grid<R: Rng>(
    origin: Vec2,
    extent: Vec2,
    n: usize,
    mass: f64,
    radius: f64,
    speed: f64,
    rng: &mut R,
) -> Result<Vec<Particle>> {
    if !speed.is_finite() || speed < 0.0 {
        return Err(Error::InvalidParam("speed must be finite and >= 0".into()));
    }
    let spacing = if n > 1 {
        extent / (n - 1) as f64
    } else {
        Vec2::ZERO
    };

    let mut out = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let position = origin + spacing * Vec2::new(i as f64, j as f64);
            let phi: f64 = rng.random_range(0.0..TAU);
            let velocity = Vec2::new(phi.sin(), phi.cos()) * speed;
            out.push(Particle::new(mass, radius, position, velocity)?);
        }
    }
    Ok(out)
}
