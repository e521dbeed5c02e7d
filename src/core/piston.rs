use crate::error::{Error, Result};

/// The movable vertical wall closing the box on the right.
///
/// `position` is the x coordinate of the wall face. While `active`, the piston moves
/// under `dimpulse` (impulse per tick) and exchanges momentum with particles; while
/// inactive it is a rigid wall that only moves when repositioned from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Piston {
    /// Mass (> 0).
    pub mass: f64,
    /// x coordinate of the wall face (> 0).
    pub position: f64,
    /// Velocity along x.
    pub velocity: f64,
    /// Impulse applied every tick while active.
    pub dimpulse: f64,
    /// Whether the piston is free to move.
    pub active: bool,
}

impl Piston {
    /// Create a resting piston.
    pub fn new(mass: f64, position: f64, active: bool) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("piston mass must be finite and > 0".into()));
        }
        validate_position(position)?;
        Ok(Self {
            mass,
            position,
            velocity: 0.0,
            dimpulse: 0.0,
            active,
        })
    }

    /// Apply a constant external force; a positive `force` pushes towards x = 0.
    pub fn set_force(&mut self, force: f64) -> Result<()> {
        if !force.is_finite() {
            return Err(Error::InvalidParam("piston force must be finite".into()));
        }
        self.dimpulse = -force;
        Ok(())
    }

    /// Move the wall face to `position`.
    pub fn set_position(&mut self, position: f64) -> Result<()> {
        validate_position(position)?;
        self.position = position;
        Ok(())
    }

    /// Momentum carried by the piston.
    #[inline]
    pub fn momentum(&self) -> f64 {
        self.mass * self.velocity
    }

    /// Kinetic energy carried by the piston.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity * self.velocity
    }
}

fn validate_position(position: f64) -> Result<()> {
    if !position.is_finite() || position <= 0.0 {
        return Err(Error::InvalidParam(
            "piston position must be finite and > 0".into(),
        ));
    }
    Ok(())
}
