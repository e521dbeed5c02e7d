use crate::core::boundary::WallImpulses;
use crate::core::Particle;
use std::fmt;
use std::time::Duration;

/// Total kinetic energy of the gas: sum of 1/2 m |v|^2.
pub fn kinetic_energy(particles: &[Particle]) -> f64 {
    particles.iter().map(Particle::kinetic_energy).sum()
}

/// Time-averaged pressure on a wall of length `area` that received `impulse` over
/// `ticks` steps of length `dt`.
///
/// Returns 0 before the first tick or for a degenerate wall.
pub fn pressure(impulse: f64, dt: f64, area: f64, ticks: u64) -> f64 {
    if ticks == 0 || !(area > 0.0) || !(dt > 0.0) {
        return 0.0;
    }
    impulse / dt / area / ticks as f64
}

/// Pressure estimates for the measured walls.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressureReading {
    /// Left wall (`x = 0`), length = box height.
    pub left: f64,
    /// Top wall (`y = height`), length = piston position.
    pub top: f64,
    /// Piston face, length = box height.
    pub piston: f64,
}

impl PressureReading {
    pub fn from_impulses(
        impulses: &WallImpulses,
        dt: f64,
        height: f64,
        piston_position: f64,
        ticks: u64,
    ) -> Self {
        Self {
            left: pressure(impulses.left, dt, height, ticks),
            top: pressure(impulses.top, dt, piston_position, ticks),
            piston: pressure(impulses.piston, dt, height, ticks),
        }
    }
}

/// Cumulative wall-clock time spent in each phase of the tick loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    pub movement: Duration,
    pub wall_collisions: Duration,
    pub grid_update: Duration,
    pub object_collisions: Duration,
    pub visualization: Duration,
}

impl PhaseTimings {
    pub fn total(&self) -> Duration {
        self.movement
            + self.wall_collisions
            + self.grid_update
            + self.object_collisions
            + self.visualization
    }
}

impl fmt::Display for PhaseTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "move:              {} ms", self.movement.as_millis())?;
        writeln!(f, "wall collisions:   {} ms", self.wall_collisions.as_millis())?;
        writeln!(f, "grid update:       {} ms", self.grid_update.as_millis())?;
        writeln!(f, "object collisions: {} ms", self.object_collisions.as_millis())?;
        write!(f, "visualization:     {} ms", self.visualization.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vector::Vec2;
    use crate::error::Result;

    #[test]
    fn energy_sums_particles() -> Result<()> {
        let ps = [
            Particle::new(1.0, 1.0, Vec2::ZERO, Vec2::new(3.0, 4.0))?,
            Particle::new(2.0, 1.0, Vec2::ZERO, Vec2::new(1.0, 0.0))?,
        ];
        assert!((kinetic_energy(&ps) - 13.5).abs() < 1e-12);
        assert_eq!(kinetic_energy(&[]), 0.0);
        Ok(())
    }

    #[test]
    fn pressure_is_zero_without_ticks() {
        assert_eq!(pressure(10.0, 0.1, 900.0, 0), 0.0);
        assert_eq!(pressure(10.0, 0.1, 0.0, 5), 0.0);
    }

    #[test]
    fn pressure_averages_over_ticks() {
        // 18 / 0.1 / 900 / 2
        assert!((pressure(18.0, 0.1, 900.0, 2) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn reading_uses_matching_areas() {
        let acc = WallImpulses {
            top: 5.0,
            left: 9.0,
            piston: 4.5,
        };
        let r = PressureReading::from_impulses(&acc, 1.0, 90.0, 50.0, 1);
        assert!((r.left - 0.1).abs() < 1e-12);
        assert!((r.top - 0.1).abs() < 1e-12);
        assert!((r.piston - 0.05).abs() < 1e-12);
    }

    #[test]
    fn timings_total_and_display() {
        let t = PhaseTimings {
            movement: Duration::from_millis(3),
            wall_collisions: Duration::from_millis(4),
            grid_update: Duration::from_millis(5),
            object_collisions: Duration::from_millis(6),
            visualization: Duration::from_millis(7),
        };
        assert_eq!(t.total(), Duration::from_millis(25));
        let text = t.to_string();
        assert!(text.contains("grid update:       5 ms"));
        assert!(text.lines().count() == 5);
    }
}
