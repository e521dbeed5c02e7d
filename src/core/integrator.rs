use crate::core::{Particle, Piston};

/// Advance all particles and, if it is active, the piston by one explicit Euler step.
///
/// The piston first receives its per-tick impulse, then moves with the updated velocity.
pub fn integrate(particles: &mut [Particle], piston: &mut Piston, dt: f64) {
    for p in particles.iter_mut() {
        p.position += p.velocity * dt;
    }

    if piston.active {
        piston.velocity += piston.dimpulse / piston.mass;
        piston.position += piston.velocity * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vector::Vec2;
    use crate::error::Result;

    #[test]
    fn particles_move_linearly() -> Result<()> {
        let mut ps = vec![
            Particle::new(1.0, 1.0, Vec2::new(10.0, 10.0), Vec2::new(2.0, -1.0))?,
            Particle::new(1.0, 1.0, Vec2::new(0.0, 0.0), Vec2::ZERO)?,
        ];
        let mut piston = Piston::new(1.0, 100.0, false)?;
        integrate(&mut ps, &mut piston, 0.5);
        assert_eq!(ps[0].position, Vec2::new(11.0, 9.5));
        assert_eq!(ps[1].position, Vec2::ZERO);
        Ok(())
    }

    #[test]
    fn inactive_piston_does_not_move() -> Result<()> {
        let mut piston = Piston::new(2.0, 100.0, false)?;
        piston.velocity = 3.0;
        piston.set_force(4.0)?;
        integrate(&mut [], &mut piston, 1.0);
        assert_eq!(piston.position, 100.0);
        assert_eq!(piston.velocity, 3.0);
        Ok(())
    }

    #[test]
    fn active_piston_applies_impulse_then_moves() -> Result<()> {
        let mut piston = Piston::new(2.0, 100.0, true)?;
        piston.set_force(4.0)?;
        integrate(&mut [], &mut piston, 0.5);
        // dv = -4 / 2 = -2, dx = -2 * 0.5
        assert!((piston.velocity + 2.0).abs() < 1e-12);
        assert!((piston.position - 99.0).abs() < 1e-12);
        Ok(())
    }
}
