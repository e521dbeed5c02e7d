//! Contact with the box walls and the piston face.
//!
//! Wall layout: fixed walls at `y = 0` (bottom), `y = height` (top) and `x = 0` (left);
//! the piston closes the box at `x = piston.position`. Momentum delivered to the top
//! wall, the left wall and the piston face is accumulated for pressure estimates. The
//! bottom wall reflects particles but is not measured.

use crate::core::{Particle, Piston};

/// Distance a reflected particle is moved away from the wall it touched.
pub const WALL_MARGIN: f64 = 1.0;

/// Running sums of momentum transferred to the measured walls.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallImpulses {
    /// Top wall, `y = height`. Spans `0..piston.position`.
    pub top: f64,
    /// Left wall, `x = 0`. Spans `0..height`.
    pub left: f64,
    /// Piston face. Spans `0..height`.
    pub piston: f64,
}

impl WallImpulses {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Reflect every particle off the walls and the piston face.
///
/// Each boundary is checked independently in the order bottom, top, left, piston, so a
/// particle sitting in a corner is reflected by both walls in the same tick.
pub fn resolve_boundaries(
    particles: &mut [Particle],
    piston: &mut Piston,
    height: f64,
    impulses: &mut WallImpulses,
) {
    for p in particles.iter_mut() {
        if p.position.y < p.radius {
            p.velocity.y = -p.velocity.y;
            p.position.y = p.radius + WALL_MARGIN;
        }

        if p.position.y > height - p.radius {
            p.velocity.y = -p.velocity.y;
            p.position.y = height - p.radius - WALL_MARGIN;
            impulses.top += 2.0 * p.mass * p.velocity.y.abs();
        }

        if p.position.x < p.radius {
            p.velocity.x = -p.velocity.x;
            p.position.x = p.radius + WALL_MARGIN;
            impulses.left += 2.0 * p.mass * p.velocity.x.abs();
        }

        if p.position.x > piston.position - p.radius {
            if piston.active {
                let before = piston.velocity;
                let (vp, vw) = elastic_1d(p.mass, p.velocity.x, piston.mass, piston.velocity);
                p.velocity.x = vp;
                piston.velocity = vw;
                impulses.piston += (piston.mass * (vw - before)).abs();
            } else {
                p.velocity = -p.velocity;
                impulses.piston += 2.0 * p.mass * p.velocity.x.abs();
            }
            p.position.x = piston.position - p.radius - WALL_MARGIN;
        }
    }
}

/// Post-collision velocities of a 1D elastic collision between masses `m1` and `m2`.
#[inline]
pub fn elastic_1d(m1: f64, v1: f64, m2: f64, v2: f64) -> (f64, f64) {
    let total = m1 + m2;
    let u1 = ((m1 - m2) * v1 + 2.0 * m2 * v2) / total;
    let u2 = ((m2 - m1) * v2 + 2.0 * m1 * v1) / total;
    (u1, u2)
}
