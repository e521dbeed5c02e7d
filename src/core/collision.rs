use crate::core::boundary::elastic_1d;
use crate::core::grid::SpatialGrid;
use crate::core::vector::{decompose, unit_or_fallback, Vec2};
use crate::core::Particle;

/// Fraction of the combined radius by which a pair is pushed apart per separation step.
pub const SEPARATION_STEP_FRACTION: f64 = 0.05;

/// Resolve an elastic collision between two touching discs.
///
/// Velocity components along the line of centers are exchanged with the unequal-mass 1D
/// formula; perpendicular components are untouched. The discs are then pushed apart
/// symmetrically along that line until they no longer overlap. Coincident centers use
/// `FALLBACK_NORMAL` as the line of centers.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle) {
    let normal = unit_or_fallback(b.position - a.position);

    let (a_par, a_perp) = decompose(a.velocity, normal);
    let (b_par, b_perp) = decompose(b.velocity, normal);
    let (a_n, b_n) = elastic_1d(a.mass, a_par.dot(normal), b.mass, b_par.dot(normal));
    a.velocity = a_perp + normal * a_n;
    b.velocity = b_perp + normal * b_n;

    let contact = a.radius + b.radius;
    let half_step = normal * (0.5 * SEPARATION_STEP_FRACTION * contact);
    // Each pass widens the gap along `normal` by a full step. The distance must grow
    // strictly on every pass, so the loop ends even when a step is lost to rounding.
    let mut gap = a.position.distance(b.position);
    while gap < contact {
        a.position -= half_step;
        b.position += half_step;
        let widened = a.position.distance(b.position);
        if widened <= gap {
            place_at_contact(a, b, normal, contact);
            break;
        }
        gap = widened;
    }
}

/// Put `a` and `b` a distance `contact` apart along `normal`, about their midpoint.
///
/// Used when the separation step is below the resolution of the coordinates; at such
/// scales the result is only as close to `contact` as rounding allows.
fn place_at_contact(a: &mut Particle, b: &mut Particle, normal: Vec2, contact: f64) {
    let mid = (a.position + b.position) * 0.5;
    a.position = mid - normal * (0.5 * contact);
    b.position = mid + normal * (0.5 * contact);
}

/// Resolve `a` and `b` if they overlap. Returns whether a collision happened.
#[inline]
pub fn collide_if_overlapping(a: &mut Particle, b: &mut Particle) -> bool {
    if !a.overlaps(b) {
        return false;
    }
    resolve_pair(a, b);
    true
}

/// Test every pair sharing a grid bucket and resolve the overlapping ones.
///
/// `grid` must have been rebuilt from the current `particles`. Returns the number of
/// collisions resolved.
pub fn sweep_grid(particles: &mut [Particle], grid: &SpatialGrid) -> u64 {
    let mut collisions = 0u64;
    for bucket in grid.buckets() {
        if bucket.len() < 2 {
            continue;
        }
        for (k, &i) in bucket.iter().enumerate() {
            for &j in &bucket[k + 1..] {
                let (a, b) = pair_mut(particles, i, j);
                if collide_if_overlapping(a, b) {
                    collisions += 1;
                }
            }
        }
    }
    collisions
}

/// Test every pair of particles. O(n^2); meant for small systems and cross-checks.
pub fn sweep_all(particles: &mut [Particle]) -> u64 {
    let mut collisions = 0u64;
    let n = particles.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = pair_mut(particles, i, j);
            if collide_if_overlapping(a, b) {
                collisions += 1;
            }
        }
    }
    collisions
}

/// Two distinct mutable elements of `particles`, in the order asked for.
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = particles.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = particles.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}
