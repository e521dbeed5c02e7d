//! 2D vector arithmetic.
//!
//! The simulation uses `glam::DVec2` for all positions and velocities. This module adds
//! the few operations the collision code needs on top of it.

pub use glam::DVec2 as Vec2;

/// Direction used when two centers coincide and no contact normal can be derived.
pub const FALLBACK_NORMAL: Vec2 = Vec2::new(
    std::f64::consts::FRAC_1_SQRT_2,
    std::f64::consts::FRAC_1_SQRT_2,
);

/// Projection of `v` onto the direction of `axis`.
///
/// Returns zero when `axis` has zero length.
#[inline]
pub fn projection(v: Vec2, axis: Vec2) -> Vec2 {
    let len_sq = axis.length_squared();
    if len_sq == 0.0 {
        return Vec2::ZERO;
    }
    axis * (v.dot(axis) / len_sq)
}

/// Split `v` into (parallel, perpendicular) parts relative to `axis`.
#[inline]
pub fn decompose(v: Vec2, axis: Vec2) -> (Vec2, Vec2) {
    let parallel = projection(v, axis);
    (parallel, v - parallel)
}

/// Unit vector along `v`, or `FALLBACK_NORMAL` if `v` is zero or not finite.
#[inline]
pub fn unit_or_fallback(v: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(FALLBACK_NORMAL)
}
