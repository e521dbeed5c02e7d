//! Broad-phase bucket grid.
//!
//! The live region `0..x_extent` by `0..height` is split into `degree` x `degree`
//! buckets. `x_extent` follows the piston, so bucket boundaries move every tick and the
//! grid is rebuilt from scratch before each collision sweep. Buckets hold indices into
//! the particle vector.
//!
//! Only particles sharing a bucket are ever tested against each other; a pair straddling
//! a bucket boundary is not resolved in that tick.

use crate::core::Particle;
use crate::error::{Error, Result};

/// Reference grid degree.
pub const DEFAULT_DEGREE: usize = 10;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    degree: usize,
    buckets: Vec<Vec<usize>>,
}

impl SpatialGrid {
    /// Create an empty grid; buckets are allocated on the first rebuild.
    pub fn new(degree: usize) -> Result<Self> {
        if degree == 0 {
            return Err(Error::InvalidParam("grid degree must be > 0".into()));
        }
        Ok(Self {
            degree,
            buckets: Vec::new(),
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Bucket coordinate `(ix, iy)` of a point in a region `x_extent` wide and `height` tall.
    ///
    /// Coordinates are clamped into the grid, so points slightly outside the region land in
    /// the nearest edge bucket.
    #[inline]
    pub fn locate(&self, x: f64, y: f64, x_extent: f64, height: f64) -> (usize, usize) {
        (
            axis_index(self.degree, x, x_extent),
            axis_index(self.degree, y, height),
        )
    }

    /// Clear all buckets and reinsert every particle.
    pub fn rebuild(&mut self, particles: &[Particle], x_extent: f64, height: f64) {
        let cells = self.degree * self.degree;
        if self.buckets.len() != cells {
            self.buckets = vec![Vec::new(); cells];
        }
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for (idx, p) in particles.iter().enumerate() {
            let (ix, iy) = self.locate(p.position.x, p.position.y, x_extent, height);
            self.buckets[iy * self.degree + ix].push(idx);
        }
    }

    /// Particle indices stored in bucket `(ix, iy)`.
    pub fn bucket(&self, ix: usize, iy: usize) -> &[usize] {
        if ix >= self.degree || iy >= self.degree {
            return &[];
        }
        self.buckets
            .get(iy * self.degree + ix)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All buckets in row-major order (rows along y).
    pub fn buckets(&self) -> impl Iterator<Item = &[usize]> {
        self.buckets.iter().map(Vec::as_slice)
    }

    /// Total number of stored indices.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[inline]
fn axis_index(degree: usize, coord: f64, extent: f64) -> usize {
    if !(extent > 0.0) {
        return 0;
    }
    // `as usize` saturates: negatives and NaN map to 0.
    let raw = (degree as f64 * coord / extent).floor() as usize;
    raw.min(degree - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vector::Vec2;

    fn at(x: f64, y: f64) -> Result<Particle> {
        Particle::new(1.0, 0.5, Vec2::new(x, y), Vec2::ZERO)
    }

    #[test]
    fn zero_degree_rejected() {
        assert!(SpatialGrid::new(0).is_err());
    }

    #[test]
    fn locate_matches_direct_formula() -> Result<()> {
        let grid = SpatialGrid::new(10)?;
        let (extent, height): (f64, f64) = (500.0, 900.0);
        for &(x, y) in &[(0.0f64, 0.0f64), (49.9, 89.9), (50.0, 90.0), (251.0, 455.5), (499.0, 899.0)] {
            let expect = (
                (10.0 * x / extent).floor() as usize,
                (10.0 * y / height).floor() as usize,
            );
            assert_eq!(grid.locate(x, y, extent, height), expect, "point ({x}, {y})");
        }
        Ok(())
    }

    #[test]
    fn out_of_range_points_are_clamped() -> Result<()> {
        let grid = SpatialGrid::new(4)?;
        assert_eq!(grid.locate(-3.0, 150.0, 100.0, 100.0), (0, 3));
        assert_eq!(grid.locate(100.0, f64::NAN, 100.0, 100.0), (3, 0));
        assert_eq!(grid.locate(10.0, 10.0, 0.0, 100.0), (0, 0));
        Ok(())
    }

    #[test]
    fn every_particle_lands_in_exactly_one_bucket() -> Result<()> {
        let mut grid = SpatialGrid::new(3)?;
        let ps = vec![at(1.0, 1.0)?, at(59.0, 1.0)?, at(29.0, 59.0)?, at(2.0, 2.0)?];
        grid.rebuild(&ps, 60.0, 60.0);
        assert_eq!(grid.len(), ps.len());
        let mut seen = vec![0usize; ps.len()];
        for bucket in grid.buckets() {
            for &i in bucket {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
        assert_eq!(grid.bucket(0, 0), &[0, 3]);
        assert_eq!(grid.bucket(2, 0), &[1]);
        assert_eq!(grid.bucket(1, 2), &[2]);
        Ok(())
    }

    #[test]
    fn rebuild_follows_shrinking_extent() -> Result<()> {
        let mut grid = SpatialGrid::new(2)?;
        let ps = vec![at(40.0, 10.0)?];
        grid.rebuild(&ps, 100.0, 100.0);
        assert_eq!(grid.bucket(0, 0), &[0]);
        grid.rebuild(&ps, 60.0, 100.0);
        assert!(grid.bucket(0, 0).is_empty());
        assert_eq!(grid.bucket(1, 0), &[0]);
        assert_eq!(grid.len(), 1);
        Ok(())
    }
}
