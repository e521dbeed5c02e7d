//! Physics core: particles, piston, and the per-tick phases.
//!
//! Each phase is a free function over explicit state so it can be exercised on its own;
//! `Simulation` strings them together in tick order.

pub mod boundary;
pub mod collision;
pub mod diagnostics;
pub mod grid;
pub mod integrator;
pub mod particle;
pub mod piston;
pub mod sim;
pub mod vector;

pub use boundary::WallImpulses;
pub use diagnostics::{PhaseTimings, PressureReading};
pub use grid::SpatialGrid;
pub use particle::Particle;
pub use piston::Piston;
pub use sim::{Frame, NullVisualizer, RunSummary, Simulation, Visualizer};
pub use vector::Vec2;
