//! Two-dimensional gas of hard discs in a box closed by a movable piston.
//!
//! The crate is organised around a fixed-timestep tick (`core::Simulation::step`) and an
//! operator channel (`command`) that reads diagnostics and repositions the piston between
//! ticks.

pub mod command;
pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::command::{CommandClient, CommandInterface, CommandServer};
pub use crate::config::SimConfig;
pub use crate::core::Simulation;
pub use crate::error::{Error, Result};
