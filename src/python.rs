use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::SimConfig;
use crate::core::Simulation;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// PistonGas Python-facing wrapper around the Rust Simulation.
///
/// API:
/// - __new__(config_json=None)
/// - step(n=1)
/// - get_positions() -> np.ndarray, shape (N, 2)
/// - get_velocities() -> np.ndarray, shape (N, 2)
#[pyclass]
pub struct PistonGas {
    sim: Simulation,
}

#[pymethods]
impl PistonGas {
    /// Build a simulation from a JSON configuration string; missing fields use defaults.
    ///
    /// Errors: raises ValueError on malformed JSON or invalid parameters.
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(text) => serde_json::from_str::<SimConfig>(text).map_err(py_err)?,
            None => SimConfig::default(),
        };
        let sim = Simulation::new(config).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Advance by `n` ticks (releases the GIL during computation).
    #[pyo3(signature = (n=1))]
    fn step(&mut self, py: Python<'_>, n: u64) {
        py.detach(|| self.sim.advance(n));
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let mut arr = Array2::<f64>::zeros((self.sim.num_particles(), 2));
        for (i, p) in self.sim.particles.iter().enumerate() {
            arr[[i, 0]] = p.position.x;
            arr[[i, 1]] = p.position.y;
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let mut arr = Array2::<f64>::zeros((self.sim.num_particles(), 2));
        for (i, p) in self.sim.particles.iter().enumerate() {
            arr[[i, 0]] = p.velocity.x;
            arr[[i, 1]] = p.velocity.y;
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Total kinetic energy of the gas.
    fn get_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    /// Returns (left, upper, piston) pressure estimates since the last reset.
    fn get_pressure(&self) -> (f64, f64, f64) {
        let p = self.sim.pressure();
        (p.left, p.top, p.piston)
    }

    /// Move the piston and reset pressure averaging.
    fn set_piston_position(&mut self, position: f64) -> PyResult<()> {
        self.sim.set_piston_position(position).map_err(py_err)
    }

    /// Constant force pushing the piston towards x = 0.
    fn set_piston_force(&mut self, force: f64) -> PyResult<()> {
        self.sim.set_piston_force(force).map_err(py_err)
    }

    fn set_piston_active(&mut self, active: bool) {
        self.sim.set_piston_active(active);
    }

    /// Returns (position, velocity) of the piston.
    fn get_piston(&self) -> (f64, f64) {
        (self.sim.piston.position, self.sim.piston.velocity)
    }

    fn get_collisions(&self) -> u64 {
        self.sim.collisions()
    }
}

/// The pistongas Python module entry point.
#[pymodule]
fn pistongas(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PistonGas>()?;
    Ok(())
}
