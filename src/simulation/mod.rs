//! Module that defines data structures and algorithms for the integration of
//! the simulation.


use crate::errors::*;
use crate::flowfield::advection::{advect, backtrace};
use crate::flowfield::forcing::ForceField;
use crate::flowfield::spectral_solver::SpectralSolver;
use crate::flowfield::{is_finite, kinetic_energy, VelocityField};
use crate::mesh::Grid;
use crate::output::OutputSink;
use crate::settings::Settings;
use crate::timedisplay::pretty_print_duration;
use log::Level;
use ndarray::{Array, ArrayView, Ix4};
use std::time::Instant;

/// Main data structure representing the simulation.
pub struct Simulation {
    settings: Settings,
    grid: Grid,
    /// grid point positions, the arrival points of the characteristics
    positions: Array<f64, Ix4>,
    force: ForceField,
    spectral_solver: SpectralSolver,
    state: SimulationState,
}

/// Holds the current state of the simulation.
struct SimulationState {
    velocity: VelocityField,
    /// count timesteps
    timestep: usize,
}

impl Simulation {
    /// Return a new simulation data structure, holding the state of the
    /// simulation. The fluid is at rest initially.
    pub fn new(settings: Settings) -> Result<Simulation> {
        settings.check()?;

        // helper bindings for brevity
        let sim = settings.simulation;
        let param = settings.parameters;

        let grid = Grid::new(sim.grid_size)?;
        let force = ForceField::new(&grid, &param.forcing);
        let spectral_solver = SpectralSolver::new(sim.grid_size, sim.timestep, param.viscosity)?;
        let (nx, ny, nz) = grid.dim();

        Ok(Simulation {
            positions: grid.positions(),
            grid,
            force,
            spectral_solver,
            settings,
            state: SimulationState {
                velocity: VelocityField::zeros((3, nx, ny, nz)),
                timestep: 0,
            },
        })
    }

    /// Replaces the current velocity field, e.g. to start from a flow other
    /// than rest.
    pub fn init(&mut self, velocity: VelocityField) -> Result<()> {
        if velocity.raw_dim() != self.state.velocity.raw_dim() {
            bail!(ErrorKind::InvalidSettings(format!(
                "initial velocity has shape {:?}, expected {:?}",
                velocity.shape(),
                self.state.velocity.shape()
            )));
        }

        if !is_finite(velocity.view()) {
            bail!(ErrorKind::InvalidSettings(
                "initial velocity is not finite".to_string()
            ));
        }

        self.state.velocity = velocity;

        Ok(())
    }

    // Getter

    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get_grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the committed velocity field
    pub fn get_velocity(&self) -> ArrayView<f64, Ix4> {
        self.state.velocity.view()
    }

    /// Returns number of completed timesteps
    pub fn get_timestep(&self) -> usize {
        self.state.timestep
    }

    /// Returns the elapsed simulated time at the start of the next timestep
    pub fn get_time(&self) -> f64 {
        self.state.timestep as f64 * self.settings.simulation.timestep
    }

    pub fn get_spectral_solver(&self) -> &SpectralSolver {
        &self.spectral_solver
    }

    /// Whether all configured timesteps are done.
    pub fn is_finished(&self) -> bool {
        self.state.timestep >= self.settings.simulation.number_of_timesteps
    }

    /// Do the actual simulation timestep
    ///
    /// Returns the number of completed timesteps. If the step does not
    /// produce a finite field, nothing is committed.
    pub fn do_timestep(&mut self) -> Result<usize> {
        let dt = self.settings.simulation.timestep;
        let t = self.get_time();

        // Inject momentum
        let mut forced = self.state.velocity.clone();
        self.force.apply(&mut forced.view_mut(), t, dt);

        // Self-advection along the characteristics of the committed field
        let departure = backtrace(self.positions.view(), self.state.velocity.view(), dt);
        let advected = advect(&self.grid, forced.view(), departure.view())?;

        let velocity = self.spectral_solver.diffuse_and_project(advected.view());

        if !is_finite(velocity.view()) {
            bail!(ErrorKind::NonFiniteVelocity(self.state.timestep));
        }

        self.state.velocity = velocity;

        // increment timestep counter to keep a continous identifier
        self.state.timestep += 1;

        Ok(self.state.timestep)
    }

    /// Runs all remaining timesteps and hands every committed field to
    /// `sink`.
    pub fn run<S: OutputSink>(&mut self, sink: &mut S) -> Result<()> {
        let n = self.settings.simulation.number_of_timesteps;
        let progress_interval = (n / 10).max(1);
        let start = Instant::now();

        while !self.is_finished() {
            let timestep = self.state.timestep;
            let time = self.get_time();

            self.do_timestep()?;

            if log_enabled!(Level::Debug) {
                debug!(
                    "Timestep {}: kinetic energy {:e}, max divergence {:e}",
                    timestep,
                    kinetic_energy(self.get_velocity()),
                    self.spectral_solver.max_divergence(self.get_velocity())
                );
            }

            sink.emit(timestep, time, self.get_velocity())
                .chain_err(|| format!("Unable to output timestep {}.", timestep))?;

            let done = timestep + 1;
            if done % progress_interval == 0 || done == n {
                info!(
                    "{:3}% done ({}/{}), elapsed {}",
                    100 * done / n,
                    done,
                    n,
                    pretty_print_duration(start.elapsed())
                );
            }
        }

        Ok(())
    }
}

/// Steps through the remaining timesteps, yielding the number of completed
/// timesteps.
impl Iterator for Simulation {
    type Item = Result<usize>;

    fn next(&mut self) -> Option<Result<usize>> {
        if self.is_finished() {
            None
        } else {
            Some(self.do_timestep())
        }
    }
}
