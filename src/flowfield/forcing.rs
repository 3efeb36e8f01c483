//! Static external force, scaled in time.

use super::VelocityField;
use crate::mesh::Grid;
use crate::settings::ForcingSettings;
use ndarray::{Array, ArrayViewMut, Axis, Ix4, Zip};

/// Force density sampled on the grid, constant in space. Its strength ramps
/// down linearly and vanishes for `t >= 1`.
#[derive(Debug, Clone)]
pub struct ForceField {
    field: Array<f64, Ix4>,
}

/// Time dependent strength of the forcing, `max(1 - t, 0)`.
pub fn prefactor(t: f64) -> f64 {
    (1. - t).max(0.)
}

impl ForceField {
    pub fn new(grid: &Grid, forcing: &ForcingSettings) -> ForceField {
        let positions = grid.positions();
        let (nx, ny, nz) = grid.dim();

        let mut field = Array::zeros((3, nx, ny, nz));
        let mut component = field.index_axis_mut(Axis(0), forcing.component.index());

        Zip::from(&mut component)
            .and(positions.lanes(Axis(0)))
            .for_each(|f, p| {
                let p = [p[0], p[1], p[2]];
                if forcing.source.contains(p) {
                    *f = forcing.magnitude;
                } else if forcing.sink.contains(p) {
                    *f = -forcing.magnitude;
                }
            });

        ForceField { field }
    }

    /// The static part of the force.
    pub fn static_field(&self) -> &VelocityField {
        &self.field
    }

    /// Force at elapsed time `t`, `prefactor(t)` times the static field.
    ///
    /// `apply` adds `dt * force(t)` without allocating this field.
    pub fn force(&self, t: f64) -> VelocityField {
        &self.field * prefactor(t)
    }

    /// Adds the momentum injected during one timestep starting at `t`,
    /// `v += dt * force(t)`.
    pub fn apply(&self, v: &mut ArrayViewMut<f64, Ix4>, t: f64, timestep: f64) {
        let a = timestep * prefactor(t);
        if a != 0. {
            v.scaled_add(a, &self.field);
        }
    }
}
