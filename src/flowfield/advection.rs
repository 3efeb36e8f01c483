//! Semi-Lagrangian transport of grid data along a velocity field.

use super::VelocityField;
use crate::errors::*;
use crate::mesh::interpolate::{interpolate_scalar_field, is_in_domain};
use crate::mesh::Grid;
use ndarray::{Array, ArrayView, Axis, Ix3, Ix4, Zip};

/// Maps a coordinate back into the periodic unit interval.
///
/// Coordinates in `[0, 1]` are kept, so the upper face `1.0` stays on its
/// own grid layer. Everything else is taken modulo one.
pub fn wrap_periodic(x: f64) -> f64 {
    if (0. ..=1.).contains(&x) {
        x
    } else {
        x.rem_euclid(1.)
    }
}

/// Returns the departure points `x - dt * v` of the characteristics ending
/// at `positions`, wrapped into the unit cube.
///
/// `positions` and `direction` share the layout `[c, i, j, m]`.
pub fn backtrace(
    positions: ArrayView<f64, Ix4>,
    direction: ArrayView<f64, Ix4>,
    timestep: f64,
) -> Array<f64, Ix4> {
    let mut departure = positions.to_owned();
    departure.scaled_add(-timestep, &direction);
    departure.par_mapv_inplace(wrap_periodic);

    departure
}

/// Interpolates `field` at every point in `positions`.
///
/// Fails with `InvariantViolation` if a position lies outside `[0, 1]^3`.
pub fn resample(
    grid: &Grid,
    field: ArrayView<f64, Ix3>,
    positions: ArrayView<f64, Ix4>,
) -> Result<Array<f64, Ix3>> {
    if let Some(p) = positions.iter().find(|p| !is_in_domain(**p)) {
        bail!(ErrorKind::InvariantViolation(format!(
            "interpolation query {} outside of the unit cube",
            p
        )));
    }

    Ok(Zip::from(positions.lanes(Axis(0)))
        .par_map_collect(|p| interpolate_scalar_field([p[0], p[1], p[2]], &field, grid)))
}

/// Resamples every component of `v` at the same departure points.
pub fn advect(
    grid: &Grid,
    v: ArrayView<f64, Ix4>,
    positions: ArrayView<f64, Ix4>,
) -> Result<VelocityField> {
    let mut advected = VelocityField::zeros(v.raw_dim());

    for (mut a, c) in advected.outer_iter_mut().zip(v.outer_iter()) {
        a.assign(&resample(grid, c, positions)?);
    }

    Ok(advected)
}
