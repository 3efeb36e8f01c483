//! Real space discretization of the unit cube.

use crate::errors::*;
use ndarray::{Array, Axis, Ix1, Ix4};

pub mod fft_helper;
pub mod interpolate;

/// Regular `N x N x N` lattice over `[0, 1]^3`, including both faces.
///
/// The domain is periodic, so the coordinate `1.0` denotes the same physical
/// point as `0.0`.
#[derive(Debug, Clone)]
pub struct Grid {
    size: usize,
    spacing: f64,
    coords: Array<f64, Ix1>,
}

impl Grid {
    pub fn new(size: usize) -> Result<Grid> {
        if size < 2 {
            bail!(ErrorKind::InvalidSettings(format!(
                "grid size must be at least 2, got {}",
                size
            )));
        }

        Ok(Grid {
            size,
            spacing: 1. / (size - 1) as f64,
            coords: Array::linspace(0., 1., size),
        })
    }

    /// Number of grid points per axis.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance between neighbouring grid points, `1 / (N - 1)`.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Coordinates of the grid points along one axis, these double as
    /// interpolation knots.
    pub fn coords(&self) -> &Array<f64, Ix1> {
        &self.coords
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        (self.size, self.size, self.size)
    }

    /// Returns the positions of all grid points.
    ///
    /// The first axis denotes the component: `res[c, i, j, m] -> x_c[i, j, m]`
    pub fn positions(&self) -> Array<f64, Ix4> {
        let c = self.coords.clone();
        mesh3d(&[c.clone(), c.clone(), c])
    }
}

pub fn mesh3d<T: Clone + Default>(k: &[Array<T, Ix1>]) -> Array<T, Ix4> {
    let sh_x = k[0].len();
    let sh_y = k[1].len();
    let sh_z = k[2].len();

    let mut res = Array::from_elem([3, sh_x, sh_y, sh_z], T::default());

    // first component varies along first axis of field
    for (kx, mut x) in k[0]
        .iter()
        .zip(res.index_axis_mut(Axis(0), 0).axis_iter_mut(Axis(0)))
    {
        x.fill(kx.clone());
    }

    // second component varies along second axis of field
    for (ky, mut y) in k[1]
        .iter()
        .zip(res.index_axis_mut(Axis(0), 1).axis_iter_mut(Axis(1)))
    {
        y.fill(ky.clone());
    }

    // third component varies along third axis of field
    for (kz, mut z) in k[2]
        .iter()
        .zip(res.index_axis_mut(Axis(0), 2).axis_iter_mut(Axis(2)))
    {
        z.fill(kz.clone());
    }

    res
}
