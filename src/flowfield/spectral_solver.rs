// Move unit test into own file
#[cfg(test)]
#[path = "./spectral_solver_test.rs"]
mod spectral_solver_test;

use super::VelocityField;
use crate::errors::*;
use crate::fft::{FFTDirection, FFTPlan};
use crate::mesh::fft_helper::SpectralGrid;
use ndarray::{Array, ArrayView, ArrayViewMut, Axis, Ix3, Ix4, Zip};
use ndarray::parallel::prelude::*;
use num_complex::Complex;
use std::sync::Arc;

/// Velocity components in Fourier space, `v[c, kx, ky, kz]`.
pub type Spectrum = Array<Complex<f64>, Ix4>;

/// Applies viscous diffusion and the projection onto divergence free fields
/// in Fourier space.
pub struct SpectralSolver {
    grid_size: usize,
    spectral_grid: SpectralGrid,
    decay: Array<f64, Ix3>,
    fft_plan_forward: Arc<FFTPlan>,
    fft_plan_backward: Arc<FFTPlan>,
}

/// Multiplies every component of the spectrum with the decay factor of its
/// mode.
pub fn diffuse(spectrum: &mut ArrayViewMut<Complex<f64>, Ix4>, decay: ArrayView<f64, Ix3>) {
    Zip::from(spectrum.lanes_mut(Axis(0)))
        .and(&decay)
        .par_for_each(|mut v, &d| v.map_inplace(|c| *c *= d));
}

/// Removes the component along `k` from every mode, `v <- v - (v.k) k`.
///
/// `k_normed` has to be normalized, except for the zero mode which is zero
/// and hence leaves the mean flow untouched.
pub fn project(spectrum: &mut ArrayViewMut<Complex<f64>, Ix4>, k_normed: ArrayView<f64, Ix4>) {
    Zip::from(spectrum.lanes_mut(Axis(0)))
        .and(k_normed.lanes(Axis(0)))
        .par_for_each(|mut v, k| {
            // pseudo pressure
            let q = v[0] * k[0] + v[1] * k[1] + v[2] * k[2];

            v[0] -= q * k[0];
            v[1] -= q * k[1];
            v[2] -= q * k[2];
        });
}

impl SpectralSolver {
    pub fn new(grid_size: usize, timestep: f64, viscosity: f64) -> Result<SpectralSolver> {
        let shape = [grid_size, grid_size, grid_size];

        let plan_forward = FFTPlan::new_c2c_inplace_3d(shape, FFTDirection::Forward)
            .chain_err(|| "Unable to plan forward FFT.")?;
        let plan_backward = FFTPlan::new_c2c_inplace_3d(shape, FFTDirection::Backward)
            .chain_err(|| "Unable to plan backward FFT.")?;

        let spectral_grid = SpectralGrid::new(grid_size);

        Ok(SpectralSolver {
            grid_size,
            decay: spectral_grid.decay(timestep, viscosity),
            spectral_grid,
            fft_plan_forward: Arc::new(plan_forward),
            fft_plan_backward: Arc::new(plan_backward),
        })
    }

    pub fn spectral_grid(&self) -> &SpectralGrid {
        &self.spectral_grid
    }

    pub fn decay(&self) -> ArrayView<f64, Ix3> {
        self.decay.view()
    }

    /// Returns the unnormalized Fourier transform of every component of `v`.
    pub fn forward(&self, v: ArrayView<f64, Ix4>) -> Spectrum {
        let mut spectrum = v.mapv(|x| Complex::new(x, 0.));

        let fft = &self.fft_plan_forward;
        spectrum
            .outer_iter_mut()
            .into_par_iter()
            .for_each(|mut c| fft.reexecute3d(&mut c));

        spectrum
    }

    /// Inverse of `forward`, keeping only the real part.
    pub fn backward(&self, mut spectrum: Spectrum) -> VelocityField {
        let fft = &self.fft_plan_backward;
        spectrum
            .outer_iter_mut()
            .into_par_iter()
            .for_each(|mut c| fft.reexecute3d(&mut c));

        let norm = self.grid_size.pow(3) as f64;

        // convert to real vector field
        spectrum.map(|v| v.re / norm)
    }

    /// Diffuses `v` over one timestep and projects the result onto its
    /// divergence free part.
    pub fn diffuse_and_project(&self, v: ArrayView<f64, Ix4>) -> VelocityField {
        let mut spectrum = self.forward(v);

        diffuse(&mut spectrum.view_mut(), self.decay.view());
        project(&mut spectrum.view_mut(), self.spectral_grid.k_normed_mesh());

        self.backward(spectrum)
    }

    /// Largest magnitude of the discrete divergence `k.v` over all modes,
    /// normalized by the number of grid points.
    pub fn max_divergence(&self, v: ArrayView<f64, Ix4>) -> f64 {
        let spectrum = self.forward(v);
        let n = self.grid_size;
        let norm = n.pow(3) as f64;

        let mut div = Array::<f64, Ix3>::zeros((n, n, n));
        Zip::from(&mut div)
            .and(spectrum.lanes(Axis(0)))
            .and(self.spectral_grid.k_mesh().lanes(Axis(0)))
            .par_for_each(|d, v, k| {
                *d = (v[0] * k[0] + v[1] * k[1] + v[2] * k[2]).norm() / norm;
            });

        div.iter().cloned().fold(0., f64::max)
    }
}
