use super::mesh3d;
use ndarray::{Array, ArrayView, Axis, Ix1, Ix3, Ix4, Zip};

/// Returns the integer wavenumbers of a periodic sampling with `n` points in
/// the index order of an unshifted DFT.
///
/// The 0th-mode is at index `0`. Indices up to `n/2` carry the positive
/// frequencies, the remaining ones the negative frequencies in ascending
/// order. For even `n` the Nyquist index `n/2` is counted positive.
///
/// Example:
///     n = 4 => k = [0, 1, 2, -1]
///     n = 5 => k = [0, 1, 2, -2, -1]
///
pub fn get_k_sampling(n: usize) -> Array<f64, Ix1> {
    Array::from_iter((0..n).map(|i| {
        if i <= n / 2 {
            i as f64
        } else {
            i as f64 - n as f64
        }
    }))
}

/// Returns a meshgrid of k values for FFT.
///
/// The first axis denotes the components of the k-vector:
///     `res[c, i, j, m] -> k_c[i, j, m]`
pub fn get_k_mesh(grid_size: usize) -> Array<f64, Ix4> {
    let k = get_k_sampling(grid_size);
    mesh3d(&[k.clone(), k.clone(), k])
}

/// Returns scalar field of the squared norm of the k-vectors.
pub fn get_norm_squared(k_mesh: ArrayView<f64, Ix4>) -> Array<f64, Ix3> {
    (&k_mesh * &k_mesh).sum_axis(Axis(0))
}

/// Returns scalar field of the norm of the k-vectors.
///
/// The norm of k=0 is set to one, i.e. |k=0| == 1, so that it can be
/// divided by.
pub fn get_norm(k_mesh: ArrayView<f64, Ix4>) -> Array<f64, Ix3> {
    let mut norm = get_norm_squared(k_mesh).map(|v| v.sqrt());
    norm[[0, 0, 0]] = 1.;

    norm
}

/// Returns a normalized meshgrid of k values for FFT, except for zero which
/// is zero.
///
/// The first axis denotes the components of the k-vector:
///     `res[c, i, j, m] -> k_c[i, j, m]`
pub fn get_norm_k_mesh(k_mesh: ArrayView<f64, Ix4>) -> Array<f64, Ix4> {
    let norm = get_norm(k_mesh);

    // k = 0 stays zero, since its norm was replaced by one
    &k_mesh / &norm
}

/// Returns the viscous attenuation `exp(-dt nu |k|^2)` of every Fourier mode
/// over one timestep.
///
/// Uses the raw norm, hence the mean flow is never damped.
pub fn get_decay(k_mesh: ArrayView<f64, Ix4>, timestep: f64, viscosity: f64) -> Array<f64, Ix3> {
    let mut decay = get_norm_squared(k_mesh);
    decay.par_mapv_inplace(|k2| (-timestep * viscosity * k2).exp());

    decay
}

/// Precomputed wavenumber data, immutable and shared by every timestep.
#[derive(Debug, Clone)]
pub struct SpectralGrid {
    k_mesh: Array<f64, Ix4>,
    k_norm: Array<f64, Ix3>,
    k_normed_mesh: Array<f64, Ix4>,
}

impl SpectralGrid {
    pub fn new(grid_size: usize) -> SpectralGrid {
        let k_mesh = get_k_mesh(grid_size);

        SpectralGrid {
            k_norm: get_norm(k_mesh.view()),
            k_normed_mesh: get_norm_k_mesh(k_mesh.view()),
            k_mesh,
        }
    }

    pub fn k_mesh(&self) -> ArrayView<f64, Ix4> {
        self.k_mesh.view()
    }

    pub fn k_norm(&self) -> ArrayView<f64, Ix3> {
        self.k_norm.view()
    }

    pub fn k_normed_mesh(&self) -> ArrayView<f64, Ix4> {
        self.k_normed_mesh.view()
    }

    pub fn decay(&self, timestep: f64, viscosity: f64) -> Array<f64, Ix3> {
        get_decay(self.k_mesh.view(), timestep, viscosity)
    }

    /// Checks that every normalized k-vector has unit length, except for the
    /// zero mode which has to vanish.
    pub fn is_consistent(&self) -> bool {
        let mut ok = true;
        Zip::indexed(self.k_normed_mesh.lanes(Axis(0))).for_each(|idx, k| {
            let n = k.dot(&k);
            if idx == (0, 0, 0) {
                ok &= n == 0.;
            } else {
                ok &= (n - 1.).abs() < 1e-12;
            }
        });

        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helper::{equal_floats, equal_floats_tol};

    #[test]
    fn test_get_k_sampling() {
        let expect4 = [0., 1., 2., -1.];
        let expect5 = [0., 1., 2., -2., -1.];
        let expect6 = [0., 1., 2., 3., -2., -1.];

        for (v, e) in get_k_sampling(4).iter().zip(&expect4) {
            assert!(equal_floats(*v, *e), "{} != {}", v, e);
        }
        for (v, e) in get_k_sampling(5).iter().zip(&expect5) {
            assert!(equal_floats(*v, *e), "{} != {}", v, e);
        }
        for (v, e) in get_k_sampling(6).iter().zip(&expect6) {
            assert!(equal_floats(*v, *e), "{} != {}", v, e);
        }
        assert_eq!(get_k_sampling(2).to_vec(), vec![0., 1.]);
    }

    #[test]
    fn test_get_k_mesh() {
        let mesh = get_k_mesh(3);

        assert_eq!(mesh.shape(), [3, 3, 3, 3]);
        assert_eq!(mesh[[0, 2, 0, 1]], -1.);
        assert_eq!(mesh[[1, 2, 0, 1]], 0.);
        assert_eq!(mesh[[2, 2, 0, 1]], 1.);
    }

    #[test]
    fn norm_of_zero_mode_is_one() {
        let mesh = get_k_mesh(4);
        let norm = get_norm(mesh.view());

        assert_eq!(norm[[0, 0, 0]], 1.);
        assert!(equal_floats(norm[[1, 0, 0]], 1.));
        assert!(equal_floats(norm[[1, 1, 3]], 3f64.sqrt()));
        assert!(equal_floats(norm[[2, 2, 0]], 8f64.sqrt()));
    }

    #[test]
    fn test_get_norm_k_mesh() {
        let mesh = get_k_mesh(4);
        let normed = get_norm_k_mesh(mesh.view());

        for c in 0..3 {
            assert_eq!(normed[[c, 0, 0, 0]], 0.);
        }

        let s = 1. / 3f64.sqrt();
        assert!(equal_floats_tol(normed[[0, 1, 1, 3]], s, 1e-15));
        assert!(equal_floats_tol(normed[[1, 1, 1, 3]], s, 1e-15));
        assert!(equal_floats_tol(normed[[2, 1, 1, 3]], -s, 1e-15));

        assert!(SpectralGrid::new(4).is_consistent());
        assert!(SpectralGrid::new(7).is_consistent());
    }

    #[test]
    fn spectral_grid_norm() {
        let grid = SpectralGrid::new(5);
        let norm = grid.k_norm();

        assert_eq!(norm.shape(), [5, 5, 5]);
        assert_eq!(norm[[0, 0, 0]], 1.);

        Zip::indexed(&norm)
            .and(grid.k_mesh().lanes(Axis(0)))
            .for_each(|idx, &n, k| {
                if idx != (0, 0, 0) {
                    let e = k.dot(&k).sqrt();
                    assert!(equal_floats_tol(n, e, 1e-15), "{} != {} at {:?}", n, e, idx);
                }
            });

        // k = (2, -2, -1) => |k| = 3
        assert!(equal_floats(norm[[2, 3, 4]], 3.));
    }

    #[test]
    fn decay_keeps_mean_flow() {
        let grid = SpectralGrid::new(6);

        for &(dt, nu) in &[(0.1, 0.), (0.1, 1e-4), (10., 3.), (1e-3, 1e3)] {
            let decay = grid.decay(dt, nu);
            assert_eq!(decay[[0, 0, 0]], 1.);
            assert!(decay.iter().all(|&d| d >= 0.));
            assert!(decay.iter().all(|&d| d <= 1.));
        }
    }

    #[test]
    fn decay_values() {
        let grid = SpectralGrid::new(4);
        let decay = grid.decay(0.5, 0.1);

        // k = (1, 2, -1) => |k|^2 = 6
        assert!(equal_floats_tol(decay[[1, 2, 3]], (-0.3f64).exp(), 1e-15));

        let inviscid = grid.decay(0.5, 0.);
        assert!(inviscid.iter().all(|&d| d == 1.));
    }
}
