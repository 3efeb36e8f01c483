use super::*;
use crate::flowfield::kinetic_energy;
use crate::test_helper::equal_floats_tol;
use quickcheck::quickcheck;
use std::f64::consts::PI;

/// Some deterministic, irregular field.
fn scrambled_field(n: usize) -> VelocityField {
    Array::from_shape_fn((3, n, n, n), |(c, i, j, k)| {
        ((c * 131 + i * 37 + j * 17 + k * 7) as f64 * 0.618).sin() + 0.1 * c as f64
    })
}

fn assert_fields_close(a: ArrayView<f64, Ix4>, b: ArrayView<f64, Ix4>, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for ((idx, x), y) in a.indexed_iter().zip(b.iter()) {
        assert!(equal_floats_tol(*x, *y, tol), "{} != {} at {:?}", x, y, idx);
    }
}

#[test]
fn new_rejects_empty_grid() {
    assert!(SpectralSolver::new(0, 0.1, 0.1).is_err());
}

#[test]
fn forward_backward_round_trip() {
    for &n in &[2, 3, 4, 5, 8] {
        let solver = SpectralSolver::new(n, 0.1, 1.).unwrap();
        let v = scrambled_field(n);

        let r = solver.backward(solver.forward(v.view()));

        assert_fields_close(r.view(), v.view(), 1e-12);
    }
}

#[test]
fn decay_keeps_zero_mode() {
    for &(dt, nu) in &[(0.1, 0.), (0.1, 1.), (10., 100.), (1e-3, 0.5)] {
        let solver = SpectralSolver::new(4, dt, nu).unwrap();
        assert_eq!(solver.decay()[[0, 0, 0]], 1.);
        assert!(solver.decay().iter().all(|&d| (0. ..=1.).contains(&d)));
    }
}

#[test]
fn normalized_wavevectors() {
    let solver = SpectralSolver::new(6, 0.1, 0.1).unwrap();
    assert!(solver.spectral_grid().is_consistent());
}

// Odd grid sizes have no Nyquist mode, so the real part of the projected
// field is divergence free at every mode. Even sizes are covered below.
#[test]
fn projection_removes_divergence() {
    for &n in &[3, 5, 7] {
        let solver = SpectralSolver::new(n, 0.1, 0.).unwrap();
        let v = scrambled_field(n);

        assert!(solver.max_divergence(v.view()) > 1e-3);

        let p = solver.diffuse_and_project(v.view());
        let div = solver.max_divergence(p.view());
        assert!(div < 1e-10, "divergence {} for n = {}", div, n);
    }
}

#[test]
fn projection_removes_divergence_below_nyquist() {
    // For even n the Nyquist index n/2 carries the wavenumber +n/2 for both
    // conjugate partners, so taking the real part after the projection
    // leaves divergence only on modes with a Nyquist component.
    for &n in &[4, 6] {
        let solver = SpectralSolver::new(n, 0.1, 0.).unwrap();
        let v = scrambled_field(n);

        // the projected spectrum itself is orthogonal to k on every mode
        let mut s = solver.forward(v.view());
        project(&mut s.view_mut(), solver.spectral_grid().k_normed_mesh());
        Zip::from(s.lanes(Axis(0)))
            .and(solver.spectral_grid().k_mesh().lanes(Axis(0)))
            .for_each(|v, k| {
                let d = (v[0] * k[0] + v[1] * k[1] + v[2] * k[2]).norm();
                assert!(d < 1e-9, "{}", d);
            });

        let p = solver.diffuse_and_project(v.view());
        let s = solver.forward(p.view());
        let norm = n.pow(3) as f64;

        Zip::indexed(s.lanes(Axis(0)))
            .and(solver.spectral_grid().k_mesh().lanes(Axis(0)))
            .for_each(|(i, j, m), v, k| {
                if i != n / 2 && j != n / 2 && m != n / 2 {
                    let d = (v[0] * k[0] + v[1] * k[1] + v[2] * k[2]).norm() / norm;
                    assert!(d < 1e-12, "divergence {} at {:?} for n = {}", d, (i, j, m), n);
                }
            });
    }
}

#[test]
fn mean_flow_is_preserved() {
    for &n in &[4, 5] {
        let solver = SpectralSolver::new(n, 0.5, 2.).unwrap();
        let v = scrambled_field(n);
        let p = solver.diffuse_and_project(v.view());

        for (a, b) in v.outer_iter().zip(p.outer_iter()) {
            let (ma, mb) = (a.mean().unwrap(), b.mean().unwrap());
            assert!(equal_floats_tol(ma, mb, 1e-12), "{} != {}", ma, mb);
        }
    }
}

#[test]
fn shear_flow_is_only_diffused() {
    // v_x depends on y only, hence is divergence free
    let n = 6;
    let dt = 0.1;
    let nu = 0.3;
    let v = Array::from_shape_fn((3, n, n, n), |(c, _, j, _)| {
        if c == 0 {
            (2. * PI * j as f64 / n as f64).sin()
        } else {
            0.
        }
    });

    let inviscid = SpectralSolver::new(n, dt, 0.).unwrap();
    let p = inviscid.diffuse_and_project(v.view());
    assert_fields_close(p.view(), v.view(), 1e-12);

    let viscous = SpectralSolver::new(n, dt, nu).unwrap();
    let p = viscous.diffuse_and_project(v.view());
    let expected = &v * (-dt * nu).exp();
    assert_fields_close(p.view(), expected.view(), 1e-12);
}

#[test]
fn compression_is_removed() {
    // v_x depends on x only, a pure gradient
    let n = 6;
    let v = Array::from_shape_fn((3, n, n, n), |(c, i, _, _)| {
        if c == 0 {
            (2. * PI * i as f64 / n as f64).cos()
        } else {
            0.
        }
    });

    let solver = SpectralSolver::new(n, 0.1, 0.).unwrap();
    let p = solver.diffuse_and_project(v.view());

    assert_fields_close(p.view(), VelocityField::zeros(v.raw_dim()).view(), 1e-12);
}

#[test]
fn energy_does_not_grow() {
    let n = 5;
    let solver = SpectralSolver::new(n, 0.1, 0.05).unwrap();
    let v = scrambled_field(n);
    let p = solver.diffuse_and_project(v.view());

    assert!(p.iter().all(|x| x.is_finite()));
    assert!(kinetic_energy(p.view()) <= kinetic_energy(v.view()) + 1e-12);
}

#[test]
fn diffuse_scales_modes() {
    let mut s = Spectrum::from_elem((3, 2, 2, 2), Complex::new(1., -1.));
    let decay = Array::from_shape_fn((2, 2, 2), |(i, j, k)| (i + j + k) as f64 * 0.5);

    diffuse(&mut s.view_mut(), decay.view());

    assert_eq!(s[[0, 0, 0, 0]], Complex::new(0., 0.));
    assert_eq!(s[[2, 1, 1, 0]], Complex::new(1., -1.));
    assert_eq!(s[[1, 1, 1, 1]], Complex::new(1.5, -1.5));
}

quickcheck! {
    fn prop_projection_is_idempotent(values: Vec<(f64, f64)>) -> bool {
        let values: Vec<Complex<f64>> = values
            .into_iter()
            .filter(|&(a, b)| a.is_finite() && b.is_finite())
            .map(|(a, b)| Complex::new(a.fract(), b.fract()))
            .collect();
        if values.is_empty() {
            return true;
        }

        let n = 4;
        let grid = SpectralGrid::new(n);
        let mut s = Spectrum::from_shape_fn((3, n, n, n), |(c, i, j, k)| {
            values[(c * 64 + i * 16 + j * 4 + k) % values.len()]
        });

        project(&mut s.view_mut(), grid.k_normed_mesh());
        let once = s.clone();
        project(&mut s.view_mut(), grid.k_normed_mesh());

        s.iter().zip(once.iter()).all(|(a, b)| (a - b).norm() < 1e-12)
    }
}
