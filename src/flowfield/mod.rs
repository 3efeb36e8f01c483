use ndarray::{Array, ArrayView, Axis, Ix4};

/// Velocity field on the grid, the first axis denotes the component:
///     `v[c, i, j, m] -> v_c(x_i, y_j, z_m)`
pub type VelocityField = Array<f64, Ix4>;

pub mod advection;
pub mod forcing;
pub mod spectral_solver;

/// Returns the mean kinetic energy density `1/2 <|v|^2>` of a velocity field.
pub fn kinetic_energy(v: ArrayView<f64, Ix4>) -> f64 {
    let v2 = (&v * &v).sum_axis(Axis(0));
    0.5 * v2.mean().unwrap_or(0.)
}

/// Whether every entry of the field is finite.
pub fn is_finite(v: ArrayView<f64, Ix4>) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helper::equal_floats;

    #[test]
    fn kinetic_energy_of_uniform_flow() {
        let mut v = VelocityField::zeros((3, 3, 3, 3));
        v.index_axis_mut(Axis(0), 0).fill(1.);
        v.index_axis_mut(Axis(0), 2).fill(-2.);

        assert!(equal_floats(kinetic_energy(v.view()), 2.5));
        assert!(equal_floats(kinetic_energy(VelocityField::zeros((3, 2, 2, 2)).view()), 0.));
    }

    #[test]
    fn finiteness() {
        let mut v = VelocityField::zeros((3, 2, 2, 2));
        assert!(is_finite(v.view()));

        v[[1, 0, 1, 0]] = ::std::f64::NAN;
        assert!(!is_finite(v.view()));

        v[[1, 0, 1, 0]] = ::std::f64::INFINITY;
        assert!(!is_finite(v.view()));
    }
}
