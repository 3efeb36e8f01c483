use super::Grid;
use lerp::Lerp;
use ndarray::{s, ArrayView, Ix3};

/// Returns the index of the cell containing the coordinate `p` along one
/// axis, together with the relative position of `p` inside that cell.
///
/// `p` must lie in `[0, 1]`. The upper face is itself a knot and is assigned
/// to the last cell.
pub fn get_cell_index(p: f64, grid: &Grid) -> (usize, f64) {
    let s = p / grid.spacing();
    let mut i = s.floor() as usize;

    if i >= grid.size() - 1 {
        i = grid.size() - 2;
    }

    (i, (s - i as f64).min(1.))
}

/// Trilinear interpolation inside a cube of `2 x 2 x 2` values, where
/// `relative_position` is given in units of the cube's edge length.
pub fn trilinear_interpolation(relative_position: [f64; 3], values: &ArrayView<f64, Ix3>) -> f64 {
    let [x, y, z] = relative_position;

    let c00 = Lerp::lerp(values[[0, 0, 0]], values[[1, 0, 0]], x);
    let c01 = Lerp::lerp(values[[0, 0, 1]], values[[1, 0, 1]], x);
    let c10 = Lerp::lerp(values[[0, 1, 0]], values[[1, 1, 0]], x);
    let c11 = Lerp::lerp(values[[0, 1, 1]], values[[1, 1, 1]], x);

    let c0 = Lerp::lerp(c00, c10, y);
    let c1 = Lerp::lerp(c01, c11, y);

    Lerp::lerp(c0, c1, z)
}

/// Interpolates the scalar `field` given on the knots of `grid` at
/// `position`. All coordinates of `position` must lie in `[0, 1]`.
pub fn interpolate_scalar_field(
    position: [f64; 3],
    field: &ArrayView<f64, Ix3>,
    grid: &Grid,
) -> f64 {
    let (ix, rx) = get_cell_index(position[0], grid);
    let (iy, ry) = get_cell_index(position[1], grid);
    let (iz, rz) = get_cell_index(position[2], grid);

    let cube = field.slice(s![ix..ix + 2, iy..iy + 2, iz..iz + 2]);

    trilinear_interpolation([rx, ry, rz], &cube)
}

/// Whether a coordinate can be used as interpolation query, i.e. lies within
/// the knot range `[0, 1]`.
pub fn is_in_domain(p: f64) -> bool {
    (0. ..=1.).contains(&p)
}
