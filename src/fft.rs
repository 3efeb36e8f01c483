//! In-place three dimensional complex-to-complex FFTs on ndarray views.
//!
//! A plan holds one `rustfft` plan per axis and transforms a 3D array by
//! applying them along every lane of the respective axis.

use crate::errors::*;
use ndarray::{ArrayViewMut, Axis, Ix3};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FFTDirection {
    Forward,
    Backward,
}

/// Reusable plan for arrays of a fixed shape.
pub struct FFTPlan {
    shape: [usize; 3],
    direction: FFTDirection,
    axes: [Arc<dyn Fft<f64>>; 3],
}

impl FFTPlan {
    /// Create a new complex to complex plan for an inplace transformation
    /// of arrays with shape `shape`.
    /// WARNING: This is an unormalized transformation. A forwards and
    /// backwards transformation will lead to input data scaled by the number
    /// of elements.
    pub fn new_c2c_inplace_3d(shape: [usize; 3], direction: FFTDirection) -> Result<FFTPlan> {
        if shape.iter().any(|&n| n == 0) {
            bail!("Cannot plan a FFT for an empty array of shape {:?}.", shape);
        }

        let mut planner = FftPlanner::new();
        let mut plan = |n: usize| match direction {
            FFTDirection::Forward => planner.plan_fft_forward(n),
            FFTDirection::Backward => planner.plan_fft_inverse(n),
        };

        let axes = [plan(shape[0]), plan(shape[1]), plan(shape[2])];

        Ok(FFTPlan {
            shape,
            direction,
            axes,
        })
    }

    pub fn direction(&self) -> FFTDirection {
        self.direction
    }

    /// Reuse plan for different arrays of the planned shape.
    pub fn reexecute3d(&self, a: &mut ArrayViewMut<Complex<f64>, Ix3>) {
        debug_assert_eq!(a.shape(), &self.shape[..], "array does not match plan");

        for (axis, fft) in self.axes.iter().enumerate() {
            let n = self.shape[axis];
            let mut buffer = vec![Complex::new(0., 0.); n];
            let mut scratch = vec![Complex::new(0., 0.); fft.get_inplace_scratch_len()];

            for mut lane in a.lanes_mut(Axis(axis)) {
                for (b, v) in buffer.iter_mut().zip(lane.iter()) {
                    *b = *v;
                }

                fft.process_with_scratch(&mut buffer, &mut scratch);

                for (v, b) in lane.iter_mut().zip(buffer.iter()) {
                    *v = *b;
                }
            }
        }
    }
}
