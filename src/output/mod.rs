//! Hand-off of committed velocity fields.

use crate::errors::*;
use crate::flowfield::VelocityField;
use ndarray::{ArrayView, Ix4};
use serde::{Deserialize, Serialize};

pub mod path;
pub mod worker;

/// Receives the committed velocity field after every timestep.
///
/// The view is only valid for the duration of the call, sinks that keep the
/// data have to copy it.
pub trait OutputSink {
    fn emit(&mut self, timestep: usize, time: f64, velocity: ArrayView<f64, Ix4>) -> Result<()>;
}

/// Point-in-time copy of the velocity field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputEntry {
    pub timestep: usize,
    pub time: f64,
    pub velocity: VelocityField,
}

impl OutputEntry {
    pub fn new(timestep: usize, time: f64, velocity: ArrayView<f64, Ix4>) -> OutputEntry {
        OutputEntry {
            timestep,
            time,
            velocity: velocity.to_owned(),
        }
    }
}

/// Keeps the whole trajectory in memory.
impl OutputSink for Vec<OutputEntry> {
    fn emit(&mut self, timestep: usize, time: f64, velocity: ArrayView<f64, Ix4>) -> Result<()> {
        self.push(OutputEntry::new(timestep, time, velocity));
        Ok(())
    }
}

/// Discards every field.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _: usize, _: f64, _: ArrayView<f64, Ix4>) -> Result<()> {
        Ok(())
    }
}
