//! This crate advances the velocity field of an incompressible, viscous fluid
//! in the periodic unit cube with the "Stable Fluids" scheme.
//!
//! Every time step applies an explicit external force, advects the velocity
//! semi-Lagrangian along the characteristics and finally diffuses and
//! projects the result onto its divergence free part in Fourier space. The
//! numerical kernels live in `flowfield`, the time stepping in `simulation`.

#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

pub mod fft;
pub mod flowfield;
pub mod mesh;
pub mod output;
pub mod settings;
pub mod simulation;
pub mod timedisplay;

#[cfg(test)]
mod test_helper;

pub use crate::settings::Settings;
pub use crate::simulation::Simulation;

/// Version of this crate, saved alongside every output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain! {
        errors {
            InvalidSettings(reason: String) {
                description("invalid settings")
                display("Invalid settings: {}", reason)
            }
            InvariantViolation(reason: String) {
                description("internal invariant violated")
                display("Internal invariant violated: {}", reason)
            }
            NonFiniteVelocity(timestep: usize) {
                description("velocity field is not finite")
                display("Velocity field became non-finite in timestep {}", timestep)
            }
        }
    }
}
