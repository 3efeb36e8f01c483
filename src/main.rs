#[macro_use]
extern crate log;

use stablefluids::errors::*;
use stablefluids::output::path::OutputPath;
use stablefluids::output::worker::Worker;
use stablefluids::settings::{read_parameter_file, Settings};
use stablefluids::timedisplay::pretty_print_duration;
use stablefluids::{Simulation, VERSION};
use std::env;
use std::path::Path;
use std::time::Instant;

fn main() {
    env_logger::init();

    // parse command line arguments
    let args: Vec<String> = env::args().collect();

    match args.len() {
        2 => {
            if let Err(ref e) = run(&args[1]) {
                error!("error: {}", e);

                for e in e.iter().skip(1) {
                    error!("caused by: {}", e);
                }

                // The backtrace is not always generated. Try to run this example
                // with `RUST_BACKTRACE=1`.
                if let Some(backtrace) = e.backtrace() {
                    error!("backtrace: {:?}", backtrace);
                }

                ::std::process::exit(1);
            }
        }
        1 => {
            eprintln!("Please pass a parameter file.");
            eprintln!("Usage: {} <parameter-file>", args[0]);
            ::std::process::exit(1)
        }
        _ => {
            eprintln!("You've passed too many arguments. Please don't do that.");
            eprintln!("Usage: {} <parameter-file>", args[0]);
            ::std::process::exit(1)
        }
    }
}

fn run(param_file: &str) -> Result<()> {
    let start = Instant::now();

    info!("stablefluids v{}", VERSION);

    let mut settings: Settings =
        read_parameter_file(param_file).chain_err(|| "Error reading parameter file.")?;
    settings.set_version(VERSION);

    let sim = &settings.simulation;
    info!(
        "Grid {0}x{0}x{0}, {1} timesteps of {2}, viscosity {3}",
        sim.grid_size, sim.number_of_timesteps, sim.timestep, settings.parameters.viscosity
    );

    if let Some(n) = settings.environment.num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .chain_err(|| "Unable to configure thread pool.")?;
    }
    info!("Using {} threads.", rayon::current_num_threads());

    let output_path = OutputPath::new(
        Path::new(&settings.environment.output_dir),
        &settings.environment.prefix,
    )?;
    output_path.create()?;
    info!("Writing output to '{}'.", output_path.dir()?.display());

    let mut simulation = Simulation::new(settings.clone())?;

    let mut worker = Worker::new(
        settings.environment.io_queue_size,
        &output_path,
        settings.environment.output_format,
        settings.simulation.output_at_timestep.velocity,
    )?;
    worker.write_metadata(settings)?;

    let result = simulation.run(&mut worker);

    // flush pending output also on failure, the worker's own error comes first
    worker.quit().chain_err(|| "IO worker failed.")?;
    result.chain_err(|| "Error during simulation.")?;

    info!(
        "Finished {} timesteps in {}.",
        simulation.get_timestep(),
        pretty_print_duration(start.elapsed())
    );

    Ok(())
}
