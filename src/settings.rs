//! This module handles a TOML settings file.

use crate::errors::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::prelude::*;

const DEFAULT_IO_QUEUE_SIZE: usize = 1;
const DEFAULT_OUTPUT_FORMAT: OutputFormat = OutputFormat::CBOR;
const DEFAULT_OUTPUT_DIR: &str = ".";
const DEFAULT_PREFIX: &str = "stablefluids";

/// Structure that holds settings, which are defined externally in a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub parameters: Parameters,
    pub environment: EnvironmentSettings,
}

/// Velocity component a force acts on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Component {
    X,
    Y,
    Z,
}

impl Component {
    /// Index of the component along the first axis of a velocity field.
    pub fn index(self) -> usize {
        match self {
            Component::X => 0,
            Component::Y => 1,
            Component::Z => 2,
        }
    }
}

/// Axis aligned box `lower < x < upper` in the unit cube.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Region {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

impl Region {
    pub fn new(lower: [f64; 3], upper: [f64; 3]) -> Region {
        Region { lower, upper }
    }

    /// Whether `p` lies strictly inside the box.
    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|i| self.lower[i] < p[i] && p[i] < self.upper[i])
    }

    /// Whether the interiors of both boxes intersect.
    pub fn overlaps(&self, other: &Region) -> bool {
        (0..3).all(|i| self.lower[i] < other.upper[i] && other.lower[i] < self.upper[i])
    }
}

/// Two opposite patches of constant force, acting on a single component.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ForcingSettings {
    pub magnitude: f64,
    pub component: Component,
    /// Receives `+magnitude`
    pub source: Region,
    /// Receives `-magnitude`
    pub sink: Region,
}

/// Holds phyiscal parameters
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    /// Kinematic viscosity
    pub viscosity: f64,
    pub forcing: ForcingSettings,
}

/// Holds output configuration
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Output {
    #[serde(default)]
    pub velocity: Option<usize>,
}

/// Holds simulation specific settings.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    pub grid_size: usize,
    pub number_of_timesteps: usize,
    #[serde(default)]
    pub output_at_timestep: Output,
    pub timestep: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    CBOR,
    Bincode,
    MsgPack,
}

impl OutputFormat {
    /// File extension used for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::CBOR => "cbor",
            OutputFormat::Bincode => "bincode",
            OutputFormat::MsgPack => "msgpack",
        }
    }
}

/// Holds environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSettings {
    #[serde(default = "default_io_queue_size")]
    pub io_queue_size: usize,
    #[serde(default)]
    pub num_threads: Option<usize>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
    pub prefix: String,
    #[serde(default)]
    version: String,
}

/// Default value of IO queue size
fn default_io_queue_size() -> usize {
    DEFAULT_IO_QUEUE_SIZE
}

/// Default output format
fn default_output_format() -> OutputFormat {
    DEFAULT_OUTPUT_FORMAT
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        EnvironmentSettings {
            io_queue_size: DEFAULT_IO_QUEUE_SIZE,
            num_threads: None,
            output_dir: default_output_dir(),
            output_format: DEFAULT_OUTPUT_FORMAT,
            prefix: DEFAULT_PREFIX.to_string(),
            version: String::new(),
        }
    }
}

/// Reads the content of a file `filename` into an string and return it.
fn read_from_file(filename: &str) -> Result<String> {
    let mut f = File::open(filename).chain_err(|| "Unable to open file.")?;
    let mut content = String::new();

    f.read_to_string(&mut content)
        .chain_err(|| "Unable to read file.")?;

    Ok(content)
}

/// Reads content of a file `param_file`, that should point to a valid TOML
/// file, and parses it.
/// Then returns the validated settings.
pub fn read_parameter_file(param_file: &str) -> Result<Settings> {
    // read .toml file into string
    let toml_string =
        read_from_file(param_file).chain_err(|| "Unable to read parameter file.")?;

    let mut settings: Settings =
        toml::from_str(&toml_string).chain_err(|| "Unable to parse parameter file.")?;

    settings.environment.version = "".to_string();

    settings.check()?;

    Ok(settings)
}

fn invalid<T>(reason: String) -> Result<T> {
    Err(ErrorKind::InvalidSettings(reason).into())
}

fn check_region(name: &str, r: &Region) -> Result<()> {
    for i in 0..3 {
        if !r.lower[i].is_finite() || !r.upper[i].is_finite() || r.lower[i] >= r.upper[i] {
            return invalid(format!(
                "forcing {} must satisfy lower < upper on every axis: {:?}",
                name, r
            ));
        }
    }

    Ok(())
}

impl Settings {
    /// Settings for a run without output configuration.
    pub fn new(
        grid_size: usize,
        number_of_timesteps: usize,
        timestep: f64,
        viscosity: f64,
        forcing: ForcingSettings,
    ) -> Settings {
        Settings {
            simulation: SimulationSettings {
                grid_size,
                number_of_timesteps,
                output_at_timestep: Output::default(),
                timestep,
            },
            parameters: Parameters { viscosity, forcing },
            environment: EnvironmentSettings::default(),
        }
    }

    /// Validates the settings, every violation is reported as
    /// `InvalidSettings`.
    pub fn check(&self) -> Result<()> {
        let sim = &self.simulation;
        let param = &self.parameters;

        if sim.grid_size < 2 {
            return invalid(format!("grid_size must be at least 2, got {}", sim.grid_size));
        }

        if sim.number_of_timesteps < 1 {
            return invalid("number_of_timesteps must be at least 1".to_string());
        }

        if !(sim.timestep.is_finite() && sim.timestep > 0.) {
            return invalid(format!("timestep must be positive, got {}", sim.timestep));
        }

        if sim.output_at_timestep.velocity == Some(0) {
            return invalid("output interval for velocity must be at least 1".to_string());
        }

        if !(param.viscosity.is_finite() && param.viscosity >= 0.) {
            return invalid(format!(
                "viscosity must not be negative, got {}",
                param.viscosity
            ));
        }

        let forcing = &param.forcing;
        if !forcing.magnitude.is_finite() {
            return invalid(format!(
                "forcing magnitude must be finite, got {}",
                forcing.magnitude
            ));
        }

        check_region("source", &forcing.source)?;
        check_region("sink", &forcing.sink)?;

        if forcing.source.overlaps(&forcing.sink) {
            return invalid("forcing source and sink must not overlap".to_string());
        }

        if self.environment.io_queue_size < 1 {
            return invalid("io_queue_size must be at least 1".to_string());
        }

        if self.environment.num_threads == Some(0) {
            return invalid("num_threads must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn set_version(&mut self, version: &str) {
        // save version to metadata
        self.environment.version = version.to_string();
    }

    pub fn version(&self) -> &str {
        &self.environment.version
    }

    /// Writes the settings as TOML to `filename`.
    pub fn save_to_file(&self, filename: &str) -> Result<()> {
        let toml_string = toml::to_string(self).chain_err(|| "Unable to serialize settings.")?;

        let mut f = File::create(filename)
            .chain_err(|| format!("Unable to create settings file '{}'.", filename))?;

        f.write_all(toml_string.as_bytes())
            .chain_err(|| "Unable to write settings file.")?;

        Ok(())
    }
}
