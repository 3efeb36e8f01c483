use crate::errors::*;
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::OffsetDateTime;

/// `OutputPath` represents a common path, which all files written to disk
/// share.
///
/// The `.with_extension()` method allows for easy change of file extension, to
/// differentiate between the outputs.
#[derive(Clone, Debug)]
pub struct OutputPath {
    path: PathBuf,
}

impl OutputPath {
    pub fn new(root: &Path, prefix: &str) -> Result<OutputPath> {
        let id = create_output_id(prefix)?;

        Ok(OutputPath {
            path: root.join(&id).join(&id),
        })
    }

    pub fn create(&self) -> Result<()> {
        // create directory containing all produced files
        create_output_dir(self.dir()?)
    }

    /// Directory all files are written to.
    pub fn dir(&self) -> Result<&Path> {
        Ok(self
            .path
            .parent()
            .ok_or("Output path has no parent directory")?)
    }

    /// Common stem of all file names.
    pub fn id(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    // Returns path with given file extension.
    pub fn with_extension(&self, ext: &str) -> PathBuf {
        self.path.with_extension(ext)
    }
}

/// Returns an ID based on prefix, time, and version for simulation output
fn create_output_id(prefix: &str) -> Result<String> {
    // Dots would be taken for an extension by `.with_extension()`.
    let v = crate::VERSION.replace('.', "_");
    let now = OffsetDateTime::now_utc()
        .format(format_description!(
            "[year]-[month]-[day]_[hour][minute][second]"
        ))
        .chain_err(|| "Unable to format current time.")?;

    Ok(format!(
        "{prefix}-{time}_v{version}",
        prefix = prefix,
        time = now,
        version = v
    ))
}

/// Creates own ouput directory in output path using id.
fn create_output_dir(path: &Path) -> Result<()> {
    DirBuilder::new()
        .recursive(true)
        .create(path)
        .chain_err(|| format!("Unable to create output directory '{}'", path.display()))
}
