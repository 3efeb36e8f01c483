//! Writes simulation output on a separate thread.

use super::path::OutputPath;
use super::{OutputEntry, OutputSink};
use crate::errors::*;
use crate::settings::{OutputFormat, Settings};
use ndarray::{ArrayView, Ix4};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

/// Message type for the IO worker thread channel.
pub enum IOWorkerMsg {
    Quit,
    Output(OutputEntry),
    Settings(Settings),
}

/// Time ordered index of all written velocity fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Series {
    pub entries: Vec<SeriesEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesEntry {
    pub timestep: usize,
    pub time: f64,
    /// file name relative to the series manifest
    pub file: String,
}

pub struct Worker {
    tx: SyncSender<IOWorkerMsg>,
    io_worker: JoinHandle<Result<()>>,
    interval: usize,
    output_path: OutputPath,
}

impl Worker {
    /// Spawns the IO thread. Every `interval`-th timestep is written, every
    /// timestep if `None`.
    pub fn new(
        io_queue_size: usize,
        output_path: &OutputPath,
        output_format: OutputFormat,
        interval: Option<usize>,
    ) -> Result<Worker> {
        let interval = interval.unwrap_or(1);
        if interval == 0 {
            bail!(ErrorKind::InvalidSettings(
                "output interval must be at least 1".to_string()
            ));
        }

        // Create communication channel for thread
        let (tx, rx) = mpsc::sync_channel::<IOWorkerMsg>(io_queue_size);

        // clone, so it can be moved into thread closure
        let op = output_path.clone();

        // Spawn worker thread, that flushes simulation states to disk.
        let io_worker = thread::Builder::new()
            .name("io-worker".to_string())
            .spawn(move || dispatch(&rx, output_format, &op))
            .chain_err(|| "Cannot spawn IO worker thread.")?;

        Ok(Worker {
            tx,
            io_worker,
            interval,
            output_path: output_path.clone(),
        })
    }

    pub fn write_metadata(&self, settings: Settings) -> Result<()> {
        self.tx
            .send(IOWorkerMsg::Settings(settings))
            .chain_err(|| "Cannot write metadata to output file.")
    }

    pub fn append(&self, output: OutputEntry) -> Result<()> {
        debug!("Output of timestep {} was queued.", output.timestep);
        self.tx
            .send(IOWorkerMsg::Output(output))
            .chain_err(|| "Cannot append data to output queue.")?;

        Ok(())
    }

    /// Path of the series manifest, written on quit.
    pub fn series_path(&self) -> PathBuf {
        series_path(&self.output_path)
    }

    /// Flushes the queue, writes the series manifest and joins the thread.
    pub fn quit(self) -> Result<()> {
        // a failed worker has dropped the receiver, join reports its error
        if self.tx.send(IOWorkerMsg::Quit).is_err() {
            warn!("IO worker stopped before it was asked to quit.");
        }

        match self.io_worker.join() {
            Ok(v) => v,
            Err(_) => bail!("Cannot join IO worker thread."),
        }
    }
}

impl OutputSink for Worker {
    fn emit(&mut self, timestep: usize, time: f64, velocity: ArrayView<f64, Ix4>) -> Result<()> {
        if (timestep + 1) % self.interval == 0 {
            self.append(OutputEntry::new(timestep, time, velocity))?;
        }

        Ok(())
    }
}

fn series_path(path: &OutputPath) -> PathBuf {
    path.with_extension("series.toml")
}

fn write_entry(filepath: &Path, format: OutputFormat, v: &OutputEntry) -> Result<()> {
    let file = File::create(filepath)
        .chain_err(|| format!("Cannot create output file '{}'.", filepath.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::CBOR => serde_cbor::to_writer(&mut writer, v)
            .chain_err(|| "Cannot write simulation output (format: CBOR).")?,
        OutputFormat::Bincode => bincode::serialize_into(&mut writer, v)
            .chain_err(|| "Cannot write simulation output (format: Bincode).")?,
        OutputFormat::MsgPack => rmp_serde::encode::write_named(&mut writer, v)
            .chain_err(|| "Cannot write simulation output (format: MsgPack).")?,
    }

    writer
        .flush()
        .chain_err(|| "Error flushing simulation output to disk")
}

fn dispatch(rx: &Receiver<IOWorkerMsg>, format: OutputFormat, path: &OutputPath) -> Result<()> {
    let mut series = Series::default();

    // A closed channel ends the worker like `Quit`.
    while let Ok(msg) = rx.recv() {
        match msg {
            IOWorkerMsg::Quit => break,

            IOWorkerMsg::Output(v) => {
                debug!("Writing output of timestep {}.", v.timestep);
                let filepath =
                    path.with_extension(&format!("{}.{}", v.timestep, format.extension()));

                write_entry(&filepath, format, &v)?;

                series.entries.push(SeriesEntry {
                    timestep: v.timestep,
                    time: v.time,
                    file: filepath
                        .file_name()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                });
            }

            IOWorkerMsg::Settings(s) => {
                debug!("Write parameters into output directory.");
                let filepath = path.with_extension("settings.toml");
                s.save_to_file(&filepath.to_string_lossy())?;
            }
        }
    }

    let manifest = series_path(path);
    let toml_string =
        toml::to_string(&series).chain_err(|| "Unable to serialize series manifest.")?;
    let mut f = File::create(&manifest)
        .chain_err(|| format!("Cannot create series file '{}'.", manifest.display()))?;
    f.write_all(toml_string.as_bytes())
        .chain_err(|| "Unable to write series file.")?;

    debug!("Output queue closed.");

    Ok(())
}
