#![warn(missing_docs)]
//! Deterministic testing surfaces: fixture worlds and JSONL event logs.

mod fixture;

use ambience_core::SimTick;
use anyhow::Result;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use fixture::*;

/// Event record captured by headless runs and tests.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a, T: Serialize> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Structured payload.
    pub payload: &'a T,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    writer: BufWriter<File>,
    written: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append an event to the log.
    pub fn write<T: Serialize>(&mut self, event: &EventRecord<'_, T>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            tracing::warn!("Failed to flush event log: {err}");
        }
    }
}
