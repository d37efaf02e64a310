//! Sound Logger
//!
//! Append-only JSONL log of propagated sounds.

use bevy_ecs::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

use super::types::SoundRecord;
use crate::components::field::SoundField;

/// Resource for logging sounds to a JSONL file
#[derive(Resource)]
pub struct SoundLogger {
    writer: Option<BufWriter<File>>,
    record_count: u64,
    next_record_id: u64,
}

impl SoundLogger {
    /// Create a new logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            record_count: 0,
            next_record_id: 1,
        })
    }

    /// Create a logger that discards records
    pub fn null() -> Self {
        Self {
            writer: None,
            record_count: 0,
            next_record_id: 1,
        }
    }

    /// Generate the next record ID
    pub fn next_id(&mut self) -> String {
        let id = format!("snd_{:08}", self.next_record_id);
        self.next_record_id += 1;
        id
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Log a propagated field
    pub fn log(&mut self, turn: u64, field: &SoundField) -> std::io::Result<()> {
        let record = SoundRecord::from_field(self.next_id(), turn, field);
        self.log_record(&record)
    }

    pub fn log_record(&mut self, record: &SoundRecord) -> std::io::Result<()> {
        self.record_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for SoundLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "Failed to flush sound logger");
        }
    }
}
