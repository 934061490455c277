// Conversion progress tracing
// Append-only JSONL trace file for monitoring a conversion run

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing or reading a trace
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// The conversion stages a trace entry can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Scanning the tempo track for breakpoints
    TempoScan,

    /// Rescaling track delta-times to the target tempo
    TempoNormalize,

    /// Folding pitches into the playable band
    Transpose,

    /// Decomposing instrument tracks into monophonic lanes
    LaneSplit,
}

/// A single entry in the conversion trace log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// RFC 3339 timestamp of when this entry was created
    pub timestamp: String,

    /// Conversion stage this entry belongs to
    pub stage: Stage,

    /// Progress through the whole conversion [0.0, 1.0]
    pub progress: f32,

    /// Human-readable description of what just happened
    pub message: String,

    /// Optional structured data (breakpoint counts, lane counts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    /// Create a new trace entry with the current timestamp
    pub fn new(stage: Stage, progress: f32, message: impl Into<String>) -> Self {
        TraceEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            data: None,
        }
    }

    /// Create a trace entry carrying structured data
    pub fn with_data(
        stage: Stage,
        progress: f32,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        TraceEntry {
            data: Some(data),
            ..TraceEntry::new(stage, progress, message)
        }
    }

    /// Serialize to a JSON line, newline included
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Appends trace entries to a JSONL file, creating it on first write
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    pub fn new(file_path: PathBuf) -> Self {
        TraceWriter { file_path }
    }

    /// Append one entry to the trace file
    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        file.write_all(entry.to_json_line()?.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// The trace file path
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Read all trace entries back from a JSONL file
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(line)?);
    }

    Ok(entries)
}
