// Detection progress tracing
// Per-stage trace records, persisted as append-only JSONL

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during trace operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Stage of the detection pipeline a trace entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStage {
    Filter,
    Cluster,
    Synthesize,
}

/// One record of pipeline progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// RFC 3339 creation time
    pub timestamp: String,

    pub stage: TraceStage,

    /// Overall progress [0.0, 1.0]
    pub progress: f32,

    pub message: String,

    /// Stage counters (frames kept, clusters formed, notes dropped...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    pub fn new(stage: TraceStage, progress: f32, message: impl Into<String>) -> Self {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            data: None,
        }
    }

    /// Attach structured data to the entry
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize to a single JSON line terminated by `\n`
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
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

    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        self.write_batch(std::slice::from_ref(entry))
    }

    pub fn write_batch(&self, entries: &[TraceEntry]) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        for entry in entries {
            file.write_all(entry.to_json_line()?.as_bytes())?;
        }

        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Read trace entries back from a JSONL file, skipping blank lines
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = std::fs::read_to_string(path)?;

    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(TraceError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_progress_clamping() {
        let low = TraceEntry::new(TraceStage::Filter, -0.5, "low");
        assert_eq!(low.progress, 0.0);

        let high = TraceEntry::new(TraceStage::Filter, 1.5, "high");
        assert_eq!(high.progress, 1.0);
    }

    #[test]
    fn test_entry_with_data() {
        let entry = TraceEntry::new(TraceStage::Cluster, 0.5, "Clustered frames")
            .with_data(serde_json::json!({ "clusters": 4 }));

        assert_eq!(entry.data.unwrap()["clusters"], 4);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let entry = TraceEntry::new(TraceStage::Synthesize, 1.0, "done");
        let line = entry.to_json_line().unwrap();

        assert!(line.ends_with('\n'));
        assert!(line.contains(r#""stage":"synthesize""#));
        assert!(!line.contains("\"data\""));
    }

    #[test]
    fn test_writer_appends_and_reads_back() {
        let temp_dir = TempDir::new().unwrap();
        let trace_path = temp_dir.path().join("trace.jsonl");
        let writer = TraceWriter::new(trace_path.clone());

        writer
            .write(&TraceEntry::new(TraceStage::Filter, 0.0, "Start"))
            .unwrap();
        writer
            .write_batch(&[
                TraceEntry::new(TraceStage::Cluster, 0.5, "Clusters"),
                TraceEntry::new(TraceStage::Synthesize, 1.0, "Notes"),
            ])
            .unwrap();

        let entries = read_trace_file(&trace_path).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].stage, TraceStage::Filter);
        assert_eq!(entries[2].stage, TraceStage::Synthesize);
        assert_eq!(entries[2].progress, 1.0);
        assert_eq!(writer.path(), trace_path.as_path());
    }

    #[test]
    fn test_read_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_trace_file(&temp_dir.path().join("missing.jsonl"));
        assert!(matches!(result, Err(TraceError::IoError(_))));
    }
}
