// Note detector
// Runs filter -> cluster -> synthesize over one observation sequence

use serde::Serialize;
use thiserror::Error;

use super::cluster::{cluster_frames, ClusterLimits};
use super::config::{ConfigError, DetectionConfig};
use super::synth::{infer_hop_seconds, synthesize_notes, DetectedNote, NoteLimits, SynthesisReport};
use crate::pipeline::{TraceEntry, TraceStage};
use crate::pitch::{filter_voiced_frames, PitchObservation};

/// Errors from a detection run
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Detection task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Output of a traced detection run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub notes: Vec<DetectedNote>,
    pub hop_seconds: f64,
    pub report: SynthesisReport,
    #[serde(skip)]
    pub trace: Vec<TraceEntry>,
}

/// Stateless note detector bound to a validated configuration
#[derive(Debug, Clone)]
pub struct NoteDetector {
    config: DetectionConfig,
}

impl NoteDetector {
    /// Create a detector, rejecting out-of-range configurations
    pub fn new(config: DetectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(NoteDetector { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect notes in a time-ordered observation sequence
    pub fn detect(&self, observations: &[PitchObservation]) -> Vec<DetectedNote> {
        self.detect_traced(observations).notes
    }

    /// Detect notes and keep a per-stage trace of what was kept and dropped
    pub fn detect_traced(&self, observations: &[PitchObservation]) -> Detection {
        let config = &self.config;
        let mut trace = Vec::with_capacity(3);

        let filtered = filter_voiced_frames(observations, config.min_confidence);
        log::debug!(
            "Voiced frames: {} of {} ({} unvoiced, {} malformed)",
            filtered.frames.len(),
            observations.len(),
            filtered.unvoiced,
            filtered.malformed
        );
        trace.push(
            TraceEntry::new(
                TraceStage::Filter,
                0.33,
                format!("Kept {} voiced frames", filtered.frames.len()),
            )
            .with_data(serde_json::json!({
                "observations": observations.len(),
                "voiced": filtered.frames.len(),
                "unvoiced": filtered.unvoiced,
                "malformed": filtered.malformed,
            })),
        );

        if filtered.frames.is_empty() {
            trace.push(TraceEntry::new(TraceStage::Synthesize, 1.0, "No voiced frames"));
            return Detection {
                notes: Vec::new(),
                hop_seconds: super::synth::DEFAULT_HOP_SECONDS,
                report: SynthesisReport::default(),
                trace,
            };
        }

        let limits = ClusterLimits {
            max_gap_seconds: config.max_gap_seconds,
            max_jump_semitones: config.max_jump_semitones,
            max_std_dev_semitones: config.max_std_dev_semitones,
        };
        let clusters = cluster_frames(&filtered.frames, &limits);
        log::debug!("Formed {} clusters", clusters.len());
        trace.push(
            TraceEntry::new(
                TraceStage::Cluster,
                0.66,
                format!("Formed {} clusters", clusters.len()),
            )
            .with_data(serde_json::json!({ "clusters": clusters.len() })),
        );

        let hop_seconds = infer_hop_seconds(&filtered.frames);
        let note_limits = NoteLimits {
            min_frames_per_note: config.min_frames_per_note,
            min_note_seconds: config.min_note_seconds,
        };
        let (notes, report) = synthesize_notes(&clusters, hop_seconds, &note_limits);

        trace.push(
            TraceEntry::new(
                TraceStage::Synthesize,
                1.0,
                format!("Detected {} notes", notes.len()),
            )
            .with_data(serde_json::json!({
                "hopSeconds": hop_seconds,
                "report": report,
            })),
        );

        log::info!(
            "Detected {} notes from {} observations (hop {:.4}s, dropped {} sparse, {} short)",
            notes.len(),
            observations.len(),
            hop_seconds,
            report.too_few_frames,
            report.too_short
        );

        Detection {
            notes,
            hop_seconds,
            report,
            trace,
        }
    }
}

/// One-shot detection with a configuration record
pub fn detect_notes(
    observations: &[PitchObservation],
    config: &DetectionConfig,
) -> Result<Vec<DetectedNote>, ConfigError> {
    Ok(NoteDetector::new(config.clone())?.detect(observations))
}

/// Run detection on the blocking thread pool
///
/// The result is only observable once the whole run has finished. Dropping the returned
/// future discards the run; it has no side effects to undo.
pub async fn detect_notes_async(
    observations: Vec<PitchObservation>,
    config: DetectionConfig,
) -> Result<Vec<DetectedNote>, DetectError> {
    let detector = NoteDetector::new(config)?;
    let notes = tokio::task::spawn_blocking(move || detector.detect(&observations)).await?;
    Ok(notes)
}
