// Note synthesis
// Turns accepted clusters into timed, pitched note events

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cluster::NoteCluster;
use crate::pitch::VoicedFrame;

/// Hop assumed when there are too few frame intervals to measure it
pub const DEFAULT_HOP_SECONDS: f64 = 0.01;

/// Fewest positive frame intervals needed before the measured hop is trusted
const MIN_HOP_SAMPLES: usize = 3;

/// A detected note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedNote {
    /// Unique identifier for this note
    pub id: Uuid,

    /// Onset in seconds
    pub start_time: f64,

    /// End in seconds (always greater than `start_time`)
    pub end_time: f64,

    /// Representative MIDI pitch
    pub pitch: i32,

    /// Mean frame confidence [0.0, 1.0]
    pub confidence: f32,
}

impl DetectedNote {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Acceptance thresholds for clusters
#[derive(Debug, Clone, Copy)]
pub struct NoteLimits {
    pub min_frames_per_note: usize,
    pub min_note_seconds: f64,
}

/// Counts of what happened to each cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisReport {
    pub emitted: usize,
    pub too_few_frames: usize,
    pub too_short: usize,
    /// Clusters whose onset did not advance past the previous note
    pub out_of_order: usize,
}

/// Estimate the analysis hop as the median of positive frame-to-frame intervals
///
/// Duplicated timestamps are ignored. Falls back to [`DEFAULT_HOP_SECONDS`] when fewer
/// than three intervals can be measured.
pub fn infer_hop_seconds(frames: &[VoicedFrame]) -> f64 {
    let mut deltas: Vec<f64> = frames
        .windows(2)
        .map(|pair| pair[1].time - pair[0].time)
        .filter(|delta| *delta > 0.0)
        .collect();

    if deltas.len() < MIN_HOP_SAMPLES {
        return DEFAULT_HOP_SECONDS;
    }

    median(&mut deltas)
}

/// Build notes from clusters, dropping those that are too sparse or too short
pub fn synthesize_notes(
    clusters: &[NoteCluster],
    hop_seconds: f64,
    limits: &NoteLimits,
) -> (Vec<DetectedNote>, SynthesisReport) {
    let mut notes: Vec<DetectedNote> = Vec::with_capacity(clusters.len());
    let mut report = SynthesisReport::default();

    for cluster in clusters {
        if cluster.len() < limits.min_frames_per_note {
            report.too_few_frames += 1;
            continue;
        }

        let start_time = cluster.first().time;
        let end_time = cluster.last().time + hop_seconds;
        if end_time - start_time < limits.min_note_seconds || end_time <= start_time {
            report.too_short += 1;
            continue;
        }

        if let Some(prev) = notes.last() {
            if start_time <= prev.start_time {
                report.out_of_order += 1;
                continue;
            }
        }

        let mut pitches: Vec<f64> = cluster.frames().iter().map(|f| f.pitch_semitone).collect();
        let pitch = median(&mut pitches).round() as i32;

        let confidence_sum: f64 = cluster.frames().iter().map(|f| f.confidence as f64).sum();
        let confidence = (confidence_sum / cluster.len() as f64).clamp(0.0, 1.0) as f32;

        notes.push(DetectedNote {
            id: Uuid::new_v4(),
            start_time,
            end_time,
            pitch,
            confidence,
        });
    }

    report.emitted = notes.len();
    (notes, report)
}

/// Median of a non-empty slice (mean of the two middle values for even lengths)
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
