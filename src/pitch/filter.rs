// Voiced frame filter
// Drops unvoiced, low-confidence and malformed observations

use super::types::{hz_to_semitone, PitchObservation, VoicedFrame};

/// Result of filtering a sequence of observations
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Frames that passed, in time order
    pub frames: Vec<VoicedFrame>,

    /// Frames dropped because they were unvoiced or below the confidence floor
    pub unvoiced: usize,

    /// Frames dropped because of non-finite/negative values or time running backwards
    pub malformed: usize,
}

/// Keep only confidently voiced frames and convert them to semitones
///
/// A frame survives when its frequency is present, finite and positive, its time is
/// finite, non-negative and not earlier than the previous surviving frame, and its
/// confidence is at least `min_confidence`.
pub fn filter_voiced_frames(
    observations: &[PitchObservation],
    min_confidence: f32,
) -> FilterOutcome {
    let mut outcome = FilterOutcome {
        frames: Vec::with_capacity(observations.len()),
        ..FilterOutcome::default()
    };

    for obs in observations {
        if !obs.time.is_finite() || obs.time < 0.0 {
            outcome.malformed += 1;
            continue;
        }

        let frequency = match obs.frequency_hz {
            Some(f) if f.is_finite() && f > 0.0 => f,
            Some(_) => {
                outcome.malformed += 1;
                continue;
            }
            None => {
                outcome.unvoiced += 1;
                continue;
            }
        };

        // NaN confidence fails this comparison as well
        if !(obs.confidence >= min_confidence) {
            outcome.unvoiced += 1;
            continue;
        }

        if let Some(last) = outcome.frames.last() {
            if obs.time < last.time {
                outcome.malformed += 1;
                continue;
            }
        }

        outcome.frames.push(VoicedFrame {
            time: obs.time,
            pitch_semitone: hz_to_semitone(frequency),
            confidence: obs.confidence,
        });
    }

    if outcome.malformed > 0 {
        log::warn!(
            "Dropped {} malformed pitch frames (non-finite, negative or out of order)",
            outcome.malformed
        );
    }

    outcome
}
