// Pitch frame types
// Per-frame observations from the estimator and their semitone-domain form

use serde::{Deserialize, Serialize};

/// Reference frequency for MIDI note 69 (A4)
pub const A4_HZ: f64 = 440.0;

/// MIDI note number of A4
pub const A4_MIDI: f64 = 69.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One analysis frame produced by the external pitch estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchObservation {
    /// Frame time in seconds from the start of the recording
    pub time: f64,

    /// Fundamental frequency in Hz, `None` for silence or noise
    #[serde(default)]
    pub frequency_hz: Option<f64>,

    /// Estimator confidence [0.0, 1.0]
    pub confidence: f32,
}

impl PitchObservation {
    /// Create a voiced observation
    pub fn voiced(time: f64, frequency_hz: f64, confidence: f32) -> Self {
        PitchObservation {
            time,
            frequency_hz: Some(frequency_hz),
            confidence,
        }
    }

    /// Create an unvoiced observation
    pub fn unvoiced(time: f64, confidence: f32) -> Self {
        PitchObservation {
            time,
            frequency_hz: None,
            confidence,
        }
    }
}

/// A frame that passed the voicing filter, expressed on the MIDI semitone scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoicedFrame {
    pub time: f64,

    /// Continuous MIDI pitch (69.0 = A4)
    pub pitch_semitone: f64,

    pub confidence: f32,
}

/// Convert a frequency in Hz to a continuous MIDI pitch
pub fn hz_to_semitone(frequency_hz: f64) -> f64 {
    A4_MIDI + 12.0 * (frequency_hz / A4_HZ).log2()
}

/// Convert a continuous MIDI pitch back to Hz
pub fn semitone_to_hz(semitone: f64) -> f64 {
    A4_HZ * 2f64.powf((semitone - A4_MIDI) / 12.0)
}

/// Scientific pitch name for an integer MIDI pitch (60 -> "C4")
pub fn note_name(pitch: i32) -> String {
    let class = pitch.rem_euclid(12) as usize;
    let octave = pitch.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[class], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_is_69() {
        assert!((hz_to_semitone(440.0) - 69.0).abs() < 1e-12);
    }

    #[test]
    fn test_middle_c() {
        let pitch = hz_to_semitone(261.63);
        assert!((pitch - 60.0).abs() < 0.01);
        assert_eq!(pitch.round() as i32, 60);
    }

    #[test]
    fn test_octave_is_twelve_semitones() {
        let low = hz_to_semitone(220.0);
        let high = hz_to_semitone(880.0);
        assert!((high - low - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_semitone_to_hz() {
        assert!((semitone_to_hz(69.0) - 440.0).abs() < 1e-9);
        assert!((semitone_to_hz(81.0) - 880.0).abs() < 1e-9);
    }

    #[test]
    fn test_note_names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(-1), "B-2");
    }

    #[test]
    fn test_observation_deserializes_null_frequency() {
        let json = r#"[
            {"time": 0.0, "frequencyHz": 440.0, "confidence": 0.9},
            {"time": 0.01, "frequencyHz": null, "confidence": 0.1},
            {"time": 0.02, "confidence": 0.0}
        ]"#;

        let frames: Vec<PitchObservation> = serde_json::from_str(json).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].frequency_hz, Some(440.0));
        assert!(frames[1].frequency_hz.is_none());
        assert!(frames[2].frequency_hz.is_none());
    }
}
