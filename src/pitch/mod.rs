// Pitch frame module
// Observation types from the external estimator and voiced-frame filtering

pub mod filter;
pub mod types;

pub use filter::{filter_voiced_frames, FilterOutcome};
pub use types::{hz_to_semitone, note_name, semitone_to_hz, PitchObservation, VoicedFrame};
