// Scale module
// Musical keys and per-note pitch snapping

pub mod key;
pub mod quantize;

pub use key::{KeyError, MusicalKey, PitchClass, ScaleKind};
pub use quantize::{snap_to_scale, MAX_SNAP_SEMITONES};
