// Editor boundary module
// Note segments shared with the editing surface and the resynthesis engine

pub mod resynth;
pub mod track;

pub use resynth::{ShiftRegion, MAX_SHIFT_SEMITONES};
pub use track::{NoteParams, NoteSegment, NoteTrack};
