// Melody Segment - pitch frames to editable notes
// Module declarations

pub mod editor;
pub mod export;
pub mod pipeline;
pub mod pitch;
pub mod scale;
pub mod segment;

pub use editor::{NoteParams, NoteSegment, NoteTrack, ShiftRegion};
pub use export::{export_track_midi, ExportError, MidiExportOptions};
pub use pipeline::{read_trace_file, TraceEntry, TraceError, TraceStage, TraceWriter};
pub use pitch::{PitchObservation, VoicedFrame};
pub use scale::{snap_to_scale, KeyError, MusicalKey, PitchClass, ScaleKind};
pub use segment::{
    detect_notes, detect_notes_async, ConfigError, DetectError, DetectedNote, Detection,
    DetectionConfig, NoteDetector,
};
