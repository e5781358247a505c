// Export module
// Standard MIDI File output for note tracks

pub mod midi;

pub use midi::{export_track_midi, ExportError, MidiExportOptions};
