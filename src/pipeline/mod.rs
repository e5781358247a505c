// Pipeline monitoring module
// Stage-by-stage trace of a detection run

pub mod trace;

pub use trace::{read_trace_file, TraceEntry, TraceError, TraceStage, TraceWriter};
