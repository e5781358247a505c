// Note segmentation module
// Clusters voiced pitch frames into discrete note events

pub mod cluster;
pub mod config;
pub mod detector;
pub mod synth;

pub use cluster::{cluster_frames, ClusterLimits, NoteCluster};
pub use config::{ConfigError, DetectionConfig, CONFIG_SCHEMA_VERSION};
pub use detector::{detect_notes, detect_notes_async, DetectError, Detection, NoteDetector};
pub use synth::{infer_hop_seconds, synthesize_notes, DetectedNote, NoteLimits, SynthesisReport};
