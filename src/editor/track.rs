// Editable note track
// Adapts detected notes into the segment model shared with the editor

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scale::{snap_to_scale, MusicalKey};
use crate::segment::DetectedNote;

/// Per-note performance parameters, all neutral by default
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoteParams {
    /// How strongly in-note pitch deviation is flattened [0.0, 1.0]
    pub pitch_correction: f32,

    /// Added vibrato depth in semitones
    pub vibrato: f32,

    /// Slow pitch drift in semitones across the note
    pub drift: f32,

    /// Duration factor (1.0 = unchanged)
    pub time_stretch: f32,

    /// Formant shift in semitones
    pub formant_shift: f32,
}

impl Default for NoteParams {
    fn default() -> Self {
        NoteParams {
            pitch_correction: 0.0,
            vibrato: 0.0,
            drift: 0.0,
            time_stretch: 1.0,
            formant_shift: 0.0,
        }
    }
}

impl NoteParams {
    pub fn is_neutral(&self) -> bool {
        *self == NoteParams::default()
    }
}

/// A note as the editor and the resynthesis engine see it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSegment {
    pub id: Uuid,
    pub start_time: f64,
    pub end_time: f64,

    /// Pitch found by detection; the audio under this segment sounds at this pitch
    pub detected_pitch: i32,

    /// Pitch the user wants (starts equal to `detected_pitch`)
    pub pitch: i32,

    /// `pitch` snapped to the track's key, when a key is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapped_pitch: Option<i32>,

    pub confidence: f32,

    pub params: NoteParams,
}

impl NoteSegment {
    pub fn from_detected(note: &DetectedNote, key: Option<&MusicalKey>) -> Self {
        NoteSegment {
            id: note.id,
            start_time: note.start_time,
            end_time: note.end_time,
            detected_pitch: note.pitch,
            pitch: note.pitch,
            snapped_pitch: key.map(|k| snap_to_scale(note.pitch, k)),
            confidence: note.confidence,
            params: NoteParams::default(),
        }
    }

    /// Pitch the segment should sound at after resynthesis
    pub fn target_pitch(&self) -> i32 {
        self.snapped_pitch.unwrap_or(self.pitch)
    }

    /// Semitones the engine has to move this segment's audio
    pub fn shift_semitones(&self) -> i32 {
        self.target_pitch() - self.detected_pitch
    }

    fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start_time < end && start < self.end_time
    }
}

/// Ordered collection of note segments with an optional key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteTrack {
    pub segments: Vec<NoteSegment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<MusicalKey>,
}

impl NoteTrack {
    pub fn new(key: Option<MusicalKey>) -> Self {
        NoteTrack {
            segments: Vec::new(),
            key,
        }
    }

    pub fn from_detected(notes: &[DetectedNote], key: Option<MusicalKey>) -> Self {
        let mut track = NoteTrack::new(key);
        track.merge_detected(notes);
        track
    }

    /// Merge a fresh detection into the track
    ///
    /// Existing segments that overlap any detected note are replaced; the others
    /// (typically hand-drawn notes in untouched regions) are kept.
    pub fn merge_detected(&mut self, notes: &[DetectedNote]) {
        let before = self.segments.len();
        self.segments.retain(|segment| {
            !notes
                .iter()
                .any(|note| segment.overlaps(note.start_time, note.end_time))
        });
        let replaced = before - self.segments.len();

        let key = self.key.as_ref();
        self.segments.extend(notes.iter().map(|note| NoteSegment::from_detected(note, key)));
        self.sort();

        log::debug!(
            "Merged {} detected notes ({} segments replaced, {} total)",
            notes.len(),
            replaced,
            self.segments.len()
        );
    }

    /// Set or clear the key and re-snap every segment without re-running detection
    pub fn apply_key(&mut self, key: Option<MusicalKey>) {
        for segment in &mut self.segments {
            segment.snapped_pitch = key.as_ref().map(|k| snap_to_scale(segment.pitch, k));
        }
        self.key = key;
    }

    /// Change a segment's pitch, re-snapping it to the current key
    ///
    /// Returns `false` when no segment has this id.
    pub fn set_pitch(&mut self, id: Uuid, pitch: i32) -> bool {
        let key = self.key.as_ref();
        match self.segments.iter_mut().find(|s| s.id == id) {
            Some(segment) => {
                segment.pitch = pitch;
                segment.snapped_pitch = key.map(|k| snap_to_scale(pitch, k));
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&NoteSegment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut NoteSegment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn sort(&mut self) {
        self.segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }
}
