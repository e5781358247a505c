// Resynthesis plan
// Note boundaries and pitch offsets handed to the native pitch-shifting engine

use serde::{Deserialize, Serialize};

use super::track::{NoteParams, NoteTrack};

/// Largest shift the engine accepts in either direction (playback ratio 0.5..=2.0)
pub const MAX_SHIFT_SEMITONES: f32 = 12.0;

/// One region of audio the engine should process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRegion {
    pub start_time: f64,
    pub end_time: f64,

    /// Pitch offset in semitones (+12 = one octave up)
    pub semitones: f32,

    pub params: NoteParams,
}

impl NoteTrack {
    /// Regions that need processing, in time order
    ///
    /// Segments that neither move nor carry non-neutral parameters are skipped.
    pub fn shift_regions(&self) -> Vec<ShiftRegion> {
        self.segments
            .iter()
            .filter(|segment| segment.shift_semitones() != 0 || !segment.params.is_neutral())
            .map(|segment| {
                let requested = segment.shift_semitones() as f32;
                let semitones = requested.clamp(-MAX_SHIFT_SEMITONES, MAX_SHIFT_SEMITONES);
                if semitones != requested {
                    log::warn!(
                        "Shift of {} semitones for note {} clamped to {}",
                        requested,
                        segment.id,
                        semitones
                    );
                }

                ShiftRegion {
                    start_time: segment.start_time,
                    end_time: segment.end_time,
                    semitones,
                    params: segment.params,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::MusicalKey;
    use crate::segment::DetectedNote;
    use uuid::Uuid;

    fn note(start: f64, pitch: i32) -> DetectedNote {
        DetectedNote {
            id: Uuid::new_v4(),
            start_time: start,
            end_time: start + 0.4,
            pitch,
            confidence: 0.8,
        }
    }

    #[test]
    fn test_unmodified_track_needs_no_processing() {
        let track = NoteTrack::from_detected(&[note(0.0, 60), note(0.5, 62)], None);
        assert!(track.shift_regions().is_empty());
    }

    #[test]
    fn test_snapped_notes_become_regions() {
        let key = MusicalKey::from_names("C", "major").unwrap();
        let track = NoteTrack::from_detected(&[note(0.0, 61), note(0.5, 62)], Some(key));

        let regions = track.shift_regions();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].start_time, 0.0);
        assert_eq!(regions[0].semitones, -1.0);
    }

    #[test]
    fn test_params_alone_produce_region() {
        let mut track = NoteTrack::from_detected(&[note(0.0, 60)], None);
        let id = track.segments[0].id;
        track.get_mut(id).unwrap().params.formant_shift = 2.0;

        let regions = track.shift_regions();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].semitones, 0.0);
        assert_eq!(regions[0].params.formant_shift, 2.0);
    }

    #[test]
    fn test_large_shift_is_clamped() {
        let mut track = NoteTrack::from_detected(&[note(0.0, 60), note(0.5, 60)], None);
        let up = track.segments[0].id;
        let down = track.segments[1].id;
        track.set_pitch(up, 84);
        track.set_pitch(down, 40);

        let regions = track.shift_regions();
        assert_eq!(regions[0].semitones, MAX_SHIFT_SEMITONES);
        assert_eq!(regions[1].semitones, -MAX_SHIFT_SEMITONES);
    }
}
