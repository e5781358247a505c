// Scale quantization
// Snaps a note's pitch to the nearest tone of a key, preferring downward moves

use super::key::{MusicalKey, PitchClass};

/// Furthest a pitch is moved while searching for a scale tone (half an octave)
pub const MAX_SNAP_SEMITONES: i32 = 6;

/// Snap a pitch to the nearest tone in `key`
///
/// In-scale pitches are returned unchanged. Otherwise radii 1..=6 are searched,
/// testing the tone below before the tone above at each radius. If no scale tone lies
/// within half an octave (only possible for sparse custom scales) the pitch is
/// returned unchanged.
pub fn snap_to_scale(pitch: i32, key: &MusicalKey) -> i32 {
    let mask = key.pitch_class_mask();
    let in_scale = |p: i32| mask & (1 << PitchClass::of_pitch(p).value()) != 0;

    if in_scale(pitch) {
        return pitch;
    }

    for radius in 1..=MAX_SNAP_SEMITONES {
        if in_scale(pitch - radius) {
            return pitch - radius;
        }
        if in_scale(pitch + radius) {
            return pitch + radius;
        }
    }

    pitch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::key::ScaleKind;

    fn key(root: &str, scale: &str) -> MusicalKey {
        MusicalKey::from_names(root, scale).unwrap()
    }

    fn all_named_keys() -> Vec<MusicalKey> {
        let scales = [
            ScaleKind::Major,
            ScaleKind::Minor,
            ScaleKind::HarmonicMinor,
            ScaleKind::MajorPentatonic,
            ScaleKind::MinorPentatonic,
        ];
        let mut keys = Vec::new();
        for root in 0..12u8 {
            for scale in scales.iter() {
                keys.push(MusicalKey::new(PitchClass::new(root).unwrap(), scale.clone()));
            }
        }
        keys
    }

    #[test]
    fn test_c_sharp_in_c_major_snaps_down() {
        assert_eq!(snap_to_scale(61, &key("C", "major")), 60);
    }

    #[test]
    fn test_in_scale_pitch_unchanged() {
        let c_major = key("C", "major");
        for pitch in [60, 62, 64, 65, 67, 69, 71, 72] {
            assert_eq!(snap_to_scale(pitch, &c_major), pitch);
        }
    }

    #[test]
    fn test_every_scale_degree_maps_to_itself() {
        for key in all_named_keys() {
            for degree in key.scale.degrees() {
                for octave in -1..10 {
                    let pitch = octave * 12 + key.root.value() as i32 + degree as i32;
                    assert_eq!(snap_to_scale(pitch, &key), pitch, "{:?} pitch {}", key, pitch);
                }
            }
        }
    }

    #[test]
    fn test_snapping_is_idempotent_and_bounded() {
        for key in all_named_keys() {
            for pitch in 0..128 {
                let snapped = snap_to_scale(pitch, &key);
                assert!(key.contains(snapped));
                assert!((snapped - pitch).abs() <= MAX_SNAP_SEMITONES);
                assert_eq!(snap_to_scale(snapped, &key), snapped);
            }
        }
    }

    #[test]
    fn test_minor_pentatonic_prefers_down_on_tie() {
        // A minor pentatonic: A C D E G
        let key = key("A", "minor_pentatonic");
        // F (65): E is 1 below, G is 2 above
        assert_eq!(snap_to_scale(65, &key), 64);
        // B (71): A (69) is 2 below, C (72) is 1 above
        assert_eq!(snap_to_scale(71, &key), 72);
        // G# (68): G (67) and A (69) both at radius 1
        assert_eq!(snap_to_scale(68, &key), 67);
    }

    #[test]
    fn test_negative_pitch() {
        assert_eq!(snap_to_scale(-11, &key("C", "major")), -12);
    }

    #[test]
    fn test_sparse_custom_scale_searches_half_octave() {
        // Only the root: F# (66) is 6 away from both C4 and C5, downward wins
        let c = PitchClass::new(0).unwrap();
        let root_only = MusicalKey::new(c, ScaleKind::custom(vec![0]).unwrap());
        assert_eq!(snap_to_scale(66, &root_only), 60);
        assert_eq!(snap_to_scale(67, &root_only), 72);
    }

    #[test]
    fn test_empty_scale_leaves_pitch_unchanged() {
        let c = PitchClass::new(0).unwrap();
        let empty = MusicalKey::new(c, ScaleKind::custom(vec![]).unwrap());
        assert_eq!(snap_to_scale(61, &empty), 61);
    }
}
