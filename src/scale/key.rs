// Musical keys
// Root pitch class plus a scale-degree set

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building a key
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Pitch class must be within 0..12, got {0}")]
    PitchClassOutOfRange(u8),

    #[error("Unknown note name: {0}")]
    UnknownNoteName(String),

    #[error("Unknown scale name: {0}")]
    UnknownScaleName(String),

    #[error("Scale degree must be within 0..12, got {0}")]
    DegreeOutOfRange(u8),
}

/// One of the twelve pitch classes (0 = C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    pub fn new(value: u8) -> Result<Self, KeyError> {
        if value < 12 {
            Ok(PitchClass(value))
        } else {
            Err(KeyError::PitchClassOutOfRange(value))
        }
    }

    /// Pitch class of any MIDI pitch, negative pitches included
    pub fn of_pitch(pitch: i32) -> Self {
        PitchClass(pitch.rem_euclid(12) as u8)
    }

    /// Parse "C", "F#", "Bb", "e" and similar
    pub fn from_name(name: &str) -> Result<Self, KeyError> {
        let mut chars = name.trim().chars();
        let base = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(KeyError::UnknownNoteName(name.to_string())),
        };

        let mut offset: i32 = 0;
        for accidental in chars {
            match accidental {
                '#' | '♯' => offset += 1,
                'b' | '♭' => offset -= 1,
                _ => return Err(KeyError::UnknownNoteName(name.to_string())),
            }
        }

        Ok(PitchClass::of_pitch(base + offset))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = KeyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PitchClass::new(value)
    }
}

impl From<PitchClass> for u8 {
    fn from(class: PitchClass) -> u8 {
        class.0
    }
}

/// Named scales, or a custom set of degrees relative to the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "ScaleKindDef")]
pub enum ScaleKind {
    Major,
    Minor,
    HarmonicMinor,
    MajorPentatonic,
    MinorPentatonic,
    /// Arbitrary degrees within one octave; build through `ScaleKind::custom`
    Custom(Vec<u8>),
}

/// Wire form of `ScaleKind`, checked before it becomes one
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScaleKindDef {
    Major,
    Minor,
    HarmonicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Custom(Vec<u8>),
}

impl TryFrom<ScaleKindDef> for ScaleKind {
    type Error = KeyError;

    fn try_from(def: ScaleKindDef) -> Result<Self, Self::Error> {
        Ok(match def {
            ScaleKindDef::Major => ScaleKind::Major,
            ScaleKindDef::Minor => ScaleKind::Minor,
            ScaleKindDef::HarmonicMinor => ScaleKind::HarmonicMinor,
            ScaleKindDef::MajorPentatonic => ScaleKind::MajorPentatonic,
            ScaleKindDef::MinorPentatonic => ScaleKind::MinorPentatonic,
            ScaleKindDef::Custom(degrees) => ScaleKind::custom(degrees)?,
        })
    }
}

impl ScaleKind {
    /// Custom scale from degrees relative to the root, each within 0..12
    pub fn custom(degrees: Vec<u8>) -> Result<Self, KeyError> {
        match degrees.iter().find(|d| **d >= 12) {
            Some(&degree) => Err(KeyError::DegreeOutOfRange(degree)),
            None => Ok(ScaleKind::Custom(degrees)),
        }
    }

    pub fn from_string(s: &str) -> Result<Self, KeyError> {
        match s.trim().to_lowercase().as_str() {
            "major" | "ionian" => Ok(ScaleKind::Major),
            "minor" | "natural_minor" | "aeolian" => Ok(ScaleKind::Minor),
            "harmonic_minor" => Ok(ScaleKind::HarmonicMinor),
            "major_pentatonic" => Ok(ScaleKind::MajorPentatonic),
            "minor_pentatonic" => Ok(ScaleKind::MinorPentatonic),
            _ => Err(KeyError::UnknownScaleName(s.to_string())),
        }
    }

    /// Degrees relative to the root, within one octave
    pub fn degrees(&self) -> Vec<u8> {
        match self {
            ScaleKind::Major => vec![0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Minor => vec![0, 2, 3, 5, 7, 8, 10],
            ScaleKind::HarmonicMinor => vec![0, 2, 3, 5, 7, 8, 11],
            ScaleKind::MajorPentatonic => vec![0, 2, 4, 7, 9],
            ScaleKind::MinorPentatonic => vec![0, 3, 5, 7, 10],
            ScaleKind::Custom(degrees) => degrees.iter().copied().filter(|d| *d < 12).collect(),
        }
    }
}

/// A key: root pitch class and scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicalKey {
    pub root: PitchClass,
    pub scale: ScaleKind,
}

impl MusicalKey {
    pub fn new(root: PitchClass, scale: ScaleKind) -> Self {
        MusicalKey { root, scale }
    }

    /// Build a key from names such as ("F#", "minor")
    pub fn from_names(root: &str, scale: &str) -> Result<Self, KeyError> {
        Ok(MusicalKey {
            root: PitchClass::from_name(root)?,
            scale: ScaleKind::from_string(scale)?,
        })
    }

    /// Absolute pitch classes of the key as a 12-bit mask (bit n = pitch class n)
    pub fn pitch_class_mask(&self) -> u16 {
        self.scale.degrees().iter().fold(0u16, |mask, degree| {
            let class = (self.root.value() + degree) % 12;
            mask | (1 << class)
        })
    }

    /// Whether an absolute pitch belongs to the key
    pub fn contains(&self, pitch: i32) -> bool {
        self.pitch_class_mask() & (1 << PitchClass::of_pitch(pitch).value()) != 0
    }
}
