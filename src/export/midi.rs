// MIDI Export - Write a note track as a Standard MIDI File using midly
// Uses each segment's target pitch, so snapped and edited notes export as heard

use midly::num::u28;
use midly::{Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::NoteTrack;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("BPM must be finite and positive, got {0}")]
    InvalidTempo(f64),

    #[error("PPQ must be non-zero")]
    InvalidPpq,

    #[error("MIDI channel must be within 0..16, got {0}")]
    InvalidChannel(u8),

    #[error("Time {0}s is beyond the last representable MIDI tick")]
    TimeOutOfRange(f64),

    #[error("Failed to write MIDI: {0}")]
    Write(String),
}

/// MIDI export options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MidiExportOptions {
    /// Pulses per quarter note
    pub ppq: u16,

    /// Tempo written to the file; note times are converted from seconds at this tempo
    pub bpm: f64,

    /// Zero-based MIDI channel for the notes
    pub channel: u8,

    pub track_name: String,

    pub include_tempo: bool,
}

impl Default for MidiExportOptions {
    fn default() -> Self {
        MidiExportOptions {
            ppq: 480,
            bpm: 120.0,
            channel: 0,
            track_name: "Melody".to_string(),
            include_tempo: true,
        }
    }
}

/// Export a note track to MIDI file bytes
///
/// Produces a parallel (format 1) file with a meta track and one note track.
/// Segments whose target pitch falls outside 0..=127 are skipped. A segment ending past
/// the largest tick a MIDI file can address fails the export.
pub fn export_track_midi(
    track: &NoteTrack,
    options: &MidiExportOptions,
) -> Result<Vec<u8>, ExportError> {
    if !options.bpm.is_finite() || options.bpm <= 0.0 {
        return Err(ExportError::InvalidTempo(options.bpm));
    }
    if options.ppq == 0 {
        return Err(ExportError::InvalidPpq);
    }
    if options.channel > 15 {
        return Err(ExportError::InvalidChannel(options.channel));
    }

    let ticks_per_second = ticks_per_second(options.bpm, options.ppq);

    let mut meta_track = Track::new();
    if options.include_tempo {
        let us_per_quarter = (60_000_000.0 / options.bpm).round() as u32;
        meta_track.push(TrackEvent {
            delta: 0.into(),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(us_per_quarter.min(0xFF_FFFF).into())),
        });
    }
    meta_track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let note_track = build_note_track(track, ticks_per_second, options)?;

    let smf = Smf {
        header: Header {
            format: midly::Format::Parallel,
            timing: Timing::Metrical(options.ppq.into()),
        },
        tracks: vec![meta_track, note_track],
    };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| ExportError::Write(e.to_string()))?;

    log::debug!("Exported {} segments to {} MIDI bytes", track.len(), bytes.len());
    Ok(bytes)
}

fn build_note_track<'a>(
    track: &NoteTrack,
    ticks_per_second: f64,
    options: &'a MidiExportOptions,
) -> Result<Track<'a>, ExportError> {
    let channel = options.channel.into();
    let mut events: Vec<(u32, TrackEventKind<'a>)> = Vec::with_capacity(track.len() * 2 + 1);

    let name = MetaMessage::TrackName(options.track_name.as_bytes());
    events.push((0, TrackEventKind::Meta(name)));

    let mut skipped = 0;
    for segment in &track.segments {
        let pitch = segment.target_pitch();
        let Ok(key) = u8::try_from(pitch) else {
            skipped += 1;
            continue;
        };
        if key > 127 {
            skipped += 1;
            continue;
        }

        let tick_on = seconds_to_tick(segment.start_time, ticks_per_second)?;
        let tick_off = seconds_to_tick(segment.end_time, ticks_per_second)?.max(tick_on + 1);
        if tick_off > u28::max_value().as_int() {
            return Err(ExportError::TimeOutOfRange(segment.end_time));
        }

        events.push((
            tick_on,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key: key.into(),
                    vel: confidence_to_velocity(segment.confidence).into(),
                },
            },
        ));
        events.push((
            tick_off,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key: key.into(),
                    vel: 0.into(),
                },
            },
        ));
    }

    if skipped > 0 {
        log::warn!("Skipped {} segments outside the MIDI key range", skipped);
    }

    // Stable sort keeps a note-off ahead of a note-on queued later at the same tick
    events.sort_by_key(|(tick, _)| *tick);

    let mut out = Track::with_capacity(events.len() + 1);
    let mut last_tick = 0;
    for (tick, kind) in events {
        out.push(TrackEvent {
            delta: tick.saturating_sub(last_tick).into(),
            kind,
        });
        last_tick = tick;
    }
    out.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    Ok(out)
}

/// Absolute tick for a time in seconds; negative times clamp to the first tick
fn seconds_to_tick(seconds: f64, ticks_per_second: f64) -> Result<u32, ExportError> {
    let ticks = (seconds * ticks_per_second).round();
    if ticks.is_nan() || ticks <= 0.0 {
        return Ok(0);
    }
    if ticks > f64::from(u28::max_value().as_int()) {
        return Err(ExportError::TimeOutOfRange(seconds));
    }
    Ok(ticks as u32)
}

fn ticks_per_second(bpm: f64, ppq: u16) -> f64 {
    ppq as f64 * bpm / 60.0
}

/// Map confidence [0, 1] onto velocity 1..=127
fn confidence_to_velocity(confidence: f32) -> u8 {
    (1.0 + confidence.clamp(0.0, 1.0) * 126.0).round() as u8
}
