use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};

use super::note::velocity_for_value;
use super::table::KeyTable;
use crate::error::{PianoError, Result};

const TICKS_PER_BEAT: u16 = 480;
const TEMPO_BPM: u32 = 120;
const NOTE_SPACING_BEATS: f64 = 0.25;
const NOTE_LENGTH_BEATS: f64 = 0.5;
const TRACK_NAME: &[u8] = b"Bitcoin Piano";

/// Renders the table as a single-track MIDI file: one note per key, bottom to
/// top, with velocity following the key's position on the volume scale.
pub fn table_to_midi(table: &KeyTable, min_value: f64, max_value: f64) -> Result<Vec<u8>> {
    let channel = u4::new(0);
    let mut events: Vec<(u32, TrackEventKind)> = Vec::new();

    events.push((0, TrackEventKind::Meta(MetaMessage::TrackName(TRACK_NAME))));
    events.push((0, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(60_000_000 / TEMPO_BPM)))));

    for (i, key) in table.keys().iter().enumerate() {
        let start_tick = beats_to_ticks(i as f64 * NOTE_SPACING_BEATS);
        let end_tick = beats_to_ticks(i as f64 * NOTE_SPACING_BEATS + NOTE_LENGTH_BEATS);
        if key.midi_number > 127 {
            return Err(PianoError::Midi(format!(
                "{} (MIDI {}) is outside the MIDI range",
                key.note_name, key.midi_number
            )));
        }
        let midi_key = u7::new(key.midi_number);
        let vel = u7::new(velocity_for_value(key.value, min_value, max_value));

        events.push((start_tick, TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOn { key: midi_key, vel },
        }));
        events.push((end_tick, TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOff { key: midi_key, vel: u7::new(0) },
        }));
    }

    events.sort_by_key(|(time, _)| *time);

    let mut track: Track = Vec::new();
    let mut last_time = 0;
    for (time, kind) in events {
        track.push(TrackEvent {
            delta: u28::new(time - last_time),
            kind,
        });
        last_time = time;
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(u15::new(TICKS_PER_BEAT)),
        },
        tracks: vec![track],
    };

    let mut buffer = Vec::new();
    smf.write_std(&mut buffer)?;
    Ok(buffer)
}

fn beats_to_ticks(beats: f64) -> u32 {
    (beats * TICKS_PER_BEAT as f64).round() as u32
}
