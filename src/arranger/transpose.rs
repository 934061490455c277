// Global transposition - shifts and folds every pitch into a fixed band
// All instrument tracks share one offset so relative harmony survives

use midly::num::u7;
use midly::{MidiMessage, Track, TrackEventKind};
use thiserror::Error;

use crate::midi::event;
use crate::midi::file::is_instrument_track;

/// Lowest pitch the instruments can play (C3)
pub const FOLD_LOW: u8 = 48;

/// Highest pitch the instruments can play (C5)
pub const FOLD_HIGH: u8 = 72;

#[derive(Debug, Error)]
pub enum TransposeError {
    #[error("no instrument track contains any notes")]
    EmptyInstrumentData,
}

/// Transpose every instrument-track note into the playable band
///
/// The offset is `(C3 - lowest note) mod 12`, which brings the lowest note
/// of the file into the target octave without changing its pitch class.
/// Notes that still land outside the band are folded by whole octaves.
/// Mutation is in place; returns the applied offset in semitones, in
/// [0, 11].
pub fn transpose_tracks(tracks: &mut [Track]) -> Result<u8, TransposeError> {
    let min_note = tracks
        .iter()
        .filter(|track| is_instrument_track(track))
        .flat_map(|track| track.iter())
        .filter_map(|ev| event::note_on_key(&ev.kind))
        .min()
        .ok_or(TransposeError::EmptyInstrumentData)?;

    let offset = (i16::from(FOLD_LOW) - i16::from(min_note)).rem_euclid(12) as u8;

    for track in tracks.iter_mut() {
        if !is_instrument_track(track) {
            continue;
        }

        for ev in track.iter_mut() {
            if let TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. },
                ..
            } = &mut ev.kind
            {
                *key = u7::new(fold(key.as_int() + offset));
            }
        }
    }

    Ok(offset)
}

/// Fold a pitch into [FOLD_LOW, FOLD_HIGH] by whole octaves
fn fold(mut note: u8) -> u8 {
    while note < FOLD_LOW {
        note += 12;
    }
    while note > FOLD_HIGH {
        note -= 12;
    }
    note
}
