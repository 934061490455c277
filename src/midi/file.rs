// MIDI container I/O - reading, writing, and track classification
// Untouched event fields round-trip losslessly through midly

use std::fs;
use std::path::Path;

use midly::{Smf, Track};
use thiserror::Error;

use super::event;

#[derive(Debug, Error)]
pub enum MidiFileError {
    #[error("MIDI file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse MIDI file: {0}")]
    Parse(#[from] midly::Error),
}

/// Read a MIDI file into raw bytes
///
/// Parsed events borrow from this buffer, so it must outlive the whole
/// conversion run.
pub fn read_file(path: &Path) -> Result<Vec<u8>, MidiFileError> {
    Ok(fs::read(path)?)
}

/// Parse MIDI bytes into a standard MIDI file structure
pub fn parse(bytes: &[u8]) -> Result<Smf<'_>, MidiFileError> {
    Ok(Smf::parse(bytes)?)
}

/// Serialize a MIDI file structure to disk
pub fn save(smf: &Smf, path: &Path) -> Result<(), MidiFileError> {
    Ok(smf.save(path)?)
}

/// True when a track carries a program assignment on a non-percussion channel
pub fn is_instrument_track(track: &Track) -> bool {
    track.iter().any(|ev| {
        matches!(
            event::program_change_channel(&ev.kind),
            Some(channel) if channel != event::PERCUSSION_CHANNEL
        )
    })
}
