// MIDI support - raw event access and container I/O
// The rest of the crate goes through these helpers instead of matching midly enums inline

pub mod event;
pub mod file;

pub use event::PERCUSSION_CHANNEL;
pub use file::{is_instrument_track, MidiFileError};
