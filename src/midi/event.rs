// Event helpers - kind predicates and field accessors over raw MIDI events

use midly::{MetaMessage, MidiMessage, TrackEventKind};

/// Channel reserved for percussion in General MIDI (channel 10, 0-indexed)
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Microseconds per minute, for tempo meta conversion
const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// True for NoteOn and NoteOff channel messages
pub fn is_note(kind: &TrackEventKind) -> bool {
    note_key(kind).is_some()
}

/// Key of a NoteOn or NoteOff event
pub fn note_key(kind: &TrackEventKind) -> Option<u8> {
    match kind {
        TrackEventKind::Midi {
            message: MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. },
            ..
        } => Some(key.as_int()),
        _ => None,
    }
}

/// Key of a NoteOn event
///
/// A NoteOn with velocity 0 still counts as a NoteOn here; the raw kind is
/// what the lane allocator keys on.
pub fn note_on_key(kind: &TrackEventKind) -> Option<u8> {
    match kind {
        TrackEventKind::Midi {
            message: MidiMessage::NoteOn { key, .. },
            ..
        } => Some(key.as_int()),
        _ => None,
    }
}

/// Key of a NoteOff event
pub fn note_off_key(kind: &TrackEventKind) -> Option<u8> {
    match kind {
        TrackEventKind::Midi {
            message: MidiMessage::NoteOff { key, .. },
            ..
        } => Some(key.as_int()),
        _ => None,
    }
}

/// Channel of a ProgramChange event
pub fn program_change_channel(kind: &TrackEventKind) -> Option<u8> {
    match kind {
        TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange { .. },
        } => Some(channel.as_int()),
        _ => None,
    }
}

/// True for tempo meta events
pub fn is_tempo_change(kind: &TrackEventKind) -> bool {
    matches!(kind, TrackEventKind::Meta(MetaMessage::Tempo(_)))
}

/// BPM carried by a tempo meta event
///
/// Tempo metas store microseconds per quarter note. A zero value is invalid
/// and yields None rather than an infinite tempo.
pub fn tempo_bpm(kind: &TrackEventKind) -> Option<f64> {
    match kind {
        TrackEventKind::Meta(MetaMessage::Tempo(us_per_beat)) => {
            let us_per_beat = us_per_beat.as_int();
            if us_per_beat == 0 {
                return None;
            }
            Some(MICROS_PER_MINUTE / f64::from(us_per_beat))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u24, u4, u7};

    fn note_on(key: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(100),
            },
        }
    }

    fn note_off(key: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            },
        }
    }

    #[test]
    fn test_note_accessors() {
        assert_eq!(note_key(&note_on(60)), Some(60));
        assert_eq!(note_key(&note_off(60)), Some(60));
        assert_eq!(note_on_key(&note_on(64)), Some(64));
        assert_eq!(note_on_key(&note_off(64)), None);
        assert_eq!(note_off_key(&note_off(64)), Some(64));
        assert_eq!(note_off_key(&note_on(64)), None);

        let name = TrackEventKind::Meta(MetaMessage::TrackName(b"lead"));
        assert!(!is_note(&name));
        assert_eq!(note_key(&name), None);
    }

    #[test]
    fn test_tempo_bpm_conversion() {
        // 500_000 us per quarter note is 120 BPM
        let tempo = TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000)));
        assert_eq!(tempo_bpm(&tempo), Some(120.0));
        assert!(is_tempo_change(&tempo));

        let tempo = TrackEventKind::Meta(MetaMessage::Tempo(u24::new(666_667)));
        let bpm = tempo_bpm(&tempo).unwrap();
        assert!((bpm - 90.0).abs() < 0.001);
    }

    #[test]
    fn test_tempo_bpm_rejects_zero() {
        let tempo = TrackEventKind::Meta(MetaMessage::Tempo(u24::new(0)));
        assert_eq!(tempo_bpm(&tempo), None);
    }

    #[test]
    fn test_program_change_channel() {
        let kind = TrackEventKind::Midi {
            channel: u4::new(3),
            message: MidiMessage::ProgramChange {
                program: u7::new(40),
            },
        };
        assert_eq!(program_change_channel(&kind), Some(3));
        assert_eq!(program_change_channel(&note_on(60)), None);
    }
}
