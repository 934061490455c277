// Tempo normalization - rescales note deltas to a single target tempo
// After this pass the surviving tempo setting is the only one in the file

use midly::num::u28;
use midly::Track;

use super::map::TempoMap;
use crate::midi::event;

/// Rescale every note event's delta so the track plays at `target_bpm`
///
/// The running time that drives tempo lookup accumulates the original
/// deltas, not the rescaled ones, advancing a per-track cursor over the
/// map. Non-note events keep their delta unchanged.
pub fn normalize_track(track: &mut Track, tempo_map: &TempoMap, target_bpm: f64) {
    let mut cursor = tempo_map.cursor();
    let mut time: u64 = 0;

    for ev in track.iter_mut() {
        let delta = ev.delta.as_int();
        time += u64::from(delta);
        let bpm = cursor.tempo_at(time);

        if event::is_note(&ev.kind) {
            let scaled = (f64::from(delta) * target_bpm / bpm).round() as u32;
            ev.delta = u28::new(scaled);
        }
    }
}

/// Drop every tempo change after the initial one from the tempo track
///
/// Only tempo events with a nonzero delta are removed; the tempo setting
/// at tick 0 stays in place.
pub fn strip_tempo_changes(track: &mut Track) {
    track.retain(|ev| !(event::is_tempo_change(&ev.kind) && ev.delta.as_int() > 0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u24, u28, u4, u7};
    use midly::{MetaMessage, MidiMessage, TrackEvent, TrackEventKind};

    fn tempo_event(delta: u32, us_per_beat: u32) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(us_per_beat))),
        }
    }

    fn note_on(delta: u32, key: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(100),
                },
            },
        }
    }

    fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            },
        }
    }

    fn control_change(delta: u32) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::Controller {
                    controller: u7::new(7),
                    value: u7::new(100),
                },
            },
        }
    }

    fn deltas(track: &Track) -> Vec<u32> {
        track.iter().map(|ev| ev.delta.as_int()).collect()
    }

    #[test]
    fn test_constant_tempo_is_idempotent() {
        let tempo_track = vec![tempo_event(0, 500_000)];
        let map = TempoMap::from_track(&tempo_track).unwrap();

        let mut track = vec![note_on(0, 60), note_off(480, 60), note_on(13, 62)];
        let original = deltas(&track);

        normalize_track(&mut track, &map, map.max_bpm());
        assert_eq!(deltas(&track), original);
    }

    #[test]
    fn test_scaling_across_a_tempo_change() {
        // 120 BPM at tick 0, 90 BPM from tick 960; target is the max, 120
        let tempo_track = vec![tempo_event(0, 500_000), tempo_event(960, 666_667)];
        let map = TempoMap::from_track(&tempo_track).unwrap();

        let mut track = vec![
            note_on(240, 60),  // cumulative 240, first region, unscaled
            note_off(240, 60), // cumulative 480, first region, unscaled
            note_on(720, 62),  // cumulative 1200, second region, scaled by 120/90
        ];
        normalize_track(&mut track, &map, map.max_bpm());

        assert_eq!(deltas(&track), vec![240, 240, 960]);
    }

    #[test]
    fn test_non_note_deltas_are_untouched() {
        let tempo_track = vec![tempo_event(0, 500_000), tempo_event(960, 666_667)];
        let map = TempoMap::from_track(&tempo_track).unwrap();

        let mut track = vec![
            control_change(1000), // past the slow breakpoint, still unscaled
            note_on(300, 60),
        ];
        normalize_track(&mut track, &map, map.max_bpm());

        assert_eq!(track[0].delta.as_int(), 1000);
        // The note picks up the running time the controller advanced
        assert_eq!(track[1].delta.as_int(), 400);
    }

    #[test]
    fn test_rounding_of_scaled_deltas() {
        // 100 BPM at tick 0, 150 BPM from tick 0 is not expressible, so use
        // two regions and a delta that does not divide evenly
        let tempo_track = vec![tempo_event(0, 600_000), tempo_event(480, 400_000)];
        let map = TempoMap::from_track(&tempo_track).unwrap();

        let mut track = vec![note_on(485, 60)];
        normalize_track(&mut track, &map, map.max_bpm());

        // 485 * 150 / 150 = 485 in the second region
        assert_eq!(track[0].delta.as_int(), 485);

        let mut track = vec![note_on(479, 60)];
        normalize_track(&mut track, &map, map.max_bpm());

        // 479 * 150 / 100 = 718.5, rounded half up
        assert_eq!(track[0].delta.as_int(), 719);
    }

    #[test]
    fn test_strip_tempo_changes_keeps_initial_setting() {
        let mut track = vec![
            tempo_event(0, 500_000),
            control_change(120),
            tempo_event(480, 666_667),
            tempo_event(480, 400_000),
        ];
        strip_tempo_changes(&mut track);

        assert_eq!(track.len(), 2);
        assert!(event::is_tempo_change(&track[0].kind));
        assert_eq!(track[1].delta.as_int(), 120);
    }
}
