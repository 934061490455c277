// Lane decomposition - splits one polyphonic track into monophonic lanes
// Online greedy allocation over the paired note-on/note-off event stream

use midly::{Track, TrackEvent};

use crate::midi::event;

/// One monophonic output track in the making
///
/// `held` is the pitch currently sounding on the lane, or None while it is
/// idle. A lane models one physical player and sounds at most one note at
/// a time.
#[derive(Debug, Clone)]
struct Lane<'a> {
    events: Track<'a>,
    held: Option<u8>,
}

impl<'a> Lane<'a> {
    fn idle() -> Self {
        Lane {
            events: Track::new(),
            held: None,
        }
    }

    fn seeded(template: &Track<'a>) -> Self {
        Lane {
            events: template.clone(),
            held: None,
        }
    }
}

/// Split one instrument track into monophonic lanes
///
/// Events are processed strictly in input order; every assignment decision
/// depends on the held-note state left behind by the events before it.
///
/// - A NoteOn goes to the first idle lane. If every lane is busy but two
///   lanes hold the same pitch, that unison is redundant and the
///   higher-indexed lane of the first such pair gives up its NoteOn for
///   the new pitch. Only when neither applies is a new lane created.
/// - A NoteOff closes the first lane holding its pitch. A NoteOff no lane
///   can answer is dropped with a warning.
/// - Every other event is appended to all lanes, so program and controller
///   state is replicated across the players derived from this track.
///
/// A new lane is seeded from the running template of non-note events, so it
/// starts with exactly the setup history it would have received had it
/// existed from the start of the track.
///
/// Lanes come back in creation order. A lane still holding a note at the
/// end of input is emitted as-is; the unresolved note matches the source
/// data.
pub fn split_track<'a>(track: &Track<'a>) -> Vec<Track<'a>> {
    let mut lanes: Vec<Lane<'a>> = vec![Lane::idle()];
    let mut template: Track<'a> = Track::new();

    for ev in track {
        log::trace!("{:?}", ev);

        if let Some(key) = event::note_on_key(&ev.kind) {
            assign_note_on(&mut lanes, &template, *ev, key);
        } else if let Some(key) = event::note_off_key(&ev.kind) {
            match lanes.iter_mut().find(|lane| lane.held == Some(key)) {
                Some(lane) => {
                    lane.events.push(*ev);
                    lane.held = None;
                }
                None => log::warn!("dropping note-off for pitch {key}, no lane holds it"),
            }
        } else {
            template.push(*ev);
            for lane in lanes.iter_mut() {
                lane.events.push(*ev);
            }
        }
    }

    log::debug!("split track into {} lanes", lanes.len());
    lanes.into_iter().map(|lane| lane.events).collect()
}

/// Place a NoteOn on a lane, creating a new lane only as a last resort
fn assign_note_on<'a>(
    lanes: &mut Vec<Lane<'a>>,
    template: &Track<'a>,
    ev: TrackEvent<'a>,
    key: u8,
) {
    // First idle lane in index order.
    if let Some(lane) = lanes.iter_mut().find(|lane| lane.held.is_none()) {
        lane.events.push(ev);
        lane.held = Some(key);
        return;
    }

    // Two lanes sounding the same pitch are acoustically redundant, so the
    // higher-indexed one of the first pair is repurposed for the new pitch.
    // Its most recent event is the NoteOn that formed the unison.
    if let Some(stolen) = duplicate_lane(lanes) {
        let lane = &mut lanes[stolen];
        lane.events.pop();
        lane.events.push(ev);
        lane.held = Some(key);
        return;
    }

    let mut lane = Lane::seeded(template);
    lane.events.push(ev);
    lane.held = Some(key);
    lanes.push(lane);
}

/// Index of the second lane of the first pair holding the same pitch
///
/// The scan runs over pairs (i, j) with i < j, both ascending, and stops at
/// the first match. The order is a stable heuristic, not an optimum.
fn duplicate_lane(lanes: &[Lane]) -> Option<usize> {
    for i in 0..lanes.len() {
        if lanes[i].held.is_none() {
            continue;
        }
        for j in (i + 1)..lanes.len() {
            if lanes[i].held == lanes[j].held {
                return Some(j);
            }
        }
    }
    None
}
