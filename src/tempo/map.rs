// Tempo map - sorted breakpoints built from the tempo track
// Answers "what tempo is in effect at tick T" for monotone queries

use midly::Track;
use thiserror::Error;

use crate::midi::event;

#[derive(Debug, Error)]
pub enum TempoError {
    #[error("tempo track contains no tempo events")]
    MalformedTempoData,
}

/// A tempo change taking effect at an absolute tick time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoBreakpoint {
    /// Beats per minute from this point on
    pub bpm: f64,

    /// Absolute tick time at which this tempo takes effect
    pub start_ticks: u64,
}

/// All tempo changes of one file, in tick order
///
/// Built by a single walk over the tempo track, summing every event's delta
/// into a running tick time. The first breakpoint always starts at tick 0:
/// the initial tempo governs everything before the first written change.
#[derive(Debug, Clone)]
pub struct TempoMap {
    breakpoints: Vec<TempoBreakpoint>,
}

impl TempoMap {
    /// Build a tempo map from the tempo track (track 0 of the file)
    pub fn from_track(track: &Track) -> Result<Self, TempoError> {
        let mut breakpoints = Vec::new();
        let mut time: u64 = 0;

        for ev in track {
            time += u64::from(ev.delta.as_int());

            if let Some(bpm) = event::tempo_bpm(&ev.kind) {
                breakpoints.push(TempoBreakpoint {
                    bpm,
                    start_ticks: time,
                });
            }
        }

        if breakpoints.is_empty() {
            return Err(TempoError::MalformedTempoData);
        }
        breakpoints[0].start_ticks = 0;

        Ok(TempoMap { breakpoints })
    }

    /// The fastest tempo in the file, used as the normalization target
    pub fn max_bpm(&self) -> f64 {
        self.breakpoints
            .iter()
            .map(|bp| bp.bpm)
            .fold(f64::MIN, f64::max)
    }

    /// All breakpoints in tick order
    pub fn breakpoints(&self) -> &[TempoBreakpoint] {
        &self.breakpoints
    }

    /// Start a fresh lookup cursor for one track walk
    pub fn cursor(&self) -> TempoCursor<'_> {
        TempoCursor {
            breakpoints: &self.breakpoints,
            idx: 0,
        }
    }
}

/// Monotone tempo lookup state for one track walk
///
/// Each track gets its own cursor, so walks over different tracks never
/// share position. Query times must be non-decreasing.
#[derive(Debug)]
pub struct TempoCursor<'a> {
    breakpoints: &'a [TempoBreakpoint],
    idx: usize,
}

impl TempoCursor<'_> {
    /// Tempo in effect at `time_ticks`: the last breakpoint at or before it
    ///
    /// Several breakpoints may be crossed between two consecutive queries;
    /// the cursor catches up past all of them.
    pub fn tempo_at(&mut self, time_ticks: u64) -> f64 {
        while self.idx + 1 < self.breakpoints.len()
            && time_ticks >= self.breakpoints[self.idx + 1].start_ticks
        {
            self.idx += 1;
        }
        self.breakpoints[self.idx].bpm
    }
}
