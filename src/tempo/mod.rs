// Tempo handling - breakpoint map construction and delta-time normalization
// Runs before pitch folding and lane decomposition

pub mod map;
pub mod normalize;

pub use map::{TempoBreakpoint, TempoCursor, TempoError, TempoMap};
pub use normalize::{normalize_track, strip_tempo_changes};
