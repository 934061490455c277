// Arranger - turns normalized instrument tracks into playable parts
// Pitch folding into the instrument range, then monophonic lane decomposition

pub mod lanes;
pub mod transpose;

pub use lanes::split_track;
pub use transpose::{transpose_tracks, TransposeError, FOLD_HIGH, FOLD_LOW};
