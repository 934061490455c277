// Conversion pipeline
// Tempo normalization, transposition, then per-track lane decomposition

pub mod trace;

pub use trace::{read_trace_file, Stage, TraceEntry, TraceError, TraceWriter};

use std::path::Path;

use midly::{Smf, Track};
use serde::Serialize;
use thiserror::Error;

use crate::arranger::{split_track, transpose_tracks, TransposeError};
use crate::midi::file::{self, is_instrument_track, MidiFileError};
use crate::tempo::{normalize_track, strip_tempo_changes, TempoError, TempoMap};

/// Errors that abort a conversion run
///
/// Every failure is fatal: no output file is written and the reason
/// surfaces to the caller.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("MIDI container error: {0}")]
    Midi(#[from] MidiFileError),

    #[error("tempo analysis failed: {0}")]
    Tempo(#[from] TempoError),

    #[error("transposition failed: {0}")]
    Transpose(#[from] TransposeError),

    #[error("trace write failed: {0}")]
    Trace(#[from] TraceError),
}

/// What one conversion run did
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    /// Uniform tempo of the output, the fastest tempo of the source
    pub target_bpm: f64,

    /// Semitone offset applied to every instrument note, in [0, 11]
    pub transpose_offset: u8,

    /// Track count of the source file
    pub source_tracks: usize,

    /// How many source tracks carried a non-percussion program assignment
    pub instrument_tracks: usize,

    /// Track count of the output file (tempo track plus all lanes)
    pub output_tracks: usize,
}

/// Rewrite a parsed MIDI file for an ensemble of monophonic instruments
pub fn convert(smf: Smf) -> Result<(Smf, ConversionSummary), ConvertError> {
    convert_traced(smf, None)
}

/// Same as [`convert`], optionally appending progress entries to a trace
///
/// Stages run strictly in order: tempo scan, tempo normalization,
/// transposition, lane decomposition. The output track list is the
/// normalized tempo track followed by every lane of every instrument
/// track, in source-track order then lane-creation order. Source tracks
/// that are neither the tempo track nor instrument tracks are dropped.
pub fn convert_traced<'a>(
    mut smf: Smf<'a>,
    trace: Option<&TraceWriter>,
) -> Result<(Smf<'a>, ConversionSummary), ConvertError> {
    let source_tracks = smf.tracks.len();

    let tempo_track = smf.tracks.first().ok_or(TempoError::MalformedTempoData)?;
    let tempo_map = TempoMap::from_track(tempo_track)?;
    let target_bpm = tempo_map.max_bpm();

    log::info!("adjusting to {target_bpm} bpm");
    if let Some(writer) = trace {
        writer.write(&TraceEntry::with_data(
            Stage::TempoScan,
            0.1,
            format!("Found {} tempo breakpoints", tempo_map.breakpoints().len()),
            serde_json::json!({
                "breakpoints": tempo_map.breakpoints().len(),
                "target_bpm": target_bpm,
            }),
        ))?;
    }

    for track in smf.tracks.iter_mut().skip(1) {
        normalize_track(track, &tempo_map, target_bpm);
    }
    strip_tempo_changes(&mut smf.tracks[0]);
    if let Some(writer) = trace {
        writer.write(&TraceEntry::new(
            Stage::TempoNormalize,
            0.4,
            "Rescaled all tracks to the target tempo",
        ))?;
    }

    let transpose_offset = transpose_tracks(&mut smf.tracks[1..])?;
    log::info!("transposing by {transpose_offset} semitones");
    if let Some(writer) = trace {
        writer.write(&TraceEntry::with_data(
            Stage::Transpose,
            0.6,
            format!("Transposed by {transpose_offset} semitones"),
            serde_json::json!({ "offset": transpose_offset }),
        ))?;
    }

    let mut source = std::mem::take(&mut smf.tracks);
    let mut output: Vec<Track<'a>> = Vec::with_capacity(source.len());
    let mut instrument_tracks = 0;

    for (index, track) in source.drain(..).enumerate() {
        if index == 0 {
            output.push(track);
            continue;
        }
        if !is_instrument_track(&track) {
            // Neither tempo nor instrument data; nothing an ensemble player
            // could perform, so the track does not survive conversion.
            log::debug!("dropping non-instrument track {index}");
            continue;
        }

        instrument_tracks += 1;
        let lanes = split_track(&track);
        if let Some(writer) = trace {
            writer.write(&TraceEntry::with_data(
                Stage::LaneSplit,
                0.8,
                format!("Split track {index} into {} lanes", lanes.len()),
                serde_json::json!({ "track": index, "lanes": lanes.len() }),
            ))?;
        }
        output.extend(lanes);
    }

    let summary = ConversionSummary {
        target_bpm,
        transpose_offset,
        source_tracks,
        instrument_tracks,
        output_tracks: output.len(),
    };
    if let Some(writer) = trace {
        let data = serde_json::to_value(&summary).map_err(TraceError::SerializationError)?;
        writer.write(&TraceEntry::with_data(
            Stage::LaneSplit,
            1.0,
            "Conversion complete",
            data,
        ))?;
    }

    smf.tracks = output;
    Ok((smf, summary))
}

/// Read, convert, and write a MIDI file
///
/// This is the whole CLI surface: everything between the two paths is
/// [`convert_traced`].
pub fn convert_file(
    input: &Path,
    output: &Path,
    trace_path: Option<&Path>,
) -> Result<ConversionSummary, ConvertError> {
    let bytes = file::read_file(input)?;
    let smf = file::parse(&bytes)?;
    log::info!("read {} tracks from {}", smf.tracks.len(), input.display());

    let writer = trace_path.map(|path| TraceWriter::new(path.to_path_buf()));
    let (smf, summary) = convert_traced(smf, writer.as_ref())?;

    file::save(&smf, output)?;
    Ok(summary)
}
