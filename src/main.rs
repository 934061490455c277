// Monoband CLI
// One input file in, one ensemble-playable file out

use std::path::{Path, PathBuf};

use clap::Parser;

use monoband::pipeline;

/// Rewrite a multi-track MIDI file so that every output track can be played
/// by a single monophonic instrument, at one uniform tempo, within a fixed
/// two-octave pitch band.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Args {
    /// Input MIDI file
    file: PathBuf,

    /// Output path (defaults to the input path with a .mono.mid extension)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Append a JSONL progress trace to this file
    #[clap(long)]
    trace: Option<PathBuf>,
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("mono.mid")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.file));

    let summary = pipeline::convert_file(&args.file, &output, args.trace.as_deref())?;

    log::info!(
        "wrote {} ({} tracks from {} instrument tracks)",
        output.display(),
        summary.output_tracks,
        summary.instrument_tracks
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_replaces_extension() {
        assert_eq!(
            default_output_path(Path::new("song.mid")),
            PathBuf::from("song.mono.mid")
        );
        assert_eq!(
            default_output_path(Path::new("takes/second.midi")),
            PathBuf::from("takes/second.mono.mid")
        );
        assert_eq!(
            default_output_path(Path::new("bare")),
            PathBuf::from("bare.mono.mid")
        );
    }
}
