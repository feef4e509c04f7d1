//! Whole-file spectrum command.

use super::common::write_json;
use clap::Args;
use equalis_analysis::{FrequencyScale, compute_fft_scaled};
use equalis_io::read_wav;
use std::path::PathBuf;

#[derive(Args)]
pub struct FftArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Magnitude scale (linear or audiogram)
    #[arg(long, default_value = "linear")]
    scale: FrequencyScale,

    /// Print the N loudest bins instead of the full spectrum
    #[arg(long, value_name = "N")]
    peaks: Option<usize>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: FftArgs) -> anyhow::Result<()> {
    let (samples, spec) = read_wav(&args.input)?;
    let summary = compute_fft_scaled(&samples, spec.sample_rate_hz(), args.scale)?;
    tracing::debug!(bins = summary.len(), scale = %args.scale, "computed spectrum");

    match args.peaks {
        Some(count) => {
            let peaks: Vec<serde_json::Value> = summary
                .peaks(count)
                .into_iter()
                .map(|(frequency, magnitude)| {
                    serde_json::json!({ "frequency": frequency, "magnitude": magnitude })
                })
                .collect();
            write_json(&peaks, args.output.as_ref())
        }
        None => write_json(&summary, args.output.as_ref()),
    }
}
