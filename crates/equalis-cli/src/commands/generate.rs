//! Synthetic test signal command.

use super::common::parse_partial;
use clap::Args;
use equalis_analysis::synth::DEFAULT_HEADROOM;
use equalis_analysis::{DEFAULT_PARTIALS, Partial, synthesize};
use equalis_io::{WavSpec, write_wav};
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Duration in seconds
    #[arg(long, default_value = "10.0")]
    duration: f64,

    /// Sample rate
    #[arg(long, default_value = "44100")]
    sample_rate: u32,

    /// Partial as FREQ:AMP[:sin|cos], repeatable (defaults to an 8-tone mix)
    #[arg(long = "partial", value_parser = parse_partial)]
    partials: Vec<Partial>,

    /// Peak level after normalization (0-1]
    #[arg(long, default_value_t = DEFAULT_HEADROOM)]
    headroom: f64,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let partials: &[Partial] = if args.partials.is_empty() {
        &DEFAULT_PARTIALS
    } else {
        &args.partials
    };

    let samples = synthesize(
        partials,
        f64::from(args.sample_rate),
        args.duration,
        args.headroom,
    )?;

    let spec = WavSpec {
        channels: 1,
        sample_rate: args.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav(&args.output, &samples, spec)?;

    println!(
        "Generated {} partial(s), {:.2}s at {} Hz: {}",
        partials.len(),
        args.duration,
        args.sample_rate,
        args.output.display()
    );
    Ok(())
}
