//! File-based equalization command.

use super::common::{load_config, parse_band};
use anyhow::{Context, bail};
use clap::Args;
use equalis_analysis::signal::{peak, rms};
use equalis_config::get_factory_mode;
use equalis_eq::{Band, BandSpec, Strategy, parse_bands};
use equalis_io::{read_wav, write_wav};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct EqualizeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Band as GAIN:MIN-MAX[,MIN-MAX], repeatable (e.g. "0:4000-6000")
    #[arg(short, long = "band", value_parser = parse_band)]
    bands: Vec<Band>,

    /// Built-in mode whose sliders are set with --gains
    #[arg(short, long)]
    mode: Option<String>,

    /// Comma-separated slider gains for --mode, in slider order
    #[arg(short, long, value_delimiter = ',', requires = "mode")]
    gains: Option<Vec<f64>>,

    /// JSON file with an array of {"gain", "freqRanges"} bands
    #[arg(long)]
    bands_json: Option<PathBuf>,

    /// Force a processing strategy (direct, chunked, parallel)
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Kernel config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output bit depth (16, 24, or 32); defaults to the input's
    #[arg(long)]
    bit_depth: Option<u16>,
}

fn collect_bands(args: &EqualizeArgs) -> anyhow::Result<Vec<Band>> {
    let mut bands = Vec::new();

    if let Some(name) = &args.mode {
        let Some(mode) = get_factory_mode(name) else {
            bail!("Mode '{}' not found. Use 'equalis modes' to list modes.", name);
        };
        let mode_bands = match &args.gains {
            Some(gains) => mode.with_gains(gains)?,
            None => mode.bands()?,
        };
        println!("Mode: {} ({} band(s))", mode.name, mode_bands.len());
        bands.extend(mode_bands);
    }

    if let Some(path) = &args.bands_json {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let specs: Vec<BandSpec> = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        bands.extend(parse_bands(&specs)?);
    }

    bands.extend(args.bands.iter().cloned());
    Ok(bands)
}

fn linear_to_db(x: f64) -> f64 {
    20.0 * x.max(1e-10).log10()
}

pub fn run(args: EqualizeArgs) -> anyhow::Result<()> {
    let bands = collect_bands(&args)?;
    if bands.is_empty() && args.mode.is_none() {
        bail!("No bands specified. Use --band, --mode, or --bands-json");
    }

    let config = load_config(args.config.as_deref())?;
    let equalizer = config.build_equalizer()?;

    println!("Reading {}...", args.input.display());
    let (samples, spec) = read_wav(&args.input)?;
    let sample_rate = spec.sample_rate_hz();
    println!(
        "  {} samples, {} Hz, {:.2}s",
        samples.len(),
        spec.sample_rate,
        samples.len() as f64 / sample_rate
    );

    let strategy = args
        .strategy
        .unwrap_or_else(|| equalizer.strategy_for(samples.len()));
    println!("Equalizing with {} band(s), {} strategy...", bands.len(), strategy);

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message("processing");
    pb.enable_steady_tick(Duration::from_millis(100));

    let started = Instant::now();
    let result = match args.strategy {
        Some(strategy) => equalizer.process_with_strategy(&samples, sample_rate, &bands, strategy),
        None => equalizer.process(&samples, sample_rate, &bands),
    };
    let output = match result {
        Ok(output) => {
            pb.finish_with_message("done");
            output
        }
        Err(err) => {
            pb.abandon_with_message("failed");
            return Err(err.into());
        }
    };
    let elapsed = started.elapsed();

    let mut out_spec = spec.mono();
    if let Some(bits) = args.bit_depth {
        out_spec.bits_per_sample = bits;
    }
    write_wav(&args.output, &output, out_spec)?;

    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&samples)),
        linear_to_db(peak(&samples))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&output)),
        linear_to_db(peak(&output))
    );
    println!("  Time:   {:.1} ms", elapsed.as_secs_f64() * 1000.0);
    println!("\nWrote {}", args.output.display());
    Ok(())
}
