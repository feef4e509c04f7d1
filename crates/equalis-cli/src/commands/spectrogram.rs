//! Spectrogram command.

use super::common::{load_config, parse_band, write_json};
use clap::Args;
use equalis_analysis::{Window, compute_spectrogram};
use equalis_eq::{Band, preview_spectrogram};
use equalis_io::read_wav;
use std::path::PathBuf;

#[derive(Args)]
pub struct SpectrogramArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// FFT size (power of two)
    #[arg(long)]
    n_fft: Option<usize>,

    /// Samples between frames
    #[arg(long)]
    hop_length: Option<usize>,

    /// Number of mel bands
    #[arg(long)]
    n_mels: Option<usize>,

    /// Highest frequency in Hz (defaults to 8000, capped at Nyquist)
    #[arg(long)]
    f_max: Option<f64>,

    /// Linear frequency axis instead of mel
    #[arg(long)]
    linear: bool,

    /// Analysis window (hann, hamming, rectangular)
    #[arg(long)]
    window: Option<Window>,

    /// Decimate the time axis to at most this many columns
    #[arg(long)]
    max_time_points: Option<usize>,

    /// Decimate the frequency axis to at most this many rows
    #[arg(long)]
    max_freq_points: Option<usize>,

    /// Preview bands on the result (GAIN:MIN-MAX[,MIN-MAX]), repeatable
    #[arg(long = "preview-band", value_parser = parse_band)]
    preview_bands: Vec<Band>,

    /// Kernel config file (TOML) supplying defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: SpectrogramArgs) -> anyhow::Result<()> {
    let mut params = load_config(args.config.as_deref())?.spectrogram;
    if let Some(n_fft) = args.n_fft {
        params = params.with_n_fft(n_fft);
    }
    if let Some(hop) = args.hop_length {
        params = params.with_hop_length(hop);
    }
    if let Some(n_mels) = args.n_mels {
        params = params.with_n_mels(n_mels);
    }
    if args.f_max.is_some() {
        params = params.with_f_max(args.f_max);
    }
    if args.linear {
        params = params.with_mel(false);
    }
    if let Some(window) = args.window {
        params = params.with_window(window);
    }
    if args.max_time_points.is_some() || args.max_freq_points.is_some() {
        let time = args.max_time_points.or(params.max_time_points);
        let freq = args.max_freq_points.or(params.max_freq_points);
        params = params.with_max_points(time, freq);
    }

    let (samples, spec) = read_wav(&args.input)?;
    let sample_rate = spec.sample_rate_hz();
    let mut spectrogram = compute_spectrogram(&samples, sample_rate, &params)?;
    if !args.preview_bands.is_empty() {
        spectrogram = preview_spectrogram(&spectrogram, sample_rate, &args.preview_bands)?;
    }

    eprintln!(
        "{} x {} {} spectrogram",
        spectrogram.num_freqs(),
        spectrogram.num_frames(),
        if params.use_mel { "mel" } else { "linear" }
    );
    write_json(&spectrogram, args.output.as_ref())
}
