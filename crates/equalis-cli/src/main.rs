//! Equalis CLI - command-line front end for the equalis equalizer.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "equalis")]
#[command(author, version, about = "FFT band equalizer and spectrum analysis", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Magnitude/phase spectrum of a WAV file as JSON
    Fft(commands::fft::FftArgs),

    /// Mel or linear dB spectrogram of a WAV file as JSON
    Spectrogram(commands::spectrogram::SpectrogramArgs),

    /// Apply equalizer bands to a WAV file
    Equalize(commands::equalize::EqualizeArgs),

    /// Generate a synthetic multi-tone test signal
    Generate(commands::generate::GenerateArgs),

    /// List built-in equalizer modes
    Modes(commands::modes::ModesArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Fft(args) => commands::fft::run(args),
        Commands::Spectrogram(args) => commands::spectrogram::run(args),
        Commands::Equalize(args) => commands::equalize::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Modes(args) => commands::modes::run(args),
    }
}
