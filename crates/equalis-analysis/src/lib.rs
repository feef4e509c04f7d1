//! Equalis Analysis - spectral kernel for the equalis equalizer
//!
//! This crate provides the numeric building blocks:
//!
//! - [`transform`] - iterative radix-2 FFT/IFFT and FFT frequency bins
//! - [`window`] - Hann, Hamming and rectangular windows
//! - [`mel`] - Hz/Mel conversion and triangular mel filterbanks
//! - [`spectrogram`] - STFT, mel/linear dB spectrograms with dynamic-range clipping
//! - [`spectrum`] - whole-signal magnitude/phase summaries
//! - [`synth`] - synthetic multi-partial test signals
//! - [`signal`] - validation and NaN/Inf sanitization
//!
//! All arithmetic is `f64`; complex values use [`Complex64`].
//!
//! ## Spectrum
//!
//! ```rust
//! use equalis_analysis::spectrum::compute_fft;
//! use equalis_analysis::synth::sine;
//!
//! let signal = sine(1000.0, 1.0, 8192.0, 8192);
//! let summary = compute_fft(&signal, 8192.0).unwrap();
//! assert_eq!(summary.peaks(1)[0].0, 1000.0);
//! ```
//!
//! ## Spectrogram
//!
//! ```rust,ignore
//! use equalis_analysis::spectrogram::{SpectrogramParams, compute_spectrogram};
//!
//! let spec = compute_spectrogram(&signal, 44100.0, &SpectrogramParams::default())?;
//! println!("{} mel rows x {} frames", spec.num_freqs(), spec.num_frames());
//! ```

pub mod error;
pub mod mel;
pub mod signal;
pub mod spectrogram;
pub mod spectrum;
pub mod synth;
pub mod transform;
pub mod window;

pub use rustfft::num_complex::Complex64;

// Re-export main types
pub use error::{Error, Result};
pub use mel::{MelFilterbank, hz_to_mel, mel_frequencies, mel_to_hz};
pub use spectrogram::{Spectrogram, SpectrogramParams, StftAnalyzer, compute_spectrogram};
pub use spectrum::{FftSummary, FrequencyScale, compute_fft, compute_fft_scaled};
pub use synth::{DEFAULT_PARTIALS, Partial, PartialShape, synthesize};
pub use transform::{
    SpectralFrame, forward_real, forward_transform, frequency_bins, inverse_transform,
    positive_frequencies,
};
pub use window::Window;
