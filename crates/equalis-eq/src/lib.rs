//! Equalis EQ - FFT-domain band equalizer
//!
//! Bands apply a linear gain over frequency ranges. The engine picks one of
//! three strategies by signal length, all sharing one gain-mask builder:
//!
//! - [`strategy`] - direct, chunked overlap-add, and parallel chunked processing
//! - [`mask`] - per-bin gain masks
//! - [`cache`] - bounded LRU of forward spectra, verified on every hit
//! - [`engine`] - [`Equalizer`]: validation, identity fast path, peak normalization
//! - [`api`] - `equalize` request/response types
//! - [`preview`] - band effect applied to an existing dB spectrogram
//!
//! ## Example
//!
//! ```rust
//! use equalis_eq::{BandSpec, Equalizer, equalize};
//!
//! let eq = Equalizer::default();
//! let signal = vec![0.0, 0.3, 0.5, 0.3, 0.0, -0.3, -0.5, -0.3];
//! let bands = vec![BandSpec { gain: 1.0, freq_ranges: vec![vec![0.0, 100.0]], label: None }];
//! let response = equalize(&eq, &signal, 8000.0, &bands).unwrap();
//! assert_eq!(response.output_signal, signal);
//! ```

pub mod api;
pub mod band;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod mask;
pub mod preview;
pub mod strategy;

pub use api::{EqualizeRequest, EqualizeResponse, equalize};
pub use band::{Band, BandSpec, FrequencyRange, UNITY_TOLERANCE, parse_bands};
pub use cache::{CacheStats, Fingerprint, SpectrumCache};
pub use config::{ChunkLayout, EqualizerConfig};
pub use engine::{Equalizer, normalize_peak};
pub use error::{Error, Result};
pub use mask::GainMask;
pub use preview::preview_spectrogram;
pub use strategy::{Strategy, select_strategy};
