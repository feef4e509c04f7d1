//! Whole-signal spectrum summaries: frequencies, magnitudes and phases of
//! the non-negative FFT bins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::signal::{ensure_finite, prepare};
use crate::transform::{forward_real, phase_rad, positive_frequencies};

/// Dynamic range kept by the audiogram scale, in dB.
pub const AUDIOGRAM_RANGE_DB: f64 = 100.0;

/// Audible band kept by the audiogram scale, in Hz.
pub const AUDIOGRAM_BAND_HZ: (f64, f64) = (20.0, 20000.0);

/// How magnitudes are reported by [`compute_fft_scaled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyScale {
    /// Raw linear magnitudes.
    #[default]
    Linear,
    /// dB magnitudes shifted into `0..=100`, restricted to 20 Hz – 20 kHz.
    Audiogram,
}

impl fmt::Display for FrequencyScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencyScale::Linear => f.write_str("linear"),
            FrequencyScale::Audiogram => f.write_str("audiogram"),
        }
    }
}

impl FromStr for FrequencyScale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(FrequencyScale::Linear),
            "audiogram" => Ok(FrequencyScale::Audiogram),
            other => Err(format!("unknown scale '{other}' (expected linear or audiogram)")),
        }
    }
}

/// Spectrum of a whole signal over its non-negative frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FftSummary {
    /// Bin frequencies in Hz, DC first.
    pub frequencies: Vec<f64>,
    /// Bin magnitudes (linear, or audiogram dB).
    pub magnitudes: Vec<f64>,
    /// Bin phases in radians.
    pub phases: Vec<f64>,
}

impl FftSummary {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True if no bins are present.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Index of the bin closest to `freq_hz`.
    pub fn nearest_bin(&self, freq_hz: f64) -> Option<usize> {
        self.frequencies
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - freq_hz).abs().total_cmp(&(*b - freq_hz).abs()))
            .map(|(i, _)| i)
    }

    /// The `count` loudest bins as `(frequency, magnitude)`, loudest first.
    pub fn peaks(&self, count: usize) -> Vec<(f64, f64)> {
        let mut indexed: Vec<(f64, f64)> = self
            .frequencies
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
            .collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(count);
        indexed
    }
}

/// Linear-magnitude spectrum of `signal`. See [`compute_fft_scaled`].
pub fn compute_fft(signal: &[f64], sample_rate: f64) -> Result<FftSummary> {
    compute_fft_scaled(signal, sample_rate, FrequencyScale::Linear)
}

/// Spectrum of `signal` over bins `0..=N/2`, where `N` is the signal length
/// rounded up to a power of two.
///
/// NaN/Inf samples are replaced by zero. Empty signals and non-positive
/// sample rates are rejected, and a transform that overflows yields
/// [`Error::NumericAnomaly`](crate::Error::NumericAnomaly).
pub fn compute_fft_scaled(
    signal: &[f64],
    sample_rate: f64,
    scale: FrequencyScale,
) -> Result<FftSummary> {
    let signal = prepare(signal, sample_rate)?;
    let frame = forward_real(&signal);
    let half = frame.positive_half();

    let frequencies = positive_frequencies(frame.len(), sample_rate);
    let magnitudes: Vec<f64> = half.iter().map(|c| c.norm()).collect();
    ensure_finite(&magnitudes, "fft magnitudes")?;
    let phases = phase_rad(half);

    let summary = FftSummary {
        frequencies,
        magnitudes,
        phases,
    };

    Ok(match scale {
        FrequencyScale::Linear => summary,
        FrequencyScale::Audiogram => to_audiogram(summary),
    })
}

/// dB magnitudes clipped to a 100 dB window and shifted to start at 0,
/// keeping only bins in the audible band.
fn to_audiogram(summary: FftSummary) -> FftSummary {
    let db: Vec<f64> = summary
        .magnitudes
        .iter()
        .map(|m| 20.0 * (m + 1e-10).log10())
        .collect();
    let max_db = db.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_db = max_db - AUDIOGRAM_RANGE_DB;

    let (lo, hi) = AUDIOGRAM_BAND_HZ;
    let mut out = FftSummary {
        frequencies: Vec::new(),
        magnitudes: Vec::new(),
        phases: Vec::new(),
    };
    for ((&f, &d), &p) in summary.frequencies.iter().zip(&db).zip(&summary.phases) {
        if (lo..=hi).contains(&f) {
            out.frequencies.push(f);
            out.magnitudes.push(d.clamp(min_db, max_db) - min_db);
            out.phases.push(p);
        }
    }
    out
}
