//! STFT-based spectrogram generation
//!
//! Provides time-frequency analysis through Short-Time Fourier Transform with
//! an optional mel projection. The output is a dB matrix clipped to a
//! percentile-based dynamic range, ready for direct visualization.
//!
//! ```rust
//! use equalis_analysis::spectrogram::{SpectrogramParams, compute_spectrogram};
//!
//! let signal: Vec<f64> = (0..8000).map(|i| (i as f64 * 0.1).sin()).collect();
//! let params = SpectrogramParams::default().with_n_fft(512).with_hop_length(128).with_n_mels(32);
//! let spec = compute_spectrogram(&signal, 8000.0, &params).unwrap();
//! assert_eq!(spec.freqs.len(), 32);
//! ```

use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mel::MelFilterbank;
use crate::signal::{ensure_finite, prepare};
use crate::transform::{fft_in_place, positive_frequencies};
use crate::window::Window;

/// Values below this are floored before taking a logarithm.
pub const AMPLITUDE_FLOOR: f64 = 1e-10;

/// Dynamic range (dB) kept below the maximum by the dB conversion.
pub const TOP_DB: f64 = 80.0;

/// Lowest dB value the global clamp allows.
pub const MIN_DB: f64 = -80.0;

/// Percentile of all dB values used as the lower clip bound.
pub const CLIP_PERCENTILE: f64 = 5.0;

/// Spectrogram computation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramParams {
    /// FFT size (power of two).
    pub n_fft: usize,
    /// Samples between successive frames.
    pub hop_length: usize,
    /// Number of mel bands (mel mode only).
    pub n_mels: usize,
    /// Highest frequency shown; `None` or anything above Nyquist means Nyquist.
    pub f_max: Option<f64>,
    /// Project onto the mel scale instead of the linear FFT axis.
    pub use_mel: bool,
    /// Analysis window applied to each frame.
    pub window: Window,
    /// Decimate the time axis if it is longer than this.
    pub max_time_points: Option<usize>,
    /// Decimate the frequency axis if it is longer than this.
    pub max_freq_points: Option<usize>,
}

impl Default for SpectrogramParams {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            f_max: Some(8000.0),
            use_mel: true,
            window: Window::Hann,
            max_time_points: None,
            max_freq_points: None,
        }
    }
}

impl SpectrogramParams {
    /// Set the FFT size.
    pub fn with_n_fft(mut self, n_fft: usize) -> Self {
        self.n_fft = n_fft;
        self
    }

    /// Set the hop length.
    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.hop_length = hop_length;
        self
    }

    /// Set the number of mel bands.
    pub fn with_n_mels(mut self, n_mels: usize) -> Self {
        self.n_mels = n_mels;
        self
    }

    /// Set the maximum frequency.
    pub fn with_f_max(mut self, f_max: Option<f64>) -> Self {
        self.f_max = f_max;
        self
    }

    /// Switch between mel and linear frequency axes.
    pub fn with_mel(mut self, use_mel: bool) -> Self {
        self.use_mel = use_mel;
        self
    }

    /// Set the analysis window.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Cap the number of time points and frequency points.
    pub fn with_max_points(mut self, time: Option<usize>, freq: Option<usize>) -> Self {
        self.max_time_points = time;
        self.max_freq_points = freq;
        self
    }

    /// Check the parameters without touching any signal.
    pub fn validate(&self) -> Result<()> {
        if self.n_fft < 2 || !self.n_fft.is_power_of_two() {
            return Err(Error::invalid_parameter(
                "n_fft",
                format!("must be a power of two ≥ 2 (got {})", self.n_fft),
            ));
        }
        if self.hop_length == 0 {
            return Err(Error::invalid_parameter("hop_length", "must be at least 1"));
        }
        if self.use_mel && self.n_mels == 0 {
            return Err(Error::invalid_parameter("n_mels", "must be at least 1"));
        }
        if let Some(f_max) = self.f_max
            && (f_max.is_nan() || f_max <= 0.0)
        {
            return Err(Error::invalid_parameter(
                "f_max",
                format!("must be positive (got {f_max})"),
            ));
        }
        Ok(())
    }

    /// `f_max` clamped to the Nyquist frequency.
    pub fn effective_f_max(&self, sample_rate: f64) -> f64 {
        let nyquist = sample_rate / 2.0;
        match self.f_max {
            Some(f) if f <= nyquist => f,
            _ => nyquist,
        }
    }
}

/// Spectrogram data structure
///
/// Serializes as `{ "z": [[...]], "x": [...], "y": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrogram {
    /// dB values `[frequency_index][time_index]`, clipped to `[floor, 0]`.
    #[serde(rename = "z")]
    pub db: Vec<Vec<f64>>,
    /// Frame times in seconds.
    #[serde(rename = "x")]
    pub times: Vec<f64>,
    /// Row frequencies in Hz (mel centers in mel mode).
    #[serde(rename = "y")]
    pub freqs: Vec<f64>,
}

impl Spectrogram {
    /// Number of frequency rows.
    pub fn num_freqs(&self) -> usize {
        self.db.len()
    }

    /// Number of time columns.
    pub fn num_frames(&self) -> usize {
        self.times.len()
    }

    /// Get the dB value at a frequency row and time column.
    ///
    /// Returns None if out of bounds
    pub fn get(&self, freq: usize, frame: usize) -> Option<f64> {
        self.db.get(freq).and_then(|row| row.get(frame)).copied()
    }

    /// Column of dB values for one time frame.
    pub fn frame(&self, frame: usize) -> Option<Vec<f64>> {
        if frame >= self.num_frames() {
            return None;
        }
        Some(self.db.iter().map(|row| row[frame]).collect())
    }

    /// Smallest and largest dB value (`(0.0, 0.0)` when empty).
    pub fn range(&self) -> (f64, f64) {
        let mut values = self.db.iter().flatten().copied();
        let Some(first) = values.next() else {
            return (0.0, 0.0);
        };
        values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }

    /// Find peak frequency at a given time frame
    pub fn peak_frequency(&self, frame: usize) -> Option<f64> {
        let column = self.frame(frame)?;
        let (peak, _) = column
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))?;
        self.freqs.get(peak).copied()
    }
}

/// STFT (Short-Time Fourier Transform) analyzer
///
/// Frames are centered: the signal is padded by `n_fft / 2` zeros on both
/// sides before framing.
#[derive(Debug, Clone)]
pub struct StftAnalyzer {
    n_fft: usize,
    hop_length: usize,
    window: Window,
    window_coeffs: Vec<f64>,
}

impl StftAnalyzer {
    /// Create a new STFT analyzer
    ///
    /// # Arguments
    /// * `n_fft` - FFT size (power of two)
    /// * `hop_length` - Hop size between frames
    /// * `window` - Window function to use
    pub fn new(n_fft: usize, hop_length: usize, window: Window) -> Result<Self> {
        SpectrogramParams {
            n_fft,
            hop_length,
            use_mel: false,
            ..SpectrogramParams::default()
        }
        .validate()?;

        Ok(Self {
            n_fft,
            hop_length,
            window,
            window_coeffs: window.coefficients(n_fft),
        })
    }

    /// Number of frames produced for a signal of `len` samples.
    pub fn num_frames(&self, len: usize) -> usize {
        let padded = len + 2 * (self.n_fft / 2);
        if padded < self.n_fft {
            return 1;
        }
        1 + (padded - self.n_fft) / self.hop_length
    }

    /// Number of non-negative frequency bins per frame.
    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Compute the complex STFT, one `n_fft / 2 + 1` bin spectrum per frame.
    ///
    /// Samples past the end of the padded signal are read as zero.
    pub fn analyze(&self, signal: &[f64]) -> Vec<Vec<Complex64>> {
        let pad = self.n_fft / 2;
        let num_frames = self.num_frames(signal.len());
        let num_bins = self.num_bins();
        let mut buffer = vec![Complex64::new(0.0, 0.0); self.n_fft];

        (0..num_frames)
            .map(|frame_idx| {
                let start = frame_idx * self.hop_length;
                for (i, (slot, &coeff)) in buffer.iter_mut().zip(&self.window_coeffs).enumerate() {
                    let sample = (start + i)
                        .checked_sub(pad)
                        .and_then(|idx| signal.get(idx))
                        .copied()
                        .unwrap_or(0.0);
                    *slot = Complex64::new(sample * coeff, 0.0);
                }
                fft_in_place(&mut buffer);
                buffer[..num_bins].to_vec()
            })
            .collect()
    }

    /// Get FFT size
    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    /// Get hop size
    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Get the window function used
    pub fn window(&self) -> Window {
        self.window
    }
}

/// Compute a dB spectrogram of `signal`.
///
/// NaN/Inf samples are replaced by zero. Empty signals, non-positive sample
/// rates and invalid parameters are rejected. Finite input that overflows
/// during the transform fails with [`Error::NumericAnomaly`].
pub fn compute_spectrogram(
    signal: &[f64],
    sample_rate: f64,
    params: &SpectrogramParams,
) -> Result<Spectrogram> {
    let signal = prepare(signal, sample_rate)?;
    params.validate()?;

    let f_max = params.effective_f_max(sample_rate);
    let stft = StftAnalyzer::new(params.n_fft, params.hop_length, params.window)?;
    let frames = stft.analyze(&signal);

    let (mut db, mut freqs) = if params.use_mel {
        let filterbank = MelFilterbank::new(sample_rate, params.n_fft, params.n_mels, 0.0, f_max)?;
        let mel_frames = frames
            .iter()
            .map(|frame| {
                let power: Vec<f64> = frame.iter().map(|c| c.norm_sqr()).collect();
                ensure_finite(&power, "spectrogram power")?;
                let mel = filterbank.apply(&power);
                ensure_finite(&mel, "mel power")?;
                Ok(mel.into_iter().map(|p| p.max(AMPLITUDE_FLOOR)).collect())
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;
        let mut db = transpose(&mel_frames);
        to_db(&mut db, 10.0);
        (db, filterbank.center_frequencies().to_vec())
    } else {
        let freqs: Vec<f64> = positive_frequencies(params.n_fft, sample_rate)
            .into_iter()
            .filter(|&f| f <= f_max)
            .collect();
        let mag_frames = frames
            .iter()
            .map(|frame| {
                let mags: Vec<f64> = frame[..freqs.len()].iter().map(|c| c.norm()).collect();
                ensure_finite(&mags, "spectrogram magnitude")?;
                Ok(mags.into_iter().map(|m| m.max(AMPLITUDE_FLOOR)).collect())
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;
        let mut db = transpose(&mag_frames);
        to_db(&mut db, 20.0);
        (db, freqs)
    };

    clip_dynamic_range(&mut db);

    let mut times: Vec<f64> = (0..frames.len())
        .map(|i| (i * params.hop_length) as f64 / sample_rate)
        .collect();

    if let Some(step) = decimation_step(times.len(), params.max_time_points) {
        times = times.into_iter().step_by(step).collect();
        for row in &mut db {
            *row = row.iter().copied().step_by(step).collect();
        }
    }
    if let Some(step) = decimation_step(freqs.len(), params.max_freq_points) {
        freqs = freqs.into_iter().step_by(step).collect();
        db = db.into_iter().step_by(step).collect();
    }

    tracing::debug!(
        use_mel = params.use_mel,
        f_max,
        freqs = freqs.len(),
        frames = times.len(),
        "spectrogram computed"
    );

    Ok(Spectrogram { db, times, freqs })
}

/// `[time][freq]` → `[freq][time]`.
fn transpose(frames: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let rows = frames.first().map_or(0, Vec::len);
    (0..rows)
        .map(|r| frames.iter().map(|frame| frame[r]).collect())
        .collect()
}

/// In-place `factor * log10(S / max(S))`, floored at `max_db - TOP_DB`.
///
/// `factor` is 10 for power values and 20 for magnitudes.
pub fn to_db(matrix: &mut [Vec<f64>], factor: f64) {
    let reference = matrix
        .iter()
        .flatten()
        .fold(AMPLITUDE_FLOOR, |acc, &v| acc.max(v));

    let mut max_db = f64::NEG_INFINITY;
    for v in matrix.iter_mut().flatten() {
        *v = factor * (v.max(AMPLITUDE_FLOOR) / reference).log10();
        max_db = max_db.max(*v);
    }

    let floor = max_db - TOP_DB;
    for v in matrix.iter_mut().flatten() {
        *v = v.max(floor);
    }
}

/// Clip every value into `[max(p5, -80), 0]`, where `p5` is the 5th percentile.
pub fn clip_dynamic_range(matrix: &mut [Vec<f64>]) {
    let values: Vec<f64> = matrix.iter().flatten().copied().collect();
    if values.is_empty() {
        return;
    }
    let lower = percentile(&values, CLIP_PERCENTILE).max(MIN_DB);
    for v in matrix.iter_mut().flatten() {
        *v = v.clamp(lower, 0.0);
    }
}

/// `q`-th percentile (0–100) with linear interpolation between order
/// statistics. Returns NaN for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Stride for decimating an axis of `len` points to roughly `cap` points.
fn decimation_step(len: usize, cap: Option<usize>) -> Option<usize> {
    match cap {
        Some(cap) if cap > 0 && len > cap => Some((len / cap).max(1)),
        _ => None,
    }
}
