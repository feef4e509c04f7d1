//! Iterative radix-2 FFT, its inverse, and FFT frequency bins.
//!
//! The forward transform zero-pads its input to the next power of two,
//! applies the bit-reversal permutation in place, and then runs the
//! Cooley-Tukey butterflies bottom-up. Twiddle factors are advanced by
//! complex multiplication within each block instead of recomputing
//! `sin`/`cos` per element.
//!
//! The inverse reuses the forward transform through the conjugate identity
//! `IFFT(X) = conj(FFT(conj(X))) / N`.

use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// Complex spectrum produced by [`forward_transform`].
///
/// The length is always a power of two (or ≤ 1 for degenerate input). For a
/// real-valued source, bin `k` and bin `len - k` are complex conjugates.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFrame {
    bins: Vec<Complex64>,
}

impl SpectralFrame {
    /// Wrap an existing spectrum, zero-padding it to a power of two.
    pub fn from_bins(mut bins: Vec<Complex64>) -> Self {
        pad_to_power_of_two(&mut bins);
        Self { bins }
    }

    /// Number of bins (the transform length `N`).
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True if the frame holds no bins.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Borrow the bins.
    pub fn bins(&self) -> &[Complex64] {
        &self.bins
    }

    /// Mutable access to the bins, e.g. for applying a gain mask in place.
    pub fn bins_mut(&mut self) -> &mut [Complex64] {
        &mut self.bins
    }

    /// Consume the frame and return its bins.
    pub fn into_bins(self) -> Vec<Complex64> {
        self.bins
    }

    /// The non-negative frequency half: bins `0..=N/2` (DC through Nyquist).
    pub fn positive_half(&self) -> &[Complex64] {
        let n = self.bins.len();
        &self.bins[..(n / 2 + 1).min(n)]
    }

    /// Inverse transform back to the time domain.
    pub fn inverse(&self) -> Vec<Complex64> {
        inverse_transform(&self.bins)
    }

    /// Inverse transform keeping only the real part, cut or padded to `len`.
    pub fn inverse_real(&self, len: usize) -> Vec<f64> {
        let mut out: Vec<f64> = self.inverse().into_iter().map(|c| c.re).collect();
        out.resize(len, 0.0);
        out
    }
}

/// Smallest power of two that is ≥ `n` (1 for `n == 0`).
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Zero-pad `buffer` in place up to the next power of two.
///
/// Buffers of length ≤ 1 are left untouched.
pub fn pad_to_power_of_two(buffer: &mut Vec<Complex64>) {
    let n = buffer.len();
    if n > 1 && !n.is_power_of_two() {
        buffer.resize(n.next_power_of_two(), Complex64::new(0.0, 0.0));
    }
}

/// In-place forward FFT of a power-of-two buffer.
///
/// Lengths ≤ 1 are returned unchanged.
///
/// # Panics
///
/// Debug builds assert that the length is a power of two; use
/// [`pad_to_power_of_two`] first or call [`forward_transform`].
pub fn fft_in_place(buffer: &mut [Complex64]) {
    let n = buffer.len();
    if n <= 1 {
        return;
    }
    debug_assert!(n.is_power_of_two(), "fft length {n} is not a power of two");

    bit_reverse_permute(buffer);

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle = -2.0 * PI / len as f64;
        let w_len = Complex64::new(angle.cos(), angle.sin());

        for start in (0..n).step_by(len) {
            let mut w = Complex64::new(1.0, 0.0);
            for k in start..start + half {
                let u = buffer[k];
                let v = buffer[k + half] * w;
                buffer[k] = u + v;
                buffer[k + half] = u - v;
                w *= w_len;
            }
        }

        len <<= 1;
    }
}

/// Reorder `buffer` so that index `i` holds the element at `reverse_bits(i)`.
fn bit_reverse_permute(buffer: &mut [Complex64]) {
    let n = buffer.len();
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            buffer.swap(i, j);
        }
    }
}

/// Forward FFT of an arbitrary-length complex signal.
///
/// The input is zero-padded to the next power of two, so the returned frame
/// may be longer than the input.
pub fn forward_transform(signal: &[Complex64]) -> SpectralFrame {
    let mut bins = signal.to_vec();
    pad_to_power_of_two(&mut bins);
    fft_in_place(&mut bins);
    SpectralFrame { bins }
}

/// Forward FFT of a real signal.
pub fn forward_real(signal: &[f64]) -> SpectralFrame {
    let mut bins: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    pad_to_power_of_two(&mut bins);
    fft_in_place(&mut bins);
    SpectralFrame { bins }
}

/// Inverse FFT via the conjugate trick.
///
/// Non-power-of-two spectra are zero-padded first and normalized by the
/// padded length.
pub fn inverse_transform(frame: &[Complex64]) -> Vec<Complex64> {
    if frame.len() <= 1 {
        return frame.to_vec();
    }

    let mut buffer: Vec<Complex64> = frame.iter().map(|c| c.conj()).collect();
    pad_to_power_of_two(&mut buffer);
    fft_in_place(&mut buffer);

    let scale = 1.0 / buffer.len() as f64;
    for c in &mut buffer {
        *c = c.conj() * scale;
    }
    buffer
}

/// FFT sample frequencies for a transform of length `n`.
///
/// Bins `0..(n + 1) / 2` are non-negative and ascend from 0; the rest are
/// negative and ascend toward 0. Every value is scaled by
/// `1 / (sample_spacing * n)`. Works for even and odd `n`.
pub fn frequency_bins(n: usize, sample_spacing: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let scale = 1.0 / (sample_spacing * n as f64);
    let midpoint = n.div_ceil(2);
    (0..n)
        .map(|k| {
            if k < midpoint {
                k as f64 * scale
            } else {
                (k as f64 - n as f64) * scale
            }
        })
        .collect()
}

/// Frequencies of the `n / 2 + 1` non-negative bins, DC through Nyquist.
///
/// For even `n` the Nyquist bin is reported as `+sample_rate / 2`.
pub fn positive_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    (0..=n / 2)
        .map(|k| k as f64 * sample_rate / n as f64)
        .collect()
}

/// Magnitude spectrum in dB, floored at -200 dB.
pub fn magnitude_db(spectrum: &[Complex64]) -> Vec<f64> {
    spectrum
        .iter()
        .map(|c| 20.0 * c.norm().max(1e-10).log10())
        .collect()
}

/// Phase spectrum in radians.
pub fn phase_rad(spectrum: &[Complex64]) -> Vec<f64> {
    spectrum.iter().map(|c| c.arg()).collect()
}
