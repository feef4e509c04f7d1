//! Mel scale conversions and triangular mel filterbanks.

use crate::error::{Error, Result};
use crate::transform::positive_frequencies;

/// Convert Hz to Mel scale
pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert Mel to Hz
pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// `n_mels + 2` points equally spaced in mel between `f_min` and `f_max`,
/// converted back to Hz. Includes both edge points.
pub fn mel_edges(n_mels: usize, f_min: f64, f_max: f64) -> Vec<f64> {
    let mel_min = hz_to_mel(f_min);
    let mel_max = hz_to_mel(f_max);
    let steps = (n_mels + 1) as f64;
    (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / steps))
        .collect()
}

/// Center frequencies (Hz) of `n_mels` mel bands between `f_min` and `f_max`.
pub fn mel_frequencies(n_mels: usize, f_min: f64, f_max: f64) -> Vec<f64> {
    let edges = mel_edges(n_mels, f_min, f_max);
    edges[1..edges.len() - 1].to_vec()
}

/// Mel filterbank for converting a power spectrum to mel scale
///
/// Each filter is a triangle over the `n_fft / 2 + 1` non-negative FFT bins,
/// rising from 0 at its lower edge to 1 at its center and falling back to 0
/// at its upper edge.
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    filters: Vec<Vec<f64>>,
    centers: Vec<f64>,
}

impl MelFilterbank {
    /// Create a mel filterbank
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `n_fft` - FFT size the spectra were computed with
    /// * `n_mels` - Number of mel bands
    /// * `f_min` - Lower edge of the first band (Hz)
    /// * `f_max` - Upper edge of the last band (Hz)
    pub fn new(sample_rate: f64, n_fft: usize, n_mels: usize, f_min: f64, f_max: f64) -> Result<Self> {
        if n_mels == 0 {
            return Err(Error::invalid_parameter("n_mels", "must be at least 1"));
        }
        if n_fft < 2 {
            return Err(Error::invalid_parameter("n_fft", "must be at least 2"));
        }
        if !(f_min >= 0.0 && f_max > f_min && f_max.is_finite()) {
            return Err(Error::invalid_parameter(
                "f_max",
                format!("mel range [{f_min}, {f_max}] is empty or invalid"),
            ));
        }

        let edges = mel_edges(n_mels, f_min, f_max);
        let fft_freqs = positive_frequencies(n_fft, sample_rate);

        let filters = (0..n_mels)
            .map(|i| {
                let (lower, center, upper) = (edges[i], edges[i + 1], edges[i + 2]);
                fft_freqs
                    .iter()
                    .map(|&f| triangle_weight(f, lower, center, upper))
                    .collect()
            })
            .collect();

        Ok(Self {
            filters,
            centers: edges[1..=n_mels].to_vec(),
        })
    }

    /// Apply filterbank to a non-negative-frequency power spectrum
    pub fn apply(&self, spectrum: &[f64]) -> Vec<f64> {
        self.filters
            .iter()
            .map(|filter| filter.iter().zip(spectrum).map(|(&w, &s)| w * s).sum())
            .collect()
    }

    /// Filter weights, one row per mel band.
    pub fn filters(&self) -> &[Vec<f64>] {
        &self.filters
    }

    /// Center frequency of each band in Hz.
    pub fn center_frequencies(&self) -> &[f64] {
        &self.centers
    }

    /// Get number of mel bins
    pub fn num_mel_bins(&self) -> usize {
        self.filters.len()
    }

    /// Get number of FFT bins
    pub fn num_fft_bins(&self) -> usize {
        self.filters.first().map_or(0, Vec::len)
    }
}

/// Triangle weight of frequency `f`; degenerate slopes weigh 0.
fn triangle_weight(f: f64, lower: f64, center: f64, upper: f64) -> f64 {
    if lower <= f && f <= center {
        if center == lower { 0.0 } else { (f - lower) / (center - lower) }
    } else if center < f && f <= upper {
        if upper == center { 0.0 } else { (upper - f) / (upper - center) }
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_mel_values() {
        assert_eq!(hz_to_mel(0.0), 0.0);
        // 1000 Hz is close to 1000 mel with the 2595/700 constants
        assert!((hz_to_mel(1000.0) - 999.985).abs() < 0.01);
        assert!((mel_to_hz(hz_to_mel(440.0)) - 440.0).abs() < 1e-9);
    }

    #[test]
    fn mel_frequencies_are_interior_and_increasing() {
        let centers = mel_frequencies(10, 0.0, 8000.0);
        assert_eq!(centers.len(), 10);
        assert!(centers[0] > 0.0);
        assert!(*centers.last().unwrap() < 8000.0);
        assert!(centers.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn edges_span_the_range() {
        let edges = mel_edges(4, 100.0, 4000.0);
        assert_eq!(edges.len(), 6);
        assert!((edges[0] - 100.0).abs() < 1e-9);
        assert!((edges[5] - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn test_mel_filterbank() {
        let filterbank = MelFilterbank::new(44100.0, 1024, 40, 20.0, 8000.0).unwrap();
        assert_eq!(filterbank.num_mel_bins(), 40);
        assert_eq!(filterbank.num_fft_bins(), 513);

        // Flat spectrum: every band collects some energy
        let mel = filterbank.apply(&vec![1.0; 513]);
        assert_eq!(mel.len(), 40);
        assert!(mel.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn filter_weights_are_triangles() {
        let filterbank = MelFilterbank::new(16000.0, 512, 8, 0.0, 8000.0).unwrap();
        for filter in filterbank.filters() {
            assert!(filter.iter().all(|&w| (0.0..=1.0).contains(&w)));
            let peak = filter.iter().cloned().fold(0.0, f64::max);
            assert!(peak > 0.5, "each filter should approach unity near its center");
        }
    }

    #[test]
    fn degenerate_triangle_is_zero() {
        assert_eq!(triangle_weight(100.0, 100.0, 100.0, 200.0), 0.0);
        assert_eq!(triangle_weight(150.0, 100.0, 150.0, 150.0), 1.0);
        assert_eq!(triangle_weight(150.0, 150.0, 150.0, 150.0), 0.0);
        assert_eq!(triangle_weight(50.0, 100.0, 150.0, 200.0), 0.0);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(MelFilterbank::new(16000.0, 512, 0, 0.0, 8000.0).is_err());
        assert!(MelFilterbank::new(16000.0, 1, 8, 0.0, 8000.0).is_err());
        assert!(MelFilterbank::new(16000.0, 512, 8, 4000.0, 4000.0).is_err());
    }
}
