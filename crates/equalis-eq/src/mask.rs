//! Per-bin gain masks.
//!
//! All three processing strategies and the spectrogram preview share this
//! construction: start at 1.0, then for every band and every surviving
//! range multiply the gain into each bin whose absolute frequency lies in
//! `[min, max]`. Negative (mirrored) bins are matched by `|freq|`, so the
//! filtered spectrum stays conjugate-symmetric.

use equalis_analysis::Complex64;

use crate::band::Band;

/// A band reduced to its gain and clamped, non-degenerate ranges.
#[derive(Debug, Clone)]
struct ResolvedBand {
    gain: f64,
    ranges: Vec<(f64, f64)>,
}

fn resolve(bands: &[Band], nyquist: f64) -> Vec<ResolvedBand> {
    bands
        .iter()
        .filter(|band| !band.is_unity())
        .map(|band| ResolvedBand {
            gain: band.gain(),
            ranges: band.ranges().iter().filter_map(|r| r.clamped(nyquist)).collect(),
        })
        .filter(|band| !band.ranges.is_empty())
        .collect()
}

fn combined_gain(resolved: &[ResolvedBand], freq_hz: f64) -> f64 {
    let f = freq_hz.abs();
    resolved.iter().fold(1.0, |acc, band| {
        let hits = band.ranges.iter().filter(|(lo, hi)| *lo <= f && f <= *hi).count();
        // A bin inside two ranges of the same band gets the gain twice.
        acc * band.gain.powi(hits as i32)
    })
}

/// True if no band would change any bin at this Nyquist frequency.
pub fn is_identity(bands: &[Band], nyquist: f64) -> bool {
    !bands.iter().any(|band| band.is_effective(nyquist))
}

/// Product of the gains of all bands covering `freq_hz`.
pub fn gain_at(bands: &[Band], nyquist: f64, freq_hz: f64) -> f64 {
    combined_gain(&resolve(bands, nyquist), freq_hz)
}

/// Linear gain per FFT bin.
#[derive(Debug, Clone, PartialEq)]
pub struct GainMask {
    gains: Vec<f64>,
}

impl GainMask {
    /// A mask of `len` ones.
    pub fn identity(len: usize) -> Self {
        Self { gains: vec![1.0; len] }
    }

    /// Build the mask for FFT bin frequencies `freqs` (as produced by
    /// `frequency_bins`, negative half included).
    pub fn build(freqs: &[f64], nyquist: f64, bands: &[Band]) -> Self {
        let resolved = resolve(bands, nyquist);
        if resolved.is_empty() {
            return Self::identity(freqs.len());
        }
        Self {
            gains: freqs.iter().map(|&f| combined_gain(&resolved, f)).collect(),
        }
    }

    /// Multiply each bin by its gain.
    pub fn apply(&self, spectrum: &mut [Complex64]) {
        debug_assert_eq!(spectrum.len(), self.gains.len());
        for (bin, &g) in spectrum.iter_mut().zip(&self.gains) {
            *bin *= g;
        }
    }

    /// Per-bin gains.
    pub fn gains(&self) -> &[f64] {
        &self.gains
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    /// True if the mask has no bins.
    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// True if every entry is exactly 1.0.
    pub fn is_identity(&self) -> bool {
        self.gains.iter().all(|&g| g == 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::FrequencyRange;
    use equalis_analysis::frequency_bins;

    fn freqs() -> Vec<f64> {
        // 16 bins at 16 Hz: spacing 1 Hz, Nyquist 8 Hz.
        frequency_bins(16, 1.0 / 16.0)
    }

    #[test]
    fn no_bands_is_identity() {
        let mask = GainMask::build(&freqs(), 8.0, &[]);
        assert!(mask.is_identity());
        assert_eq!(mask.len(), 16);
    }

    #[test]
    fn covers_both_halves() {
        let band = Band::single(0.5, 2.0, 3.0).unwrap();
        let mask = GainMask::build(&freqs(), 8.0, &[band]);
        let g = mask.gains();
        // +2, +3 and the mirrored -3, -2 (indices 13, 14).
        for i in [2, 3, 13, 14] {
            assert_eq!(g[i], 0.5, "bin {i}");
        }
        for i in [0, 1, 4, 12, 15] {
            assert_eq!(g[i], 1.0, "bin {i}");
        }
    }

    #[test]
    fn overlapping_bands_compound() {
        let a = Band::single(0.5, 0.0, 4.0).unwrap();
        let b = Band::single(4.0, 3.0, 8.0).unwrap();
        let mask = GainMask::build(&freqs(), 8.0, &[a, b]);
        assert_eq!(mask.gains()[1], 0.5);
        assert_eq!(mask.gains()[3], 2.0);
        assert_eq!(mask.gains()[6], 4.0);
        // Nyquist bin reports -8 Hz and is matched by |f|.
        assert_eq!(mask.gains()[8], 4.0);
    }

    #[test]
    fn degenerate_ranges_skipped() {
        let band = Band::new(
            0.0,
            [FrequencyRange::new(5.0, 2.0), FrequencyRange::new(20.0, 30.0)],
        )
        .unwrap();
        assert!(GainMask::build(&freqs(), 8.0, &[band.clone()]).is_identity());
        assert!(is_identity(&[band], 8.0));
    }

    #[test]
    fn range_clamped_below_zero() {
        let band = Band::single(0.0, -100.0, 1.0).unwrap();
        let mask = GainMask::build(&freqs(), 8.0, &[band]);
        assert_eq!(mask.gains()[0], 0.0);
        assert_eq!(mask.gains()[1], 0.0);
        assert_eq!(mask.gains()[15], 0.0);
        assert_eq!(mask.gains()[2], 1.0);
    }

    #[test]
    fn apply_scales_bins() {
        let band = Band::single(0.0, 1.0, 1.0 + 1e-9).unwrap();
        let mask = GainMask::build(&freqs(), 8.0, &[band]);
        let mut spectrum = vec![Complex64::new(1.0, 1.0); 16];
        mask.apply(&mut spectrum);
        assert_eq!(spectrum[1], Complex64::new(0.0, 0.0));
        assert_eq!(spectrum[15], Complex64::new(0.0, 0.0));
        assert_eq!(spectrum[2], Complex64::new(1.0, 1.0));
    }

    #[test]
    fn gain_at_matches_mask() {
        let bands = [Band::single(0.5, 100.0, 200.0).unwrap(), Band::single(3.0, 150.0, 300.0).unwrap()];
        assert_eq!(gain_at(&bands, 1000.0, 120.0), 0.5);
        assert_eq!(gain_at(&bands, 1000.0, 175.0), 1.5);
        assert_eq!(gain_at(&bands, 1000.0, -250.0), 3.0);
        assert_eq!(gain_at(&bands, 1000.0, 500.0), 1.0);
    }
}
