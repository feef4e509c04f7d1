//! Property-based tests for the analysis kernel.
//!
//! Uses proptest to verify invariants over randomized inputs:
//! - IFFT(FFT(x)) recovers x
//! - real input yields a conjugate-symmetric spectrum
//! - mel_to_hz inverts hz_to_mel
//! - windows stay within [0, 1]

use equalis_analysis::transform::{forward_real, frequency_bins};
use equalis_analysis::{Window, hz_to_mel, mel_to_hz};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any real signal survives a forward/inverse round trip.
    #[test]
    fn fft_roundtrip(signal in prop::collection::vec(-1.0f64..=1.0, 1..2048)) {
        let frame = forward_real(&signal);
        let back = frame.inverse_real(signal.len());
        for (a, b) in signal.iter().zip(&back) {
            prop_assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
        }
    }

    /// Bin k and bin N-k are complex conjugates for real input.
    #[test]
    fn conjugate_symmetry(signal in prop::collection::vec(-1.0f64..=1.0, 2..1024)) {
        let frame = forward_real(&signal);
        let n = frame.len();
        for k in 1..n {
            let diff = frame.bins()[k] - frame.bins()[n - k].conj();
            prop_assert!(diff.norm() < 1e-9, "bin {}", k);
        }
    }

    /// Mel conversion is invertible over the audible range and beyond.
    #[test]
    fn mel_inverse(hz in 0.0f64..96000.0) {
        let back = mel_to_hz(hz_to_mel(hz));
        prop_assert!((back - hz).abs() <= 1e-9 * hz.max(1.0), "{} -> {}", hz, back);
    }

    /// Frequency bins: n entries, (n+1)/2 of them non-negative.
    #[test]
    fn frequency_bin_layout(n in 1usize..512, rate in 1.0f64..96000.0) {
        let bins = frequency_bins(n, 1.0 / rate);
        prop_assert_eq!(bins.len(), n);
        prop_assert_eq!(bins.iter().filter(|&&f| f >= 0.0).count(), n.div_ceil(2));
        prop_assert!(bins.iter().all(|f| f.abs() <= rate / 2.0 + 1e-9));
    }

    /// Window coefficients are bounded and symmetric.
    #[test]
    fn window_bounds(len in 1usize..4096, variant in 0usize..3) {
        let window = [Window::Hann, Window::Hamming, Window::Rectangular][variant];
        let coeffs = window.coefficients(len);
        prop_assert_eq!(coeffs.len(), len);
        for i in 0..len {
            prop_assert!((0.0..=1.0 + 1e-12).contains(&coeffs[i]));
            prop_assert!((coeffs[i] - coeffs[len - 1 - i]).abs() < 1e-9);
        }
    }
}
