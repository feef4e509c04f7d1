//! Integration tests for equalis-eq.
//!
//! Covers identity, strategy equivalence, degenerate ranges, the two-tone
//! notch example and cache transparency through the public API.

use std::sync::Arc;

use equalis_analysis::signal::rms;
use equalis_analysis::spectrogram::{SpectrogramParams, compute_spectrogram};
use equalis_analysis::spectrum::compute_fft;
use equalis_analysis::synth::sine;
use equalis_eq::{
    Band, BandSpec, Equalizer, EqualizerConfig, Strategy, equalize, preview_spectrogram,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn mix(parts: &[Vec<f64>]) -> Vec<f64> {
    let len = parts.iter().map(Vec::len).max().unwrap_or(0);
    (0..len)
        .map(|i| parts.iter().map(|p| p.get(i).copied().unwrap_or(0.0)).sum())
        .collect()
}

fn two_tones(len: usize, sample_rate: f64) -> Vec<f64> {
    mix(&[
        sine(300.0, 0.4, sample_rate, len),
        sine(3000.0, 0.4, sample_rate, len),
    ])
}

fn relative_rms_diff(reference: &[f64], other: &[f64]) -> f64 {
    assert_eq!(reference.len(), other.len());
    let diff: Vec<f64> = reference.iter().zip(other).map(|(a, b)| a - b).collect();
    rms(&diff) / rms(reference)
}

// ===========================================================================
// Identity
// ===========================================================================

#[test]
fn unity_bands_return_input_exactly_for_every_strategy_length() {
    let eq = Equalizer::default();
    let sample_rate = 44100.0;
    let bands = [
        Band::single(1.0, 0.0, 22050.0).unwrap(),
        Band::single(1.0, 100.0, 200.0).unwrap(),
    ];

    for (len, strategy) in [
        (1000, Strategy::Direct),
        (50_000, Strategy::Chunked),
        (150_000, Strategy::Parallel),
    ] {
        assert_eq!(eq.strategy_for(len), strategy);
        let signal = two_tones(len, sample_rate);

        let out = eq.process(&signal, sample_rate, &bands).unwrap();
        assert_eq!(out, signal, "len {len}");
        let out = eq.process(&signal, sample_rate, &[]).unwrap();
        assert_eq!(out, signal, "len {len}, no bands");
    }
}

#[test]
fn unity_mask_reconstructs_through_each_strategy() {
    let eq = Equalizer::new(EqualizerConfig::default().with_cache_capacity(0)).unwrap();
    let sample_rate = 44100.0;
    let signal = two_tones(40_000, sample_rate);
    let bands = [Band::single(1.0, 0.0, 22050.0).unwrap()];

    for strategy in Strategy::ALL {
        let out = eq
            .process_with_strategy(&signal, sample_rate, &bands, strategy)
            .unwrap();
        assert_eq!(out.len(), signal.len());
        let worst = signal
            .iter()
            .zip(&out)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(worst < 1e-9, "{strategy}: max error {worst}");
    }
}

// ===========================================================================
// Strategy equivalence
// ===========================================================================

#[test]
fn strategies_agree_within_one_percent() {
    let eq = Equalizer::default();
    let sample_rate = 44100.0;
    // Exactly at the parallel threshold.
    let signal = two_tones(eq.config().chunked_max_len, sample_rate);
    let bands = [
        Band::single(0.5, 2000.0, 4000.0).unwrap(),
        Band::single(1.5, 5000.0, 8000.0).unwrap(),
    ];

    let direct = eq
        .process_with_strategy(&signal, sample_rate, &bands, Strategy::Direct)
        .unwrap();
    for strategy in [Strategy::Chunked, Strategy::Parallel] {
        let out = eq
            .process_with_strategy(&signal, sample_rate, &bands, strategy)
            .unwrap();
        let diff = relative_rms_diff(&direct, &out);
        assert!(diff < 0.01, "{strategy} differs from direct by {diff}");
    }
}

#[test]
fn output_length_matches_input_for_odd_lengths() {
    let eq = Equalizer::default();
    let bands = [Band::single(0.5, 1000.0, 2000.0).unwrap()];
    for len in [1, 7, 16_385, 100_001] {
        let signal = sine(440.0, 0.5, 44100.0, len);
        assert_eq!(eq.process(&signal, 44100.0, &bands).unwrap().len(), len);
    }
}

// ===========================================================================
// Degenerate ranges
// ===========================================================================

#[test]
fn inverted_range_is_ignored() {
    let eq = Equalizer::default();
    let signal = two_tones(8000, 16000.0);
    let specs = vec![BandSpec {
        gain: 0.0,
        freq_ranges: vec![vec![100.0, 50.0]],
        label: None,
    }];
    let response = equalize(&eq, &signal, 16000.0, &specs).unwrap();
    assert_eq!(response.output_signal, signal);
}

#[test]
fn inverted_range_does_not_change_other_bands() {
    let eq = Equalizer::default();
    let signal = two_tones(8000, 16000.0);
    let cut = Band::single(0.2, 2500.0, 3500.0).unwrap();
    let noop = Band::single(0.0, 100.0, 50.0).unwrap();

    let with_noop = eq.process(&signal, 16000.0, &[cut.clone(), noop]).unwrap();
    let alone = eq.process(&signal, 16000.0, &[cut]).unwrap();
    assert_eq!(with_noop, alone);
}

// ===========================================================================
// End-to-end notch
// ===========================================================================

#[test]
fn notch_removes_5khz_and_keeps_100hz() {
    let sample_rate = 44100.0;
    let signal = mix(&[
        sine(100.0, 0.5, sample_rate, 44100),
        sine(5000.0, 0.5, sample_rate, 44100),
    ]);
    let eq = Equalizer::default();
    assert_eq!(eq.strategy_for(signal.len()), Strategy::Chunked);

    let specs = vec![BandSpec {
        gain: 0.0,
        freq_ranges: vec![vec![4000.0, 6000.0]],
        label: None,
    }];
    let response = equalize(&eq, &signal, sample_rate, &specs).unwrap();
    assert_eq!(response.sample_rate, sample_rate);
    assert_eq!(response.output_signal.len(), signal.len());

    let before = compute_fft(&signal, sample_rate).unwrap();
    let after = compute_fft(&response.output_signal, sample_rate).unwrap();

    let hi = before.nearest_bin(5000.0).unwrap();
    assert!(
        after.magnitudes[hi] < 0.01 * before.magnitudes[hi],
        "5 kHz: {} -> {}",
        before.magnitudes[hi],
        after.magnitudes[hi]
    );

    let lo = before.nearest_bin(100.0).unwrap();
    let change = (after.magnitudes[lo] - before.magnitudes[lo]).abs() / before.magnitudes[lo];
    assert!(change < 0.05, "100 Hz changed by {change}");
}

// ===========================================================================
// Cache
// ===========================================================================

#[test]
fn cache_never_changes_output() {
    let cached = Equalizer::default();
    let uncached = Equalizer::new(EqualizerConfig::default().with_cache_capacity(0)).unwrap();
    let sample_rate = 44100.0;
    let band_sets = [
        vec![Band::single(0.0, 2000.0, 4000.0).unwrap()],
        vec![Band::single(2.0, 100.0, 500.0).unwrap()],
        vec![
            Band::single(0.5, 0.0, 1000.0).unwrap(),
            Band::single(0.5, 500.0, 5000.0).unwrap(),
        ],
    ];

    for len in [5000, 30_000, 120_000] {
        let signal = two_tones(len, sample_rate);
        for bands in &band_sets {
            let a = cached.process(&signal, sample_rate, bands).unwrap();
            let b = uncached.process(&signal, sample_rate, bands).unwrap();
            assert_eq!(a, b, "len {len}");
        }
    }

    let stats = cached.cache_stats();
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.hits, 6);
    assert_eq!(uncached.cache_stats().hits, 0);
}

#[test]
fn shared_equalizer_across_threads() {
    let eq = Arc::new(Equalizer::default());
    let signal = Arc::new(two_tones(20_000, 44100.0));
    let expected = eq
        .process(&signal, 44100.0, &[Band::single(0.3, 2500.0, 3500.0).unwrap()])
        .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let eq = Arc::clone(&eq);
            let signal = Arc::clone(&signal);
            let expected = &expected;
            scope.spawn(move || {
                let band = Band::single(0.3, 2500.0, 3500.0).unwrap();
                let out = eq.process(&signal, 44100.0, &[band]).unwrap();
                assert_eq!(&out, expected);
            });
        }
    });
}

// ===========================================================================
// Preview
// ===========================================================================

#[test]
fn preview_darkens_cut_rows_only() {
    let sample_rate = 16000.0;
    let signal = two_tones(16000, sample_rate);
    let params = SpectrogramParams::default().with_n_fft(1024).with_mel(false);
    let spec = compute_spectrogram(&signal, sample_rate, &params).unwrap();
    let (floor, _) = spec.range();

    let band = Band::single(0.01, 2500.0, 3500.0).unwrap();
    let preview = preview_spectrogram(&spec, sample_rate, &[band]).unwrap();

    for (row, freq) in spec.freqs.iter().enumerate() {
        let covered = (2500.0..=3500.0).contains(freq);
        for (a, b) in spec.db[row].iter().zip(&preview.db[row]) {
            if covered {
                assert!(*b <= *a && *b >= floor);
            } else {
                assert_eq!(a, b);
            }
        }
    }
}
