//! Integration tests for equalis-analysis crate.
//!
//! Tests exercise the public API of the transform, mel, spectrogram and
//! spectrum modules using synthetic signals with known properties. `rustfft`
//! serves as an independent reference transform.

use std::f64::consts::PI;

use equalis_analysis::spectrogram::{SpectrogramParams, compute_spectrogram};
use equalis_analysis::spectrum::compute_fft;
use equalis_analysis::transform::{
    forward_real, forward_transform, frequency_bins, inverse_transform,
};
use equalis_analysis::{Complex64, Window, mel_frequencies};
use rustfft::FftPlanner;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a sine wave at a given frequency and amplitude.
fn sine(freq_hz: f64, sample_rate: f64, num_samples: usize, amplitude: f64) -> Vec<f64> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / sample_rate).sin())
        .collect()
}

/// Deterministic pseudo-random signal in [-1, 1].
fn noise(num_samples: usize, seed: u32) -> Vec<f64> {
    let mut state = seed.max(1);
    (0..num_samples)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as i32 as f64) / (i32::MAX as f64)
        })
        .collect()
}

/// Find the bin index with the maximum magnitude in a complex spectrum.
fn peak_bin(spectrum: &[Complex64]) -> usize {
    spectrum
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
        .map(|(i, _)| i)
        .unwrap()
}

// ===========================================================================
// 1. Transform verification
// ===========================================================================

#[test]
fn fft_matches_reference_implementation() {
    for &n in &[2usize, 4, 64, 1024, 4096] {
        let signal = noise(n, n as u32);
        let ours = forward_real(&signal);

        let mut reference: Vec<Complex64> =
            signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        FftPlanner::<f64>::new().plan_fft_forward(n).process(&mut reference);

        for (k, (a, b)) in ours.bins().iter().zip(&reference).enumerate() {
            assert!(
                (a - b).norm() < 1e-9 * (n as f64),
                "n={n} bin {k}: {a} vs {b}"
            );
        }
    }
}

#[test]
fn fft_of_padded_input_matches_reference_of_padded_input() {
    let signal = noise(1000, 7);
    let ours = forward_real(&signal);
    assert_eq!(ours.len(), 1024);

    let mut reference: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    reference.resize(1024, Complex64::new(0.0, 0.0));
    FftPlanner::<f64>::new().plan_fft_forward(1024).process(&mut reference);

    for (a, b) in ours.bins().iter().zip(&reference) {
        assert!((a - b).norm() < 1e-8);
    }
}

#[test]
fn fft_peak_matches_input_frequency() {
    let sample_rate = 48000.0;
    let fft_size = 8192;
    let freq_hz = 1000.0;

    let frame = forward_real(&sine(freq_hz, sample_rate, fft_size, 1.0));

    let expected_bin = (freq_hz * fft_size as f64 / sample_rate).round() as usize;
    let actual_bin = peak_bin(frame.positive_half());

    assert!(
        (actual_bin as i64 - expected_bin as i64).unsigned_abs() <= 1,
        "Peak bin {actual_bin} should be within 1 of expected bin {expected_bin}"
    );
}

#[test]
fn bin_centered_tone_has_no_leakage() {
    let fft_size = 4096;
    let bin_k = 100;
    let signal = sine(bin_k as f64, fft_size as f64, fft_size, 1.0);
    let frame = forward_real(&signal);

    let peak = frame.bins()[bin_k].norm();
    assert!((peak - fft_size as f64 / 2.0).abs() < 1e-6);
    for (k, c) in frame.positive_half().iter().enumerate() {
        if k != bin_k {
            assert!(c.norm() < 1e-6, "bin {k} leaked {}", c.norm());
        }
    }
}

#[test]
fn roundtrip_recovers_real_signal() {
    for &len in &[3usize, 100, 1000, 4096, 5000] {
        let signal = noise(len, 99);
        let frame = forward_real(&signal);
        let back = frame.inverse_real(len);
        for (a, b) in signal.iter().zip(&back) {
            assert!((a - b).abs() < 1e-9, "len {len}: {a} vs {b}");
        }
    }
}

#[test]
fn roundtrip_recovers_complex_signal() {
    let re = noise(512, 3);
    let im = noise(512, 5);
    let signal: Vec<Complex64> = re.iter().zip(&im).map(|(&r, &i)| Complex64::new(r, i)).collect();
    let back = inverse_transform(forward_transform(&signal).bins());
    for (a, b) in signal.iter().zip(&back) {
        assert!((a - b).norm() < 1e-10);
    }
}

#[test]
fn real_input_is_conjugate_symmetric() {
    let frame = forward_real(&noise(2048, 11));
    let n = frame.len();
    for k in 1..n {
        let a = frame.bins()[k];
        let b = frame.bins()[n - k].conj();
        assert!((a - b).norm() < 1e-9, "bin {k}");
    }
}

#[test]
fn frequency_bins_parity() {
    assert_eq!(
        frequency_bins(8, 1.0),
        vec![0.0, 0.125, 0.25, 0.375, -0.5, -0.375, -0.25, -0.125]
    );

    let odd = frequency_bins(7, 1.0);
    assert!(odd[..4].iter().all(|&f| f >= 0.0));
    assert!(odd[4..].iter().all(|&f| f < 0.0));
    assert!((odd[3] - 3.0 / 7.0).abs() < 1e-15);
    assert!((odd[4] + 3.0 / 7.0).abs() < 1e-15);
}

// ===========================================================================
// 2. Spectrogram
// ===========================================================================

#[test]
fn mel_spectrogram_tracks_a_tone() {
    let sample_rate = 22050.0;
    let signal = sine(2000.0, sample_rate, 22050, 0.8);
    let params = SpectrogramParams::default().with_n_mels(64);
    let spec = compute_spectrogram(&signal, sample_rate, &params).unwrap();

    assert_eq!(spec.freqs, mel_frequencies(64, 0.0, 8000.0));
    let mid = spec.num_frames() / 2;
    let peak = spec.peak_frequency(mid).unwrap();
    assert!((peak - 2000.0).abs() < 200.0, "peak {peak}");
}

#[test]
fn spectrogram_of_two_tones_shows_both() {
    let sample_rate = 16000.0;
    let a = sine(500.0, sample_rate, 16000, 0.5);
    let b = sine(3000.0, sample_rate, 16000, 0.5);
    let signal: Vec<f64> = a.iter().zip(&b).map(|(x, y)| x + y).collect();

    let params = SpectrogramParams::default()
        .with_n_fft(1024)
        .with_mel(false)
        .with_window(Window::Hann);
    let spec = compute_spectrogram(&signal, sample_rate, &params).unwrap();

    let mid = spec.num_frames() / 2;
    let column = spec.frame(mid).unwrap();
    let row_of = |f: f64| (f / (sample_rate / 1024.0)).round() as usize;
    assert!(column[row_of(500.0)] > -6.0);
    assert!(column[row_of(3000.0)] > -6.0);
    assert!(column[row_of(1500.0)] < -40.0);
}

#[test]
fn spectrogram_json_shape() {
    let signal = sine(440.0, 8000.0, 4000, 0.5);
    let params = SpectrogramParams::default().with_n_fft(256).with_n_mels(20);
    let spec = compute_spectrogram(&signal, 8000.0, &params).unwrap();
    let json: serde_json::Value = serde_json::to_value(&spec).unwrap();

    assert_eq!(json["y"].as_array().unwrap().len(), 20);
    assert_eq!(json["z"].as_array().unwrap().len(), 20);
    assert_eq!(
        json["z"][0].as_array().unwrap().len(),
        json["x"].as_array().unwrap().len()
    );
}

// ===========================================================================
// 3. Spectrum summary
// ===========================================================================

#[test]
fn compute_fft_reports_tone_magnitude() {
    let sample_rate = 4096.0;
    let summary = compute_fft(&sine(256.0, sample_rate, 4096, 1.0), sample_rate).unwrap();
    let bin = summary.nearest_bin(256.0).unwrap();
    assert!((summary.magnitudes[bin] - 2048.0).abs() < 1e-6);
    assert!((summary.phases[bin] + PI / 2.0).abs() < 1e-6, "sine has -90° phase");
}
