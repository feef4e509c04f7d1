//! Integration tests for equalis-io.

use equalis_io::{Error, WavSpec, read_wav, write_wav};
use std::f64::consts::PI;
use tempfile::TempDir;

#[test]
fn sine_survives_24_bit_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    let spec = WavSpec { sample_rate: 48000, bits_per_sample: 24, ..Default::default() };
    let samples: Vec<f64> = (0..4800)
        .map(|i| 0.8 * (2.0 * PI * 1000.0 * i as f64 / 48000.0).sin())
        .collect();

    write_wav(&path, &samples, spec).unwrap();
    let (back, read_spec) = read_wav(&path).unwrap();

    assert_eq!(read_spec, spec);
    assert_eq!(back.len(), samples.len());
    let step = 1.0 / f64::from(1u32 << 23);
    for (a, b) in samples.iter().zip(&back) {
        assert!((a - b).abs() <= step, "{a} vs {b}");
    }
}

#[test]
fn missing_file_is_a_wav_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        read_wav(dir.path().join("nope.wav")),
        Err(Error::Wav(_))
    ));
}
