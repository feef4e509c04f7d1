//! Approximate the effect of a band set on an existing spectrogram without
//! running the equalizer.
//!
//! Each frequency row is shifted by `20·log10(g)`, where `g` is the combined
//! gain of the bands covering the row's frequency (same clamping rules as the
//! gain mask). Results are clipped back into `[floor, 0]`, with `floor` the
//! smallest value of the input spectrogram, so a zero gain maps a row to the
//! floor.

use equalis_analysis::Spectrogram;
use equalis_analysis::signal::validate_sample_rate;

use crate::band::Band;
use crate::error::Result;
use crate::mask;

/// Apply `bands` to a dB spectrogram computed at `sample_rate`.
pub fn preview_spectrogram(
    spectrogram: &Spectrogram,
    sample_rate: f64,
    bands: &[Band],
) -> Result<Spectrogram> {
    validate_sample_rate(sample_rate)?;
    let nyquist = sample_rate / 2.0;
    if mask::is_identity(bands, nyquist) {
        return Ok(spectrogram.clone());
    }

    let (floor, _) = spectrogram.range();
    let mut preview = spectrogram.clone();
    for (row, &freq) in preview.db.iter_mut().zip(&spectrogram.freqs) {
        let gain = mask::gain_at(bands, nyquist, freq);
        if gain == 1.0 {
            continue;
        }
        let offset = if gain > 0.0 { 20.0 * gain.log10() } else { f64::NEG_INFINITY };
        for v in row.iter_mut() {
            *v = (*v + offset).clamp(floor, 0.0);
        }
    }
    Ok(preview)
}
