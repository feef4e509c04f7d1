//! Input validation and sanitization shared by every kernel entry point.

use crate::error::{Error, Result};

/// Reject sample rates that are zero, negative, or not finite.
pub fn validate_sample_rate(sample_rate: f64) -> Result<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidSampleRate(sample_rate))
    }
}

/// Replace NaN and infinite samples with `0.0`.
///
/// Returns the cleaned signal and the number of replaced samples. The copy is
/// exact for finite input.
pub fn sanitize(signal: &[f64]) -> (Vec<f64>, usize) {
    let mut replaced = 0;
    let cleaned = signal
        .iter()
        .map(|&x| {
            if x.is_finite() {
                x
            } else {
                replaced += 1;
                0.0
            }
        })
        .collect();

    if replaced > 0 {
        tracing::warn!(replaced, len = signal.len(), "replaced non-finite samples with 0");
    }

    (cleaned, replaced)
}

/// Validate a signal/sample-rate pair and return a sanitized copy.
///
/// Empty signals and invalid sample rates are rejected before any work is
/// done.
pub fn prepare(signal: &[f64], sample_rate: f64) -> Result<Vec<f64>> {
    if signal.is_empty() {
        return Err(Error::EmptySignal);
    }
    validate_sample_rate(sample_rate)?;
    Ok(sanitize(signal).0)
}

/// Fail with [`Error::NumericAnomaly`] if any value is not finite.
pub fn ensure_finite(values: &[f64], context: &str) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(Error::NumericAnomaly(format!(
            "{context}: non-finite value at index {index}"
        ))),
        None => Ok(()),
    }
}

/// Peak absolute value of a signal (0.0 for an empty slice).
pub fn peak(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()))
}

/// Root-mean-square level of a signal (0.0 for an empty slice).
pub fn rms(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
}
