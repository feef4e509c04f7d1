//! Synthetic test signals: sums of sine/cosine partials normalized to a
//! headroom peak.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::signal::{peak, validate_sample_rate};

/// Phase of a partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialShape {
    /// `sin(ωt)`
    #[default]
    Sine,
    /// `cos(ωt)`
    Cosine,
}

/// One sinusoidal component of a test signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partial {
    /// Frequency in Hz.
    pub freq_hz: f64,
    /// Linear amplitude before normalization.
    pub amplitude: f64,
    /// Sine or cosine phase.
    #[serde(default)]
    pub shape: PartialShape,
}

impl Partial {
    /// A sine partial.
    pub const fn sine(freq_hz: f64, amplitude: f64) -> Self {
        Self { freq_hz, amplitude, shape: PartialShape::Sine }
    }

    /// A cosine partial.
    pub const fn cosine(freq_hz: f64, amplitude: f64) -> Self {
        Self { freq_hz, amplitude, shape: PartialShape::Cosine }
    }

    #[inline]
    fn value(&self, t: f64) -> f64 {
        let phase = 2.0 * PI * self.freq_hz * t;
        match self.shape {
            PartialShape::Sine => self.amplitude * phase.sin(),
            PartialShape::Cosine => self.amplitude * phase.cos(),
        }
    }
}

/// Eight partials spread from 100 Hz to 12 kHz, alternating sine and cosine.
pub const DEFAULT_PARTIALS: [Partial; 8] = [
    Partial::sine(100.0, 1.0),
    Partial::cosine(250.0, 0.8),
    Partial::sine(500.0, 0.9),
    Partial::cosine(1000.0, 1.0),
    Partial::sine(2000.0, 0.7),
    Partial::cosine(4000.0, 0.6),
    Partial::sine(8000.0, 0.5),
    Partial::cosine(12000.0, 0.4),
];

/// Default peak level after normalization.
pub const DEFAULT_HEADROOM: f64 = 0.9;

/// Sum `partials` over `duration_secs` and scale the result so its peak is
/// `headroom`. A silent sum is returned as zeros.
pub fn synthesize(
    partials: &[Partial],
    sample_rate: f64,
    duration_secs: f64,
    headroom: f64,
) -> Result<Vec<f64>> {
    validate_sample_rate(sample_rate)?;
    if !(duration_secs.is_finite() && duration_secs > 0.0) {
        return Err(Error::invalid_parameter(
            "duration",
            format!("must be positive (got {duration_secs})"),
        ));
    }
    if !(headroom > 0.0 && headroom <= 1.0) {
        return Err(Error::invalid_parameter(
            "headroom",
            format!("must be in (0, 1] (got {headroom})"),
        ));
    }

    let num_samples = (sample_rate * duration_secs) as usize;
    let mut signal: Vec<f64> = (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            partials.iter().map(|p| p.value(t)).sum()
        })
        .collect();

    let max = peak(&signal);
    if max > 0.0 {
        let scale = headroom / max;
        for s in &mut signal {
            *s *= scale;
        }
    }
    Ok(signal)
}

/// Sine wave helper for tests and benchmarks.
pub fn sine(freq_hz: f64, amplitude: f64, sample_rate: f64, num_samples: usize) -> Vec<f64> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / sample_rate).sin())
        .collect()
}
