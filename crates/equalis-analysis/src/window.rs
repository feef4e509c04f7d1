//! Window functions for STFT framing and overlap-add chunking.
//!
//! All windows are symmetric: the denominator is `L - 1`, so the first and
//! last Hann coefficients are exactly zero. A window of length 1 is `[1.0]`.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    #[default]
    Hann,
    /// Hamming window
    Hamming,
}

impl Window {
    /// Coefficient `n` of a window of length `len`.
    #[inline]
    pub fn coefficient(&self, n: usize, len: usize) -> f64 {
        if len <= 1 {
            return 1.0;
        }
        let phase = 2.0 * PI * n as f64 / (len - 1) as f64;
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5 * (1.0 - phase.cos()),
            Window::Hamming => 0.54 - 0.46 * phase.cos(),
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, len: usize) -> Vec<f64> {
        (0..len).map(|n| self.coefficient(n, len)).collect()
    }

    /// Apply window to a buffer
    pub fn apply(&self, buffer: &mut [f64]) {
        if matches!(self, Window::Rectangular) {
            return;
        }
        let len = buffer.len();
        for (n, sample) in buffer.iter_mut().enumerate() {
            *sample *= self.coefficient(n, len);
        }
    }

    /// Lowercase name used in configs and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Window::Rectangular => "rectangular",
            Window::Hann => "hann",
            Window::Hamming => "hamming",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hann" | "hanning" => Ok(Window::Hann),
            "hamming" => Ok(Window::Hamming),
            "rectangular" | "rect" | "none" => Ok(Window::Rectangular),
            other => Err(format!(
                "unknown window '{other}' (expected hann, hamming or rectangular)"
            )),
        }
    }
}
