//! Equalizer bands: a linear gain applied over one or more frequency ranges.
//!
//! [`BandSpec`] is the wire shape (`{"gain": 0.5, "freqRanges": [[100, 200]]}`)
//! and accepts anything JSON can express. [`Band`] is the validated form the
//! engine works with.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Gains within this distance of 1.0 are treated as unity.
pub const UNITY_TOLERANCE: f64 = 1e-6;

/// A closed frequency interval `[min_hz, max_hz]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    /// Lower edge in Hz.
    pub min_hz: f64,
    /// Upper edge in Hz.
    pub max_hz: f64,
}

impl FrequencyRange {
    /// Create a range. No ordering is enforced; see [`clamped`](Self::clamped).
    pub const fn new(min_hz: f64, max_hz: f64) -> Self {
        Self { min_hz, max_hz }
    }

    /// Clamp to `[0, nyquist]`.
    ///
    /// Returns `None` when the clamped range is empty (`min >= max`), which
    /// covers inverted ranges such as `[100, 50]`.
    pub fn clamped(&self, nyquist: f64) -> Option<(f64, f64)> {
        let lo = self.min_hz.max(0.0);
        let hi = self.max_hz.min(nyquist);
        (lo < hi).then_some((lo, hi))
    }
}

/// A validated equalizer band.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    gain: f64,
    ranges: Vec<FrequencyRange>,
    label: Option<String>,
}

impl Band {
    /// Create a band with a linear gain over `ranges`.
    ///
    /// The gain must be finite and non-negative; range edges must be finite.
    pub fn new(gain: f64, ranges: impl IntoIterator<Item = FrequencyRange>) -> Result<Self> {
        let band = Self {
            gain,
            ranges: ranges.into_iter().collect(),
            label: None,
        };
        band.check(0)?;
        Ok(band)
    }

    /// Band over a single range.
    pub fn single(gain: f64, min_hz: f64, max_hz: f64) -> Result<Self> {
        Self::new(gain, [FrequencyRange::new(min_hz, max_hz)])
    }

    /// Attach a human-readable label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Linear gain factor.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Frequency ranges the gain applies to.
    pub fn ranges(&self) -> &[FrequencyRange] {
        &self.ranges
    }

    /// Optional label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// True if the gain is 1.0 within [`UNITY_TOLERANCE`].
    pub fn is_unity(&self) -> bool {
        (self.gain - 1.0).abs() <= UNITY_TOLERANCE
    }

    /// True if this band changes any bin at the given Nyquist frequency.
    pub fn is_effective(&self, nyquist: f64) -> bool {
        !self.is_unity() && self.ranges.iter().any(|r| r.clamped(nyquist).is_some())
    }

    /// Validate a wire-format band. `index` is reported in errors.
    pub fn from_spec(spec: &BandSpec, index: usize) -> Result<Self> {
        let ranges = spec
            .freq_ranges
            .iter()
            .enumerate()
            .map(|(i, pair)| match pair.as_slice() {
                [min, max] => Ok(FrequencyRange::new(*min, *max)),
                other => Err(Error::invalid_band(
                    index,
                    format!("range {i} must have 2 elements, got {}", other.len()),
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        let band = Self {
            gain: spec.gain,
            ranges,
            label: spec.label.clone(),
        };
        band.check(index)?;
        Ok(band)
    }

    /// Convert back to the wire format.
    pub fn to_spec(&self) -> BandSpec {
        BandSpec {
            gain: self.gain,
            freq_ranges: self.ranges.iter().map(|r| vec![r.min_hz, r.max_hz]).collect(),
            label: self.label.clone(),
        }
    }

    fn check(&self, index: usize) -> Result<()> {
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(Error::invalid_band(
                index,
                format!("gain must be finite and non-negative, got {}", self.gain),
            ));
        }
        if let Some((i, _)) = self
            .ranges
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.min_hz.is_finite() && r.max_hz.is_finite()))
        {
            return Err(Error::invalid_band(index, format!("range {i} is not finite")));
        }
        Ok(())
    }
}

/// Wire format of a band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandSpec {
    /// Linear gain factor.
    pub gain: f64,
    /// `[[minHz, maxHz], ...]`
    pub freq_ranges: Vec<Vec<f64>>,
    /// Optional label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Validate a list of wire-format bands, preserving order.
pub fn parse_bands(specs: &[BandSpec]) -> Result<Vec<Band>> {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| Band::from_spec(spec, index))
        .collect()
}
