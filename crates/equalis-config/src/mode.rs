//! Equalizer modes: named sets of labelled bands with gain sliders.

use serde::{Deserialize, Serialize};

use equalis_eq::{Band, FrequencyRange};

use crate::error::ConfigError;

/// One slider of a mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeBand {
    /// Display label.
    pub label: String,
    /// `[[min_hz, max_hz], ...]`
    pub ranges: Vec<[f64; 2]>,
    /// Initial gain.
    #[serde(default = "default_gain")]
    pub gain: f64,
    /// Lowest gain the slider allows.
    #[serde(default)]
    pub min_gain: f64,
    /// Highest gain the slider allows.
    #[serde(default = "default_max_gain")]
    pub max_gain: f64,
}

fn default_gain() -> f64 {
    1.0
}

fn default_max_gain() -> f64 {
    2.0
}

impl ModeBand {
    fn to_band(&self, gain: f64) -> Result<Band, equalis_eq::Error> {
        let ranges = self.ranges.iter().map(|[lo, hi]| FrequencyRange::new(*lo, *hi));
        Ok(Band::new(gain, ranges)?.with_label(self.label.clone()))
    }
}

/// A named band layout.
///
/// # TOML Format
///
/// ```toml
/// name = "Musical"
/// description = "Instrument ranges"
///
/// [[bands]]
/// label = "Drums"
/// ranges = [[50.0, 200.0], [2000.0, 5000.0]]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    /// Name of the mode.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sliders in display order.
    #[serde(default)]
    pub bands: Vec<ModeBand>,
}

impl Mode {
    /// Parse a mode from TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of sliders.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// True if the mode has no sliders.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Bands at their initial gains.
    pub fn bands(&self) -> Result<Vec<Band>, ConfigError> {
        self.bands
            .iter()
            .map(|b| b.to_band(b.gain).map_err(ConfigError::from))
            .collect()
    }

    /// Bands with `gains` assigned in slider order.
    ///
    /// Exactly one gain per slider is required, each within the slider's
    /// `[min_gain, max_gain]`.
    pub fn with_gains(&self, gains: &[f64]) -> Result<Vec<Band>, ConfigError> {
        if gains.len() != self.bands.len() {
            return Err(ConfigError::invalid_gains(
                &self.name,
                format!("expected {} gains, got {}", self.bands.len(), gains.len()),
            ));
        }
        self.bands
            .iter()
            .zip(gains)
            .map(|(band, &gain)| {
                if !(band.min_gain..=band.max_gain).contains(&gain) {
                    return Err(ConfigError::invalid_gains(
                        &self.name,
                        format!(
                            "gain {gain} for '{}' is outside [{}, {}]",
                            band.label, band.min_gain, band.max_gain
                        ),
                    ));
                }
                Ok(band.to_band(gain)?)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BANDS: &str = r#"
        name = "Test"

        [[bands]]
        label = "Low"
        ranges = [[20.0, 200.0]]

        [[bands]]
        label = "Split"
        ranges = [[300.0, 400.0], [1000.0, 2000.0]]
        gain = 0.5
        max_gain = 4.0
    "#;

    #[test]
    fn defaults_fill_in() {
        let mode = Mode::from_toml(TWO_BANDS).unwrap();
        assert_eq!(mode.len(), 2);
        assert_eq!(mode.bands[0].gain, 1.0);
        assert_eq!(mode.bands[0].min_gain, 0.0);
        assert_eq!(mode.bands[0].max_gain, 2.0);
        assert_eq!(mode.bands[1].max_gain, 4.0);
    }

    #[test]
    fn initial_bands_keep_labels_and_ranges() {
        let bands = Mode::from_toml(TWO_BANDS).unwrap().bands().unwrap();
        assert_eq!(bands[1].label(), Some("Split"));
        assert_eq!(bands[1].gain(), 0.5);
        assert_eq!(bands[1].ranges().len(), 2);
        assert!(bands[0].is_unity());
    }

    #[test]
    fn gains_are_positional() {
        let mode = Mode::from_toml(TWO_BANDS).unwrap();
        let bands = mode.with_gains(&[0.0, 3.0]).unwrap();
        assert_eq!(bands[0].gain(), 0.0);
        assert_eq!(bands[1].gain(), 3.0);
    }

    #[test]
    fn wrong_gain_count_rejected() {
        let mode = Mode::from_toml(TWO_BANDS).unwrap();
        let err = mode.with_gains(&[1.0]).unwrap_err();
        assert!(err.to_string().contains("expected 2 gains, got 1"));
    }

    #[test]
    fn out_of_range_gain_rejected() {
        let mode = Mode::from_toml(TWO_BANDS).unwrap();
        assert!(mode.with_gains(&[2.5, 1.0]).is_err());
        assert!(mode.with_gains(&[1.0, -0.1]).is_err());
        assert!(mode.with_gains(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let mode = Mode::from_toml(TWO_BANDS).unwrap();
        let text = mode.to_toml().unwrap();
        assert_eq!(Mode::from_toml(&text).unwrap(), mode);
    }
}
