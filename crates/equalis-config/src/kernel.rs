//! Kernel configuration file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use equalis_analysis::SpectrogramParams;
use equalis_eq::{Equalizer, EqualizerConfig};

use crate::error::ConfigError;

/// Settings for the equalizer and spectrogram engines.
///
/// # TOML Format
///
/// ```toml
/// [equalizer]
/// direct_max_len = 16384
/// chunked_max_len = 100000
/// max_workers = 4
/// cache_capacity = 8
/// cache_max_bytes = 268435456
///
/// [equalizer.chunked]
/// chunk_size = 16384
/// overlap = 4096
///
/// [spectrogram]
/// n_fft = 2048
/// hop_length = 512
/// n_mels = 128
/// use_mel = true
/// window = "hann"
/// ```
///
/// Every table and field is optional; omitted values take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Equalizer thresholds, layouts and cache size.
    pub equalizer: EqualizerConfig,
    /// Default spectrogram parameters.
    pub spectrogram: SpectrogramParams,
}

impl KernelConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded kernel config");
        Ok(config)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: KernelConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Check both sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.equalizer.validate()?;
        self.spectrogram.validate()?;
        Ok(())
    }

    /// Build an equalizer from the `[equalizer]` section.
    pub fn build_equalizer(&self) -> Result<Equalizer, ConfigError> {
        Ok(Equalizer::new(self.equalizer.clone())?)
    }
}
