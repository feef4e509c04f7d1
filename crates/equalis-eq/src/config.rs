//! Tunable equalizer settings: strategy thresholds, chunk layouts, worker
//! ceiling and cache capacity.

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_MAX_BYTES;
use crate::error::{Error, Result};

/// Smallest chunk a Hann overlap-add layout accepts.
pub const MIN_CHUNK_SIZE: usize = 16;

/// Overlap must cover at least `1 / MIN_OVERLAP_DIVISOR` of a chunk.
pub const MIN_OVERLAP_DIVISOR: usize = 4;

/// Frame size and overlap for chunked overlap-add processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkLayout {
    /// Samples per chunk. Rounded up to a power of two when used.
    pub chunk_size: usize,
    /// Samples shared by consecutive chunks.
    pub overlap: usize,
}

impl ChunkLayout {
    /// Create a layout.
    pub const fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }

    /// The layout actually used: chunk size rounded up to a power of two.
    pub fn normalized(&self) -> Self {
        Self {
            chunk_size: self.chunk_size.max(1).next_power_of_two(),
            overlap: self.overlap,
        }
    }

    /// Distance between chunk starts.
    pub fn hop(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Hann windows vanish at both chunk edges, so every sample must also
    /// fall well inside a neighbouring chunk. A quarter-chunk overlap keeps
    /// the summed window power bounded away from zero everywhere.
    fn validate(&self, name: &str) -> Result<()> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(Error::InvalidConfig(format!(
                "{name}.chunk_size must be at least {MIN_CHUNK_SIZE} (got {})",
                self.chunk_size
            )));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "{name}.overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        if self.overlap * MIN_OVERLAP_DIVISOR < self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "{name}.overlap ({}) must be at least a quarter of chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Equalizer configuration.
///
/// Missing fields deserialize to their defaults, so a partial TOML table is
/// valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualizerConfig {
    /// Signals shorter than this use the direct strategy.
    pub direct_max_len: usize,
    /// Signals shorter than this (and not direct) use the chunked strategy.
    pub chunked_max_len: usize,
    /// Layout for the sequential chunked strategy.
    pub chunked: ChunkLayout,
    /// Layout for the parallel chunked strategy.
    pub parallel: ChunkLayout,
    /// Upper bound on parallel workers.
    pub max_workers: usize,
    /// Spectrum cache entries; 0 disables caching.
    pub cache_capacity: usize,
    /// Upper bound on the bytes held by the spectrum cache.
    ///
    /// An entry holds a copy of the signal (8 bytes per sample) and 16 bytes
    /// per complex bin: about `8 * len + 24 * len.next_power_of_two()` for a
    /// whole-signal spectrum and `8 * len + 16 * chunks * chunk_size` when
    /// chunked. Entries larger than the budget are never stored.
    pub cache_max_bytes: usize,
}

impl Default for EqualizerConfig {
    fn default() -> Self {
        Self {
            direct_max_len: 16384,
            chunked_max_len: 100_000,
            chunked: ChunkLayout::new(16384, 4096),
            parallel: ChunkLayout::new(32768, 8192),
            max_workers: 4,
            cache_capacity: 8,
            cache_max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl EqualizerConfig {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.direct_max_len > self.chunked_max_len {
            return Err(Error::InvalidConfig(format!(
                "direct_max_len ({}) exceeds chunked_max_len ({})",
                self.direct_max_len, self.chunked_max_len
            )));
        }
        if self.max_workers == 0 {
            return Err(Error::InvalidConfig("max_workers must be at least 1".into()));
        }
        self.chunked.normalized().validate("chunked")?;
        self.parallel.normalized().validate("parallel")?;
        Ok(())
    }

    /// Builder: set the cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Builder: set the cache byte budget.
    pub fn with_cache_max_bytes(mut self, max_bytes: usize) -> Self {
        self.cache_max_bytes = max_bytes;
        self
    }

    /// Builder: set the worker ceiling.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Builder: set both strategy thresholds.
    pub fn with_thresholds(mut self, direct_max_len: usize, chunked_max_len: usize) -> Self {
        self.direct_max_len = direct_max_len;
        self.chunked_max_len = chunked_max_len;
        self
    }

    /// Builder: set both chunk layouts.
    pub fn with_layouts(mut self, chunked: ChunkLayout, parallel: ChunkLayout) -> Self {
        self.chunked = chunked;
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        EqualizerConfig::default().validate().unwrap();
    }

    #[test]
    fn rounds_chunk_size_up() {
        let layout = ChunkLayout::new(1000, 200).normalized();
        assert_eq!(layout.chunk_size, 1024);
        assert_eq!(layout.hop(), 824);
    }

    #[test]
    fn rejects_inconsistent_values() {
        let cfg = EqualizerConfig::default().with_thresholds(200_000, 100_000);
        assert!(cfg.validate().is_err());

        let cfg = EqualizerConfig::default().with_max_workers(0);
        assert!(cfg.validate().is_err());

        let cfg = EqualizerConfig::default()
            .with_layouts(ChunkLayout::new(1024, 1024), ChunkLayout::new(2048, 512));
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("chunked.overlap"));
    }

    #[test]
    fn rejects_overlap_below_a_quarter_chunk() {
        for overlap in [0, 1, 2, 255] {
            let cfg = EqualizerConfig::default()
                .with_layouts(ChunkLayout::new(1024, overlap), ChunkLayout::new(2048, 512));
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains("chunked.overlap"), "{err}");
        }
        let cfg = EqualizerConfig::default()
            .with_layouts(ChunkLayout::new(1024, 256), ChunkLayout::new(2048, 511));
        assert!(cfg.validate().unwrap_err().to_string().contains("parallel.overlap"));

        let cfg = EqualizerConfig::default()
            .with_layouts(ChunkLayout::new(1024, 256), ChunkLayout::new(2048, 512));
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_tiny_chunks() {
        let cfg = EqualizerConfig::default()
            .with_layouts(ChunkLayout::new(8, 4), ChunkLayout::new(2048, 512));
        assert!(cfg.validate().unwrap_err().to_string().contains("chunked.chunk_size"));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: EqualizerConfig = serde_json::from_str(r#"{"max_workers": 2}"#).unwrap();
        assert_eq!(cfg.max_workers, 2);
        assert_eq!(cfg.direct_max_len, 16384);
        assert_eq!(cfg.parallel, ChunkLayout::new(32768, 8192));
    }
}
