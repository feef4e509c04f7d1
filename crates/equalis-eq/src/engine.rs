//! The equalizer engine: validation, identity fast path, strategy dispatch
//! and post-processing.

use equalis_analysis::signal::{ensure_finite, peak, sanitize, validate_sample_rate};

use crate::band::Band;
use crate::cache::{CacheStats, SpectrumCache};
use crate::config::EqualizerConfig;
use crate::error::Result;
use crate::mask;
use crate::strategy::{self, Strategy, WorkerPool, select_strategy};

/// Outputs whose peak exceeds this are normalized.
pub const CLIP_THRESHOLD: f64 = 1.0;

/// Peak level after normalization.
pub const NORMALIZED_PEAK: f64 = 0.95;

/// FFT-domain band equalizer.
///
/// Owns its configuration, a bounded [`SpectrumCache`] and the worker pool
/// used by the parallel strategy (built on first use). An `Equalizer` is
/// `Sync`; share it behind an `Arc` to let concurrent callers reuse cached
/// spectra.
///
/// ## Example
///
/// ```rust
/// use equalis_eq::{Band, Equalizer};
///
/// let eq = Equalizer::default();
/// let signal: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.1).sin() * 0.5).collect();
/// let cut = Band::single(0.0, 1000.0, 4000.0).unwrap();
/// let out = eq.process(&signal, 8000.0, &[cut]).unwrap();
/// assert_eq!(out.len(), signal.len());
/// ```
#[derive(Debug)]
pub struct Equalizer {
    config: EqualizerConfig,
    cache: SpectrumCache,
    workers: WorkerPool,
}

impl Equalizer {
    /// Create an equalizer after validating `config`.
    pub fn new(config: EqualizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: EqualizerConfig) -> Self {
        Self {
            cache: SpectrumCache::with_budget(config.cache_capacity, config.cache_max_bytes),
            workers: WorkerPool::new(config.max_workers),
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &EqualizerConfig {
        &self.config
    }

    /// The spectrum cache.
    pub fn cache(&self) -> &SpectrumCache {
        &self.cache
    }

    /// Cache hit/miss counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop all cached spectra.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Strategy [`process`](Self::process) would use for a signal of `len`
    /// samples.
    pub fn strategy_for(&self, len: usize) -> Strategy {
        select_strategy(len, &self.config)
    }

    /// Apply `bands` to `signal`.
    ///
    /// Non-finite samples are replaced with 0. An empty signal yields an
    /// empty output. If no band changes anything (unity gains, or only
    /// degenerate ranges) the sanitized input is returned unchanged.
    /// Otherwise the output has the input's length and is scaled down to a
    /// 0.95 peak if it would exceed 1.0.
    pub fn process(&self, signal: &[f64], sample_rate: f64, bands: &[Band]) -> Result<Vec<f64>> {
        validate_sample_rate(sample_rate)?;
        if signal.is_empty() {
            return Ok(Vec::new());
        }

        let (clean, _) = sanitize(signal);
        if mask::is_identity(bands, sample_rate / 2.0) {
            tracing::debug!(len = clean.len(), "no effective bands, returning input");
            return Ok(clean);
        }

        let strategy = self.strategy_for(clean.len());
        self.run(strategy, &clean, sample_rate, bands)
    }

    /// Like [`process`](Self::process) but with a fixed strategy and no
    /// identity fast path.
    pub fn process_with_strategy(
        &self,
        signal: &[f64],
        sample_rate: f64,
        bands: &[Band],
        strategy: Strategy,
    ) -> Result<Vec<f64>> {
        validate_sample_rate(sample_rate)?;
        if signal.is_empty() {
            return Ok(Vec::new());
        }
        let (clean, _) = sanitize(signal);
        self.run(strategy, &clean, sample_rate, bands)
    }

    fn run(
        &self,
        strategy: Strategy,
        signal: &[f64],
        sample_rate: f64,
        bands: &[Band],
    ) -> Result<Vec<f64>> {
        tracing::debug!(
            len = signal.len(),
            sample_rate,
            bands = bands.len(),
            %strategy,
            "equalizing"
        );
        let mut out = strategy::run(
            strategy,
            signal,
            sample_rate,
            bands,
            &self.config,
            &self.cache,
            &self.workers,
        )?;
        out.resize(signal.len(), 0.0);
        normalize_peak(&mut out);
        ensure_finite(&out, "equalizer output")?;
        Ok(out)
    }
}

impl Default for Equalizer {
    fn default() -> Self {
        Self::from_valid(EqualizerConfig::default())
    }
}

/// Scale `signal` so its peak is [`NORMALIZED_PEAK`] if the peak exceeds
/// [`CLIP_THRESHOLD`]. Returns the applied scale factor.
pub fn normalize_peak(signal: &mut [f64]) -> f64 {
    let max = peak(signal);
    if max <= CLIP_THRESHOLD {
        return 1.0;
    }
    let scale = NORMALIZED_PEAK / max;
    for s in signal.iter_mut() {
        *s *= scale;
    }
    tracing::debug!(peak = max, scale, "normalized output peak");
    scale
}
