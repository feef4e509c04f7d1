//! Bounded LRU cache of forward transforms.
//!
//! Repeated equalization of the same signal with different bands only needs
//! the forward FFT once. Entries are keyed by a cheap [`Fingerprint`] of the
//! signal plus the [`SpectrumLayout`] the spectra were computed with. The
//! fingerprint is only a lookup hint: every hit is compared sample-for-sample
//! against the stored signal, so a collision degrades to a miss.
//!
//! The cache is bounded both by entry count and by an approximate byte
//! budget. Least recently used entries are evicted until both limits hold;
//! an entry that alone exceeds the budget is returned but not stored.
//!
//! Concurrent callers may race to fill the same key. Both compute the same
//! spectra and the second insert simply replaces the first.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use equalis_analysis::SpectralFrame;

use crate::error::Result;

/// Number of leading samples hashed into a fingerprint.
pub const FINGERPRINT_PREFIX: usize = 1024;

/// Number of evenly strided samples hashed into a fingerprint.
pub const FINGERPRINT_STRIDED: usize = 256;

/// Byte budget used by [`SpectrumCache::new`].
pub const DEFAULT_MAX_BYTES: usize = 256 * 1024 * 1024;

/// Hash of a signal's length, sample rate and a bounded sample of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint a signal.
    pub fn of(signal: &[f64], sample_rate: f64) -> Self {
        let mut hasher = DefaultHasher::new();
        signal.len().hash(&mut hasher);
        sample_rate.to_bits().hash(&mut hasher);

        for x in signal.iter().take(FINGERPRINT_PREFIX) {
            x.to_bits().hash(&mut hasher);
        }
        let stride = (signal.len() / FINGERPRINT_STRIDED).max(1);
        for x in signal.iter().step_by(stride) {
            x.to_bits().hash(&mut hasher);
        }
        if let (Some(first), Some(last)) = (signal.first(), signal.last()) {
            first.to_bits().hash(&mut hasher);
            last.to_bits().hash(&mut hasher);
        }

        Self(hasher.finish())
    }

    /// Raw hash value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// How the cached spectra were framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectrumLayout {
    /// One transform of the whole signal.
    Whole,
    /// Hann-windowed overlapping chunks.
    Chunked {
        /// Power-of-two chunk length.
        chunk_size: usize,
        /// Overlap between chunks.
        overlap: usize,
    },
}

/// Forward spectra of one signal.
#[derive(Debug)]
pub struct CachedSpectrum {
    signal: Vec<f64>,
    sample_rate: f64,
    /// One frame for [`SpectrumLayout::Whole`], one per chunk otherwise.
    pub spectra: Vec<SpectralFrame>,
    /// Bin frequencies shared by every frame.
    pub freqs: Vec<f64>,
}

impl CachedSpectrum {
    fn matches(&self, signal: &[f64], sample_rate: f64) -> bool {
        self.sample_rate.to_bits() == sample_rate.to_bits()
            && self.signal.len() == signal.len()
            && self.signal.iter().zip(signal).all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Approximate heap footprint: signal copy, complex bins and bin table.
    pub fn size_bytes(&self) -> usize {
        size_of_val(self.signal.as_slice())
            + self.spectra.iter().map(|frame| size_of_val(frame.bins())).sum::<usize>()
            + size_of_val(self.freqs.as_slice())
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
    /// Entries dropped to stay within capacity or the byte budget.
    pub evictions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: Fingerprint,
    layout: SpectrumLayout,
}

#[derive(Debug)]
struct Slot {
    value: Arc<CachedSpectrum>,
    bytes: usize,
    last_used: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, Slot>,
    bytes: usize,
    clock: u64,
    stats: CacheStats,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(key, _)| *key);
        if let Some(slot) = oldest.and_then(|key| self.entries.remove(&key)) {
            self.bytes -= slot.bytes;
            self.stats.evictions += 1;
        }
    }
}

/// Thread-safe bounded spectrum cache owned by an equalizer.
#[derive(Debug)]
pub struct SpectrumCache {
    capacity: usize,
    max_bytes: usize,
    state: Mutex<CacheState>,
}

impl SpectrumCache {
    /// Create a cache holding at most `capacity` entries (0 disables it)
    /// within [`DEFAULT_MAX_BYTES`].
    pub fn new(capacity: usize) -> Self {
        Self::with_budget(capacity, DEFAULT_MAX_BYTES)
    }

    /// Create a cache bounded by `capacity` entries and `max_bytes`.
    pub fn with_budget(capacity: usize, max_bytes: usize) -> Self {
        Self {
            capacity,
            max_bytes,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Byte budget.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Approximate bytes currently held.
    pub fn bytes(&self) -> usize {
        self.state.lock().bytes
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.bytes = 0;
    }

    /// Return the spectra for `signal` under `layout`, computing them with
    /// `compute` on a miss.
    ///
    /// `compute` runs without the lock held and returns `(spectra, freqs)`.
    pub fn get_or_compute<F>(
        &self,
        signal: &[f64],
        sample_rate: f64,
        layout: SpectrumLayout,
        compute: F,
    ) -> Result<Arc<CachedSpectrum>>
    where
        F: FnOnce() -> Result<(Vec<SpectralFrame>, Vec<f64>)>,
    {
        if self.capacity == 0 {
            let (spectra, freqs) = compute()?;
            return Ok(Arc::new(CachedSpectrum {
                signal: Vec::new(),
                sample_rate,
                spectra,
                freqs,
            }));
        }

        let key = CacheKey {
            fingerprint: Fingerprint::of(signal, sample_rate),
            layout,
        };

        {
            let mut state = self.state.lock();
            let now = state.tick();
            let hit = match state.entries.get_mut(&key) {
                Some(slot) if slot.value.matches(signal, sample_rate) => {
                    slot.last_used = now;
                    Some(Arc::clone(&slot.value))
                }
                _ => None,
            };
            match hit {
                Some(value) => {
                    state.stats.hits += 1;
                    tracing::debug!(fingerprint = key.fingerprint.value(), ?layout, "spectrum cache hit");
                    return Ok(value);
                }
                None => state.stats.misses += 1,
            }
        }

        tracing::debug!(fingerprint = key.fingerprint.value(), ?layout, "spectrum cache miss");
        let (spectra, freqs) = compute()?;
        let value = Arc::new(CachedSpectrum {
            signal: signal.to_vec(),
            sample_rate,
            spectra,
            freqs,
        });

        let bytes = value.size_bytes();
        if bytes > self.max_bytes {
            tracing::debug!(bytes, max_bytes = self.max_bytes, "spectrum exceeds cache budget, not stored");
            return Ok(value);
        }

        let mut state = self.state.lock();
        let now = state.tick();
        if let Some(previous) = state.entries.remove(&key) {
            state.bytes -= previous.bytes;
        }
        while !state.entries.is_empty()
            && (state.entries.len() >= self.capacity || state.bytes + bytes > self.max_bytes)
        {
            state.evict_lru();
        }
        state.entries.insert(
            key,
            Slot {
                value: Arc::clone(&value),
                bytes,
                last_used: now,
            },
        );
        state.bytes += bytes;
        Ok(value)
    }
}

impl Default for SpectrumCache {
    fn default() -> Self {
        Self::new(8)
    }
}
