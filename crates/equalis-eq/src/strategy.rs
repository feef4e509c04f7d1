//! The three processing strategies and their dispatch.
//!
//! Every strategy takes a sanitized signal and a band list and returns the
//! filtered signal at the same length, before peak normalization. They all
//! build their gain mask with [`GainMask::build`]; only the framing and the
//! execution model differ.
//!
//! - [`Strategy::Direct`]: one FFT over the whole signal.
//! - [`Strategy::Chunked`]: Hann-windowed overlap-add, sequential.
//! - [`Strategy::Parallel`]: the same overlap-add with chunk transforms
//!   spread over a bounded rayon pool. Overlap-add itself stays sequential.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::OnceLock;

use equalis_analysis::signal::ensure_finite;
use equalis_analysis::{SpectralFrame, Window, forward_real, frequency_bins};

use crate::band::Band;
use crate::cache::{SpectrumCache, SpectrumLayout};
use crate::config::{ChunkLayout, EqualizerConfig};
use crate::error::{Error, Result};
use crate::mask::GainMask;

/// Window-power entries below this are treated as 1 during normalization.
pub const NORM_FLOOR: f64 = 1e-8;

/// Processing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single whole-signal transform.
    Direct,
    /// Sequential overlap-add.
    Chunked,
    /// Overlap-add with parallel chunk transforms.
    Parallel,
}

impl Strategy {
    /// All strategies, cheapest first.
    pub const ALL: [Strategy; 3] = [Strategy::Direct, Strategy::Chunked, Strategy::Parallel];

    /// Lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Chunked => "chunked",
            Strategy::Parallel => "parallel",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Strategy::Direct),
            "chunked" => Ok(Strategy::Chunked),
            "parallel" => Ok(Strategy::Parallel),
            other => Err(Error::InvalidConfig(format!("unknown strategy '{other}'"))),
        }
    }
}

/// Pick a strategy from the signal length alone.
pub fn select_strategy(len: usize, config: &EqualizerConfig) -> Strategy {
    if len < config.direct_max_len {
        Strategy::Direct
    } else if len < config.chunked_max_len {
        Strategy::Chunked
    } else {
        Strategy::Parallel
    }
}

/// Lazily built rayon pool of `min(available_parallelism, max_workers)`
/// threads, shared by every parallel run of one equalizer.
///
/// A failed build is remembered, so later runs go straight to the
/// sequential path.
#[derive(Debug)]
pub(crate) struct WorkerPool {
    max_workers: usize,
    pool: OnceLock<Option<rayon::ThreadPool>>,
}

impl WorkerPool {
    pub(crate) fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            pool: OnceLock::new(),
        }
    }

    pub(crate) fn get(&self) -> Option<&rayon::ThreadPool> {
        self.pool
            .get_or_init(|| {
                let available = std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1);
                let workers = available.min(self.max_workers).max(1);
                match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                    Ok(pool) => {
                        tracing::debug!(workers, "built equalizer worker pool");
                        Some(pool)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "could not build worker pool, processing sequentially");
                        None
                    }
                }
            })
            .as_ref()
    }
}

/// How chunk work is executed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Dispatch<'a> {
    Sequential,
    Parallel(&'a WorkerPool),
}

/// Map `f` over `0..count`.
///
/// In parallel mode the map runs on the shared worker pool, so at most
/// `min(available_parallelism, count, max_workers)` calls run at once. If no
/// pool is available or any call fails, all parallel results are discarded
/// and the whole map is re-run sequentially.
pub(crate) fn map_chunks<T, F>(count: usize, dispatch: Dispatch<'_>, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync,
{
    if let Dispatch::Parallel(workers) = dispatch
        && let Some(pool) = workers.get()
    {
        tracing::debug!(threads = pool.current_num_threads(), chunks = count, "parallel chunk dispatch");
        match pool.install(|| (0..count).into_par_iter().map(&f).collect::<Result<Vec<T>>>()) {
            Ok(results) => return Ok(results),
            Err(err) => {
                tracing::warn!(error = %err, "parallel chunk processing failed, retrying sequentially");
            }
        }
    }

    (0..count).map(&f).collect()
}

/// Whole-signal transform, mask, inverse.
pub(crate) fn process_direct(
    signal: &[f64],
    sample_rate: f64,
    bands: &[Band],
    cache: &SpectrumCache,
) -> Result<Vec<f64>> {
    let cached = cache.get_or_compute(signal, sample_rate, SpectrumLayout::Whole, || {
        let frame = forward_real(signal);
        let freqs = frequency_bins(frame.len(), 1.0 / sample_rate);
        Ok((vec![frame], freqs))
    })?;

    let mask = GainMask::build(&cached.freqs, sample_rate / 2.0, bands);
    let out = match cached.spectra.first() {
        Some(frame) => {
            let mut frame = frame.clone();
            mask.apply(frame.bins_mut());
            frame.inverse_real(signal.len())
        }
        None => vec![0.0; signal.len()],
    };
    Ok(out)
}

/// Chunk grid over the zero-padded signal.
#[derive(Debug, Clone, Copy)]
struct ChunkGrid {
    chunk_size: usize,
    overlap: usize,
    hop: usize,
    count: usize,
    padded_len: usize,
}

impl ChunkGrid {
    /// The signal is embedded between `overlap` zeros on each side so that
    /// the first and last real samples sit in the flat part of a window.
    fn new(len: usize, layout: ChunkLayout) -> Self {
        let layout = layout.normalized();
        let hop = layout.hop();
        let content = len + 2 * layout.overlap;
        let count = (content - layout.overlap).div_ceil(hop).max(1);
        Self {
            chunk_size: layout.chunk_size,
            overlap: layout.overlap,
            hop,
            count,
            padded_len: (count - 1) * hop + layout.chunk_size,
        }
    }

    fn start(&self, index: usize) -> usize {
        index * self.hop
    }
}

/// Windowed overlap-add. `dispatch` controls how chunk transforms run.
pub(crate) fn process_chunked(
    signal: &[f64],
    sample_rate: f64,
    bands: &[Band],
    layout: ChunkLayout,
    dispatch: Dispatch<'_>,
    cache: &SpectrumCache,
) -> Result<Vec<f64>> {
    let grid = ChunkGrid::new(signal.len(), layout);
    let window = Window::Hann.coefficients(grid.chunk_size);

    let mut padded = vec![0.0; grid.padded_len];
    padded[grid.overlap..grid.overlap + signal.len()].copy_from_slice(signal);

    let spectrum_layout = SpectrumLayout::Chunked {
        chunk_size: grid.chunk_size,
        overlap: grid.overlap,
    };
    let cached = cache.get_or_compute(signal, sample_rate, spectrum_layout, || {
        let spectra = map_chunks(grid.count, dispatch, |i| {
            let start = grid.start(i);
            let frame: Vec<f64> = padded[start..start + grid.chunk_size]
                .iter()
                .zip(&window)
                .map(|(x, w)| x * w)
                .collect();
            Ok(forward_real(&frame))
        })?;
        Ok((spectra, frequency_bins(grid.chunk_size, 1.0 / sample_rate)))
    })?;

    let mask = GainMask::build(&cached.freqs, sample_rate / 2.0, bands);
    let spectra: &[SpectralFrame] = &cached.spectra;
    let chunks = map_chunks(grid.count, dispatch, |i| {
        let mut frame = spectra[i].clone();
        mask.apply(frame.bins_mut());
        let mut chunk = frame.inverse_real(grid.chunk_size);
        for (x, w) in chunk.iter_mut().zip(&window) {
            *x *= w;
        }
        ensure_finite(&chunk, "chunk reconstruction")?;
        Ok(chunk)
    })?;

    let mut output = vec![0.0; grid.padded_len];
    let mut norm = vec![0.0; grid.padded_len];
    for (i, chunk) in chunks.iter().enumerate() {
        let start = grid.start(i);
        for (j, (x, w)) in chunk.iter().zip(&window).enumerate() {
            output[start + j] += x;
            norm[start + j] += w * w;
        }
    }
    for (y, n) in output.iter_mut().zip(&norm) {
        *y /= if *n < NORM_FLOOR { 1.0 } else { *n };
    }

    Ok(output[grid.overlap..grid.overlap + signal.len()].to_vec())
}

/// Run `strategy` with the layouts from `config`. Parallel runs use `workers`.
pub(crate) fn run(
    strategy: Strategy,
    signal: &[f64],
    sample_rate: f64,
    bands: &[Band],
    config: &EqualizerConfig,
    cache: &SpectrumCache,
    workers: &WorkerPool,
) -> Result<Vec<f64>> {
    match strategy {
        Strategy::Direct => process_direct(signal, sample_rate, bands, cache),
        Strategy::Chunked => process_chunked(
            signal,
            sample_rate,
            bands,
            config.chunked,
            Dispatch::Sequential,
            cache,
        ),
        Strategy::Parallel => process_chunked(
            signal,
            sample_rate,
            bands,
            config.parallel,
            Dispatch::Parallel(workers),
            cache,
        ),
    }
}
