//! WAV file I/O for equalis.
//!
//! Samples are exchanged as mono `f64` in `[-1, 1]`: multi-channel files are
//! averaged down on read, integer PCM is scaled by its full-scale value.
//!
//! ```rust,ignore
//! use equalis_io::{read_wav, write_wav};
//!
//! let (samples, spec) = read_wav("input.wav")?;
//! let out = equalizer.process(&samples, spec.sample_rate_hz(), &bands)?;
//! write_wav("output.wav", &out, spec.mono())?;
//! ```

mod wav;

pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file holds no samples.
    #[error("WAV file contains no samples")]
    Empty,

    /// Bit depth not representable.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
