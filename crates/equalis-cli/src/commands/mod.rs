//! CLI command implementations.

pub mod common;
pub mod equalize;
pub mod fft;
pub mod generate;
pub mod modes;
pub mod spectrogram;
