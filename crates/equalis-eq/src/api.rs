//! Request/response types for the `equalize` operation.

use serde::{Deserialize, Serialize};

use equalis_analysis::Error as AnalysisError;

use crate::band::{BandSpec, parse_bands};
use crate::engine::Equalizer;
use crate::error::Result;

/// An equalization request as received from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqualizeRequest {
    /// Input samples.
    pub signal: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Bands, applied in order.
    #[serde(default)]
    pub bands: Vec<BandSpec>,
}

/// Result of an equalization. The sample rate always echoes the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqualizeResponse {
    /// Filtered samples, same length as the input.
    pub output_signal: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: f64,
}

/// Validate and equalize.
///
/// Unlike [`Equalizer::process`], an empty signal is rejected here: a caller
/// asking to equalize nothing has sent a malformed request.
pub fn equalize(
    equalizer: &Equalizer,
    signal: &[f64],
    sample_rate: f64,
    bands: &[BandSpec],
) -> Result<EqualizeResponse> {
    if signal.is_empty() {
        return Err(AnalysisError::EmptySignal.into());
    }
    let bands = parse_bands(bands)?;
    let output_signal = equalizer.process(signal, sample_rate, &bands)?;
    Ok(EqualizeResponse {
        output_signal,
        sample_rate,
    })
}

impl Equalizer {
    /// Handle a deserialized [`EqualizeRequest`].
    pub fn equalize(&self, request: &EqualizeRequest) -> Result<EqualizeResponse> {
        equalize(self, &request.signal, request.sample_rate, &request.bands)
    }
}
