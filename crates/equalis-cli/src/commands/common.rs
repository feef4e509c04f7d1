//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use equalis_analysis::{Partial, PartialShape};
use equalis_config::KernelConfig;
use equalis_eq::{Band, FrequencyRange};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Parse `GAIN:MIN-MAX[,MIN-MAX...]` into a band.
///
/// Example: `0.5:100-200,400-800`. Either edge may be negative
/// (`0.5:-100-200`, `0.5:-300--100`).
pub fn parse_band(s: &str) -> Result<Band, String> {
    let (gain, ranges) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid band '{s}' (expected GAIN:MIN-MAX[,MIN-MAX])"))?;
    let gain: f64 = gain
        .trim()
        .parse()
        .map_err(|_| format!("Invalid gain '{gain}' in band '{s}'"))?;

    let ranges = ranges
        .split(',')
        .map(|range| {
            let (lo, hi) = split_range(range.trim())
                .ok_or_else(|| format!("Invalid range '{range}' (expected MIN-MAX)"))?;
            let lo: f64 = lo.trim().parse().map_err(|_| format!("Invalid frequency '{lo}'"))?;
            let hi: f64 = hi.trim().parse().map_err(|_| format!("Invalid frequency '{hi}'"))?;
            Ok(FrequencyRange::new(lo, hi))
        })
        .collect::<Result<Vec<_>, String>>()?;

    Band::new(gain, ranges).map_err(|e| e.to_string())
}

/// Split `MIN-MAX` on the first `-` that is not a leading sign.
fn split_range(range: &str) -> Option<(&str, &str)> {
    let sep = range.char_indices().skip(1).find(|&(_, c)| c == '-')?.0;
    Some((&range[..sep], &range[sep + 1..]))
}

/// Parse `FREQ:AMP[:cos]` into a partial.
pub fn parse_partial(s: &str) -> Result<Partial, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let (freq, amp, shape) = match parts.as_slice() {
        [freq, amp] => (freq, amp, PartialShape::Sine),
        [freq, amp, "sin"] => (freq, amp, PartialShape::Sine),
        [freq, amp, "cos"] => (freq, amp, PartialShape::Cosine),
        _ => return Err(format!("Invalid partial '{s}' (expected FREQ:AMP[:sin|cos])")),
    };
    let freq_hz: f64 = freq.parse().map_err(|_| format!("Invalid frequency '{freq}'"))?;
    let amplitude: f64 = amp.parse().map_err(|_| format!("Invalid amplitude '{amp}'"))?;
    Ok(Partial {
        freq_hz,
        amplitude,
        shape,
    })
}

/// Load the kernel config from `path`, or defaults when absent.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<KernelConfig> {
    match path {
        Some(path) => KernelConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(KernelConfig::default()),
    }
}

/// Write `value` as pretty JSON to `output`, or to stdout.
pub fn write_json<T: Serialize>(value: &T, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_with_two_ranges() {
        let band = parse_band("0.5:100-200,400-800").unwrap();
        assert_eq!(band.gain(), 0.5);
        assert_eq!(
            band.ranges(),
            &[FrequencyRange::new(100.0, 200.0), FrequencyRange::new(400.0, 800.0)]
        );
    }

    #[test]
    fn band_with_negative_edges() {
        let band = parse_band("0.5:-100-200").unwrap();
        assert_eq!(band.ranges(), &[FrequencyRange::new(-100.0, 200.0)]);

        let band = parse_band("2: -300--100 , 50-60").unwrap();
        assert_eq!(
            band.ranges(),
            &[FrequencyRange::new(-300.0, -100.0), FrequencyRange::new(50.0, 60.0)]
        );
    }

    #[test]
    fn band_errors() {
        assert!(parse_band("0.5").is_err());
        assert!(parse_band("x:1-2").is_err());
        assert!(parse_band("0.5:100").is_err());
        assert!(parse_band("-1:100-200").is_err());
        assert!(parse_band("0.5:-100").is_err());
    }

    #[test]
    fn partial_shapes() {
        assert_eq!(parse_partial("440:0.5").unwrap(), Partial::sine(440.0, 0.5));
        assert_eq!(parse_partial("440:0.5:cos").unwrap(), Partial::cosine(440.0, 0.5));
        assert!(parse_partial("440").is_err());
        assert!(parse_partial("440:0.5:tri").is_err());
    }
}
