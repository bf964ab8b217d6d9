//! Plain-text ingestion: newline-delimited ECG samples and peak indices.
//!
//! Blank lines and `#` comments are skipped. An empty series parses to an
//! empty vector; downstream treats that as a degenerate input, not an error.

use anyhow::{Context, Result};
use std::{path::Path, str::FromStr};

fn parse_series<T>(text: &str, what: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let value = trimmed
            .parse::<T>()
            .with_context(|| format!("line {}: {:?} is not a valid {}", lineno + 1, trimmed, what))?;
        out.push(value);
    }
    Ok(out)
}

/// Parse newline-delimited amplitude samples.
pub fn parse_samples(text: &str) -> Result<Vec<f64>> {
    parse_series(text, "sample")
}

/// Read newline-delimited amplitude samples from disk.
pub fn read_samples(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_samples(&text)
}

/// Parse newline-delimited R-peak sample indices.
pub fn parse_peak_indices(text: &str) -> Result<Vec<usize>> {
    parse_series(text, "peak index")
}

/// Read R-peak sample indices from disk.
pub fn read_peak_indices(path: &Path) -> Result<Vec<usize>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_peak_indices(&text)
}
