//! Delimited-file ingestion: a single named amplitude column.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::{fs::File, path::Path};

/// Read one f64 column out of a delimited file with a header row.
pub fn read_signal_column(path: &Path, column: &str, delimiter: u8) -> Result<Vec<f64>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(file);
    let headers = reader.headers().context("reading header")?.clone();
    let col_idx = headers
        .iter()
        .position(|name| name.eq_ignore_ascii_case(column))
        .with_context(|| format!("column {:?} not found in {:?}", column, headers))?;

    let mut samples = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading record {}", row + 1))?;
        let raw = record
            .get(col_idx)
            .with_context(|| format!("row {} has no column {}", row + 1, col_idx))?;
        let value = raw
            .parse::<f64>()
            .with_context(|| format!("row {}: {:?} is not a valid sample", row + 1, raw))?;
        samples.push(value);
    }
    Ok(samples)
}
