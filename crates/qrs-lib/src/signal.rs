use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Uniformly sampled ECG lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Sampling frequency in Hz
    pub fs: f64,
    /// Amplitude samples
    pub data: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 / self.fs
    }

    /// Reject inputs the filter cascade cannot handle: a non-positive or
    /// non-finite sampling rate, or NaN/infinite samples.
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.fs.is_finite() || self.fs <= 0.0 {
            return Err(InputError::SamplingRate(self.fs));
        }
        ensure_finite(&self.data)
    }
}

/// Sample indices of detected R-peaks, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Events {
    pub indices: Vec<usize>,
}

impl Events {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Fixed-length beat window centered on a detected R-peak. Owns its samples;
/// edges beyond the source signal are zero-padded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub data: Vec<f64>,
    pub r_peak_index: usize,
}

/// Parameter problems callers must fix before detection or extraction can run.
/// Degenerate inputs (empty signal, no peaks) are normal outcomes, not errors.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("sampling rate must be positive and finite, got {0}")]
    SamplingRate(f64),
    #[error("sample {index} is not finite ({value})")]
    NonFiniteSample { index: usize, value: f64 },
    #[error("sliding window size must be at least 1 sample")]
    WindowSize,
    #[error("segment length must be at least 1 sample")]
    SegmentLength,
}

/// Fail fast on NaN/infinite samples instead of letting them propagate
/// through the filter cascade.
pub fn ensure_finite(signal: &[f64]) -> Result<(), InputError> {
    for (index, &value) in signal.iter().enumerate() {
        if !value.is_finite() {
            return Err(InputError::NonFiniteSample { index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_clean_series() {
        let ts = TimeSeries {
            fs: 250.0,
            data: vec![0.1, 0.2, 0.3],
        };
        assert!(ts.validate().is_ok());
        assert_eq!(ts.len(), 3);
        assert!((ts.duration() - 0.012).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_bad_sampling_rate() {
        let ts = TimeSeries {
            fs: 0.0,
            data: vec![0.1],
        };
        assert_eq!(ts.validate(), Err(InputError::SamplingRate(0.0)));
        let ts = TimeSeries {
            fs: f64::NAN,
            data: vec![0.1],
        };
        assert!(matches!(ts.validate(), Err(InputError::SamplingRate(_))));
    }

    #[test]
    fn validate_reports_first_non_finite_sample() {
        let ts = TimeSeries {
            fs: 250.0,
            data: vec![0.1, f64::NAN, f64::INFINITY],
        };
        match ts.validate() {
            Err(InputError::NonFiniteSample { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected NonFiniteSample, got {:?}", other),
        }
    }

    #[test]
    fn events_roundtrip() {
        let events = Events::from_indices(vec![6, 19, 32]);
        assert_eq!(events.len(), 3);
        let js = serde_json::to_string(&events).unwrap();
        let back: Events = serde_json::from_str(&js).unwrap();
        assert_eq!(back, events);
    }
}
