//! Fixed-length beat extraction around detected R-peaks.

use crate::signal::{ensure_finite, InputError, Segment};

/// Extract a `segment_length`-sample window of raw signal centered on each
/// peak, in the order the peaks are given. Windows that overrun either
/// signal boundary are zero-padded, so every segment has exactly
/// `segment_length` samples and owns its data.
///
/// An empty signal or an empty peak list is a degenerate input and yields an
/// empty segment list.
pub fn extract_segments(
    signal: &[f64],
    peaks: &[usize],
    segment_length: usize,
) -> Result<Vec<Segment>, InputError> {
    if segment_length == 0 {
        return Err(InputError::SegmentLength);
    }
    ensure_finite(signal)?;
    if signal.is_empty() || peaks.is_empty() {
        return Ok(Vec::new());
    }

    let half = segment_length / 2;
    let mut segments = Vec::with_capacity(peaks.len());
    for &peak in peaks {
        let start = peak as isize - half as isize;
        let end = peak as isize + half as isize + (segment_length % 2) as isize;
        let data = if start < 0 || end >= signal.len() as isize {
            let mut padded = vec![0.0; segment_length];
            for (offset, slot) in padded.iter_mut().enumerate() {
                let idx = start + offset as isize;
                if idx >= 0 && (idx as usize) < signal.len() {
                    *slot = signal[idx as usize];
                }
            }
            padded
        } else {
            signal[start as usize..end as usize].to_vec()
        };
        segments.push(Segment {
            data,
            r_peak_index: peak,
        });
    }
    Ok(segments)
}
