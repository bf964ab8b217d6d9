use crate::{
    classify::{BeatClassifier, Classification, ClassifyError},
    denoise::{Denoiser, IdentityDenoiser},
    segment::extract_segments,
    signal::{Events, InputError, Segment, TimeSeries},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configurable parameters for the sliding-window R-peak detector.
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Sliding window length in samples; chunks are contiguous and
    /// non-overlapping, the last one may be shorter.
    pub chunk_samples: usize,
    /// Fraction of the integrated signal's maximum used as the adaptive
    /// detection threshold. Natural range (0, 1]; values outside yield few
    /// or no detections rather than an error.
    pub threshold: f64,
    /// Moving window integration length (milliseconds), sized to a
    /// physiological QRS width.
    pub integration_window_ms: f64,
    /// Refractory period between accepted peaks (seconds).
    pub refractory_s: f64,
    /// Coefficient of the one-pole baseline high-pass; closer to 1 means a
    /// lower cutoff.
    pub baseline_alpha: f64,
    /// Decomposition level forwarded to the denoiser.
    pub denoise_level: i32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            chunk_samples: 500,
            threshold: 0.5,
            integration_window_ms: 30.0,
            refractory_s: 0.2,
            baseline_alpha: 0.995,
            denoise_level: 4,
        }
    }
}

/// Detect R-peaks with an explicit sliding-window size in samples.
pub fn detect_r_peaks(
    ts: &TimeSeries,
    window_samples: usize,
    threshold: f64,
) -> Result<Events, InputError> {
    let cfg = DetectorConfig {
        chunk_samples: window_samples,
        threshold,
        ..DetectorConfig::default()
    };
    detect_r_peaks_with_config(ts, &cfg)
}

/// Detect R-peaks with the sliding-window size given in milliseconds.
/// A thin unit conversion onto [`detect_r_peaks`]; the two entry points are
/// behaviorally identical for the same effective window.
pub fn detect_r_peaks_ms(
    ts: &TimeSeries,
    threshold: f64,
    window_ms: f64,
) -> Result<Events, InputError> {
    ts.validate()?;
    let window_samples = ((window_ms / 1000.0 * ts.fs).round() as usize).max(1);
    detect_r_peaks(ts, window_samples, threshold)
}

/// Detect R-peaks using the configurable pipeline and the identity denoiser.
pub fn detect_r_peaks_with_config(
    ts: &TimeSeries,
    cfg: &DetectorConfig,
) -> Result<Events, InputError> {
    detect_r_peaks_with_denoiser(ts, cfg, &IdentityDenoiser)
}

/// Full detection pipeline: partition into chunks, run the per-window
/// Pan-Tompkins cascade on each, translate local indices to global ones, and
/// thin out duplicates introduced at chunk boundaries.
///
/// Chunks share no state; each produces an independent local peak list that
/// is concatenated afterwards, so the per-chunk loop is trivially
/// parallelizable.
pub fn detect_r_peaks_with_denoiser(
    ts: &TimeSeries,
    cfg: &DetectorConfig,
    denoiser: &dyn Denoiser,
) -> Result<Events, InputError> {
    ts.validate()?;
    if cfg.chunk_samples == 0 {
        return Err(InputError::WindowSize);
    }
    if ts.is_empty() {
        return Ok(Events::from_indices(Vec::new()));
    }

    let mut all_peaks = Vec::new();
    for start in (0..ts.data.len()).step_by(cfg.chunk_samples) {
        let end = (start + cfg.chunk_samples).min(ts.data.len());
        let local = detect_in_window(&ts.data[start..end], ts.fs, cfg, denoiser);
        log::debug!("window {start}..{end}: {} local peaks", local.len());
        all_peaks.extend(local.into_iter().map(|idx| idx + start));
    }

    Ok(Events::from_indices(dedupe_peaks(all_peaks, ts.fs)))
}

/// Per-window detection: denoise, remove baseline wander, differentiate,
/// square, integrate, then pick local maxima of the integrated signal above
/// an adaptive threshold. Each accepted candidate is refined to the true
/// local maximum of the raw window, which compensates for the lag the
/// derivative and integration stages introduce.
fn detect_in_window(
    window: &[f64],
    fs: f64,
    cfg: &DetectorConfig,
    denoiser: &dyn Denoiser,
) -> Vec<usize> {
    if window.len() < 3 {
        return Vec::new();
    }

    let integ_win = ((cfg.integration_window_ms / 1000.0 * fs).round() as usize).max(1);

    let denoised = denoiser.denoise(window, cfg.denoise_level);
    let denoised = if denoised.len() == window.len() {
        denoised
    } else {
        log::warn!(
            "denoiser changed window length ({} -> {}), falling back to raw window",
            window.len(),
            denoised.len()
        );
        window.to_vec()
    };

    let filtered = baseline_highpass(&denoised, cfg.baseline_alpha);
    let energy = square(&central_derivative(&filtered));
    let integrated = moving_window_integrate(&energy, integ_win);

    let max = integrated.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let adaptive_threshold = max * cfg.threshold;
    let refractory = ((cfg.refractory_s * fs).round() as usize).max(1);

    let mut peaks = Vec::new();
    let mut last_candidate = 0usize;
    for i in 1..integrated.len() - 1 {
        let rising = integrated[i] > integrated[i - 1];
        let falling = integrated[i] >= integrated[i + 1];
        if integrated[i] > adaptive_threshold && rising && falling {
            if peaks.is_empty() || i - last_candidate >= refractory {
                peaks.push(refine_peak(window, i, integ_win));
                last_candidate = i;
            }
        }
    }
    peaks
}

/// Locate the raw-signal maximum in a symmetric neighborhood of the
/// candidate, clamped to the window bounds. Ties keep the earliest index.
fn refine_peak(window: &[f64], candidate: usize, radius: usize) -> usize {
    let lo = candidate.saturating_sub(radius);
    let hi = (candidate + radius).min(window.len() - 1);
    let mut best = candidate;
    for j in lo..=hi {
        if window[j] > window[best] {
            best = j;
        }
    }
    best
}

/// Remove spurious duplicates introduced at window boundaries: sort, then
/// greedily keep a peak only if it lies at least one refractory distance
/// past the last kept peak. Inputs of length <= 1 come back unchanged.
pub fn dedupe_peaks(mut peaks: Vec<usize>, fs: f64) -> Vec<usize> {
    peaks.sort_unstable();
    if peaks.len() <= 1 {
        return peaks;
    }
    let min_distance = ((0.2 * fs).round() as usize).max(1);
    let mut kept = Vec::with_capacity(peaks.len());
    kept.push(peaks[0]);
    for &idx in &peaks[1..] {
        if idx - kept[kept.len() - 1] >= min_distance {
            kept.push(idx);
        }
    }
    kept
}

/// One-pole recursive high-pass removing slow baseline drift:
/// y[i] = alpha * (y[i-1] + x[i] - x[i-1]), y[0] = 0.
fn baseline_highpass(data: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = vec![0.0; data.len()];
    for i in 1..data.len() {
        out[i] = alpha * (out[i - 1] + data[i] - data[i - 1]);
    }
    out
}

/// Central difference with both boundary samples pinned to zero.
fn central_derivative(data: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; data.len()];
    if data.len() < 3 {
        return out;
    }
    for i in 1..data.len() - 1 {
        out[i] = (data[i + 1] - data[i - 1]) / 2.0;
    }
    out
}

fn square(data: &[f64]) -> Vec<f64> {
    data.iter().map(|x| x * x).collect()
}

/// Trailing moving average over the last `win` samples; the partial window
/// at the start divides by the actual count, not the nominal size.
fn moving_window_integrate(data: &[f64], win: usize) -> Vec<f64> {
    let win = win.max(1);
    let mut out = vec![0.0; data.len()];
    let mut acc = 0.0;
    for i in 0..data.len() {
        acc += data[i];
        if i >= win {
            acc -= data[i - win];
        }
        let count = (i + 1).min(win);
        out[i] = acc / count as f64;
    }
    out
}

/// Errors surfaced by the combined detect + extract + classify pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Combined result of the beat detection pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatPipelineResult {
    pub fs: f64,
    pub sample_count: usize,
    pub events: Events,
    pub segments: Vec<Segment>,
    pub classifications: Vec<Classification>,
}

/// Run detection, segment extraction and classification in one shot.
/// Classification is all-or-nothing for the batch; a classifier failure
/// fails the whole call.
pub fn run_beat_pipeline(
    ts: &TimeSeries,
    cfg: &DetectorConfig,
    segment_length: usize,
    classifier: &dyn BeatClassifier,
) -> Result<BeatPipelineResult, PipelineError> {
    let events = detect_r_peaks_with_config(ts, cfg)?;
    let segments = extract_segments(&ts.data, &events.indices, segment_length)?;
    let classifications = classifier.classify(&segments)?;
    log::info!(
        "pipeline: {} samples -> {} beats",
        ts.len(),
        events.indices.len()
    );
    Ok(BeatPipelineResult {
        fs: ts.fs,
        sample_count: ts.len(),
        events,
        segments,
        classifications,
    })
}
