//! Pluggable noise-reduction stage for the detection pipeline.
//!
//! The detector sits in a hot path where losing signal is worse than
//! under-filtering, so implementations must be total: no panics, no error
//! path, and a `level <= 0` request degrades to a no-op.

/// Noise-reduction strategy applied to each analysis window before the
/// filter cascade.
///
/// Implementations must return a signal of exactly the input length and must
/// not alter the sampling rate. The detector discards any output whose
/// length differs and falls back to the raw window.
pub trait Denoiser {
    fn denoise(&self, window: &[f64], level: i32) -> Vec<f64>;
}

/// Passthrough stand-in for a real multi-level wavelet denoiser.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityDenoiser;

impl Denoiser for IdentityDenoiser {
    fn denoise(&self, window: &[f64], _level: i32) -> Vec<f64> {
        window.to_vec()
    }
}

/// Wavelet denoising entry point. Currently the identity transform; kept as
/// a free function so callers bind to the contract rather than the stub.
pub fn wavelet_denoise(signal: &[f64], level: i32) -> Vec<f64> {
    IdentityDenoiser.denoise(signal, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_preserves_length_and_content() {
        let signal = vec![0.1, -0.5, 1.5, 0.0];
        for level in [-1, 0, 2, 4, 8] {
            let out = wavelet_denoise(&signal, level);
            assert_eq!(out, signal);
        }
    }

    #[test]
    fn identity_handles_empty_window() {
        assert!(wavelet_denoise(&[], 4).is_empty());
    }

    #[test]
    fn trait_object_is_usable() {
        let denoiser: &dyn Denoiser = &IdentityDenoiser;
        assert_eq!(denoiser.denoise(&[1.0, 2.0], 4), vec![1.0, 2.0]);
    }
}
