//! Beat classifier boundary contract.
//!
//! The pipeline only defines the interface: segments in, one classification
//! per segment out, in matching order, or the whole batch fails. Real
//! inference lives behind this trait; the bundled [`RandomClassifier`] is a
//! disposable stand-in whose scores are normalized random draws, not
//! calibrated probabilities.

use crate::signal::Segment;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// AAMI-style beat classes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BeatLabel {
    #[serde(rename = "N")]
    Normal,
    #[serde(rename = "S")]
    Supraventricular,
    #[serde(rename = "V")]
    Ventricular,
    #[serde(rename = "F")]
    Fusion,
    #[serde(rename = "Q")]
    Unknown,
}

impl BeatLabel {
    pub const ALL: [BeatLabel; 5] = [
        BeatLabel::Normal,
        BeatLabel::Supraventricular,
        BeatLabel::Ventricular,
        BeatLabel::Fusion,
        BeatLabel::Unknown,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            BeatLabel::Normal => "N",
            BeatLabel::Supraventricular => "S",
            BeatLabel::Ventricular => "V",
            BeatLabel::Fusion => "F",
            BeatLabel::Unknown => "Q",
        }
    }
}

/// Classifier verdict for one beat segment. `scores` is a distribution over
/// all classes: non-negative values summing to 1; `confidence` is the score
/// of the winning class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub label: BeatLabel,
    pub confidence: f64,
    pub scores: BTreeMap<BeatLabel, f64>,
}

/// The one boundary where recoverable failure is expected: a model may be
/// missing or inference may fail. Callers treat either as failing the whole
/// batch and may retry after remediating the model state.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("inference failed on segment {index}: {reason}")]
    Inference { index: usize, reason: String },
}

/// External collaborator contract: exactly one classification per input
/// segment, in matching order, or an error for the whole batch. No partial
/// results.
pub trait BeatClassifier {
    fn classify(&self, segments: &[Segment]) -> Result<Vec<Classification>, ClassifyError>;
}

/// Seedable random-score classifier mirroring the reference stub. Useful for
/// exercising the pipeline end to end; never a substitute for a trained
/// model.
#[derive(Debug, Clone, Copy)]
pub struct RandomClassifier {
    seed: u64,
}

impl RandomClassifier {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for RandomClassifier {
    fn default() -> Self {
        Self::new(0)
    }
}

impl BeatClassifier for RandomClassifier {
    fn classify(&self, segments: &[Segment]) -> Result<Vec<Classification>, ClassifyError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out = Vec::with_capacity(segments.len());
        for _segment in segments {
            let mut scores = BTreeMap::new();
            let mut sum = 0.0;
            for label in BeatLabel::ALL {
                let score: f64 = rng.gen();
                scores.insert(label, score);
                sum += score;
            }
            if sum > 0.0 {
                for value in scores.values_mut() {
                    *value /= sum;
                }
            } else {
                for value in scores.values_mut() {
                    *value = 1.0 / BeatLabel::ALL.len() as f64;
                }
            }
            let (label, confidence) = scores
                .iter()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(label, score)| (*label, *score))
                .unwrap_or((BeatLabel::Unknown, 0.0));
            out.push(Classification {
                label,
                confidence,
                scores,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(count: usize) -> Vec<Segment> {
        (0..count)
            .map(|i| Segment {
                data: vec![0.0; 16],
                r_peak_index: i * 100,
            })
            .collect()
    }

    #[test]
    fn one_classification_per_segment_in_order() {
        let classifier = RandomClassifier::new(42);
        let input = segments(5);
        let results = classifier.classify(&input).unwrap();
        assert_eq!(results.len(), input.len());
    }

    #[test]
    fn scores_form_a_distribution() {
        let classifier = RandomClassifier::new(42);
        let results = classifier.classify(&segments(10)).unwrap();
        for classification in &results {
            assert_eq!(classification.scores.len(), BeatLabel::ALL.len());
            let sum: f64 = classification.scores.values().sum();
            assert!((sum - 1.0).abs() < 1e-9, "scores sum to {sum}");
            for &score in classification.scores.values() {
                assert!(score >= 0.0);
            }
            let max = classification
                .scores
                .values()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(classification.confidence, max);
            assert_eq!(
                classification.scores[&classification.label],
                classification.confidence
            );
        }
    }

    #[test]
    fn same_seed_reproduces_batch() {
        let input = segments(4);
        let a = RandomClassifier::new(9).classify(&input).unwrap();
        let b = RandomClassifier::new(9).classify(&input).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.label, y.label);
            assert_eq!(x.confidence, y.confidence);
        }
    }

    #[test]
    fn empty_batch_is_fine() {
        let results = RandomClassifier::default().classify(&[]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn labels_serialize_as_single_letter_codes() {
        let js = serde_json::to_string(&BeatLabel::Ventricular).unwrap();
        assert_eq!(js, "\"V\"");
        for label in BeatLabel::ALL {
            assert_eq!(
                serde_json::to_string(&label).unwrap(),
                format!("\"{}\"", label.code())
            );
        }
    }
}
