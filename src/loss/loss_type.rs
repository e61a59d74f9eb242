use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::loss::bce::BceLoss;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::mse::MseLoss;

/// Selects which loss function the training loop uses.
///
/// - `BinaryCrossEntropy` — independent sigmoid outputs (the default).
/// - `CrossEntropy`       — categorical cross-entropy over a softmax output.
/// - `Mse`                — mean-squared error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    BinaryCrossEntropy,
    CrossEntropy,
    Mse,
}

impl LossType {
    /// Activation the output layer is built with for this loss.
    pub fn output_activation(&self) -> ActivationFunction {
        match self {
            LossType::CrossEntropy => ActivationFunction::Softmax,
            LossType::BinaryCrossEntropy | LossType::Mse => ActivationFunction::Sigmoid,
        }
    }

    /// Scalar loss for one sample.
    pub fn loss(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossType::BinaryCrossEntropy => BceLoss::loss(predicted, expected),
            LossType::CrossEntropy       => CrossEntropyLoss::loss(predicted, expected),
            LossType::Mse                => MseLoss::loss(predicted, expected),
        }
    }

    /// Per-output gradient w.r.t. the output activations.
    pub fn derivative(&self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        match self {
            LossType::BinaryCrossEntropy => BceLoss::derivative(predicted, expected),
            LossType::CrossEntropy       => CrossEntropyLoss::derivative(predicted, expected),
            LossType::Mse                => MseLoss::derivative(predicted, expected),
        }
    }

    /// Gradient w.r.t. the output pre-activations when the loss pairs with
    /// the output activation. BCE is averaged over outputs, so its
    /// combined gradient carries the same `1/n` factor.
    pub fn logit_gradient(&self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        let scale = match self {
            LossType::BinaryCrossEntropy => 1.0 / predicted.len().max(1) as f64,
            _ => 1.0,
        };
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| scale * (p - y))
            .collect()
    }

    /// Whether the loss paired with `activation` has the combined gradient
    /// `predicted - expected` w.r.t. the output pre-activations.
    pub fn pairs_with(&self, activation: ActivationFunction) -> bool {
        matches!(
            (self, activation),
            (LossType::BinaryCrossEntropy, ActivationFunction::Sigmoid)
                | (LossType::CrossEntropy, ActivationFunction::Softmax)
        )
    }

    /// Whether a sample counts as correctly predicted: argmax agreement for
    /// categorical outputs, every output on the right side of 0.5 otherwise.
    pub fn is_correct(&self, predicted: &[f64], expected: &[f64]) -> bool {
        match self {
            LossType::CrossEntropy => argmax(predicted) == argmax(expected),
            _ => predicted.iter().zip(expected.iter())
                .all(|(p, y)| (*p >= 0.5) == (*y >= 0.5)),
        }
    }
}

/// Index of the maximum element in a slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
