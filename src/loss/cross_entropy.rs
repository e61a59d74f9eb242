/// Categorical cross-entropy for a softmax output layer.
pub struct CrossEntropyLoss;

/// Keeps log() finite when a class probability underflows to zero.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// L = -Σ expected[i] · log(predicted[i] + ε)
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| -e * (p + EPS).ln())
            .sum()
    }

    /// Gradient of softmax + cross-entropy w.r.t. the logits:
    /// `predicted[i] - expected[i]`. Only valid behind a softmax layer,
    /// which is the only place the trainer uses it.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| p - e)
            .collect()
    }
}
