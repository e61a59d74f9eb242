pub struct BceLoss;

const EPS: f64 = 1e-12;

impl BceLoss {
    /// Scalar BCE: -mean(y·log(p+ε) + (1-y)·log(1-p+ε))
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| -(y * (p + EPS).ln() + (1.0 - y) * (1.0 - p + EPS).ln()))
            .sum::<f64>() / n
    }

    /// Per-output gradient w.r.t. the activations: (p - y) / ((p + ε) · (1 - p + ε))
    ///
    /// Behind a sigmoid output the trainer uses the combined gradient
    /// `p - y` instead, which does not vanish when `p` saturates.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| (p - y) / ((p + EPS) * (1.0 - p + EPS)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_has_near_zero_loss() {
        assert!(BceLoss::loss(&[1.0, 0.0], &[1.0, 0.0]) < 1e-9);
    }

    #[test]
    fn confident_mistake_costs_more_than_hedge() {
        let hedge = BceLoss::loss(&[0.5], &[1.0]);
        let wrong = BceLoss::loss(&[0.01], &[1.0]);
        assert!(wrong > hedge);
    }
}
