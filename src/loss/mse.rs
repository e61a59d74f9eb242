pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²)
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| (p - y).powi(2))
            .sum::<f64>() / n
    }

    /// Exact gradient of the mean: 2·(p - y) / n
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        let scale = 2.0 / predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| scale * (p - y))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_is_mean_of_squares() {
        assert!((MseLoss::loss(&[1.0, 3.0], &[0.0, 1.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let expected = [0.2, 0.9];
        let p = [0.4, 0.3];
        let grad = MseLoss::derivative(&p, &expected);
        let h = 1e-6;
        let numeric = (MseLoss::loss(&[p[0] + h, p[1]], &expected)
            - MseLoss::loss(&[p[0] - h, p[1]], &expected)) / (2.0 * h);
        assert!((grad[0] - numeric).abs() < 1e-6);
    }
}
