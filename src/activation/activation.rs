use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SannError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    #[serde(rename = "relu")]
    ReLU,
    /// Vector-valued; applied to the whole layer by `activate()`.
    Softmax,
}

impl ActivationFunction {
    /// Element-wise derivative of the activation, evaluated at the
    /// pre-activation `x`.
    ///
    /// For `Softmax` the layer is always paired with cross-entropy, whose
    /// combined gradient is taken with respect to the logits directly, so
    /// `1.0` is returned here.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = sigmoid(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Softmax => 1.0,
        }
    }

    /// Applies the activation to a whole pre-activation vector.
    pub fn activate(&self, z: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Sigmoid => z.iter().map(|&x| sigmoid(x)).collect(),
            ActivationFunction::Tanh => z.iter().map(|x| x.tanh()).collect(),
            ActivationFunction::ReLU => z.iter().map(|&x| x.max(0.0)).collect(),
            ActivationFunction::Softmax => softmax(z),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax (shifted by the maximum logit).
fn softmax(z: &[f64]) -> Vec<f64> {
    let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl FromStr for ActivationFunction {
    type Err = SannError;

    /// Accepts names as well as the numeric codes of the classic `-f` flag
    /// (1: sigmoid, 2: tanh, 3: ReLU).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "sigm" | "sigmoid" => Ok(ActivationFunction::Sigmoid),
            "2" | "tanh" => Ok(ActivationFunction::Tanh),
            "3" | "relu" | "reclin" => Ok(ActivationFunction::ReLU),
            "softmax" => Ok(ActivationFunction::Softmax),
            other => Err(SannError::parse(format!("unknown activation '{other}'"))),
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::Softmax => "softmax",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_numeric_codes() {
        assert_eq!("1".parse::<ActivationFunction>().unwrap(), ActivationFunction::Sigmoid);
        assert_eq!("tanh".parse::<ActivationFunction>().unwrap(), ActivationFunction::Tanh);
        assert_eq!("ReLU".parse::<ActivationFunction>().unwrap(), ActivationFunction::ReLU);
        assert_eq!("3".parse::<ActivationFunction>().unwrap(), ActivationFunction::ReLU);
        assert!("swish".parse::<ActivationFunction>().is_err());
    }

    #[test]
    fn softmax_sums_to_one_and_survives_large_logits() {
        let out = ActivationFunction::Softmax.activate(&[1000.0, 1000.0, 0.0]);
        let sum: f64 = out.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((out[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sigmoid_derivative_peaks_at_zero() {
        let s = ActivationFunction::Sigmoid;
        assert!((s.activate(&[0.0])[0] - 0.5).abs() < 1e-12);
        assert!((s.derivative(0.0) - 0.25).abs() < 1e-12);
        assert!(s.derivative(5.0) < s.derivative(0.0));
    }

    #[test]
    fn relu_clamps_negative_inputs() {
        let r = ActivationFunction::ReLU;
        assert_eq!(r.activate(&[-1.0, 2.0]), vec![0.0, 2.0]);
        assert_eq!(r.derivative(-1.0), 0.0);
        assert_eq!(r.derivative(2.0), 1.0);
    }

    #[test]
    fn every_variant_activates_element_wise_or_as_a_vector() {
        let z = [-2.0, 0.0, 3.0];
        for act in [
            ActivationFunction::Sigmoid,
            ActivationFunction::Tanh,
            ActivationFunction::ReLU,
            ActivationFunction::Softmax,
        ] {
            let a = act.activate(&z);
            assert_eq!(a.len(), z.len(), "{act}");
            assert!(a.iter().all(|v| v.is_finite()), "{act}");
        }
        assert_eq!(ActivationFunction::Tanh.activate(&[0.0]), vec![0.0]);
    }

    #[test]
    fn serializes_with_short_names() {
        let json = serde_json::to_string(&ActivationFunction::ReLU).unwrap();
        assert_eq!(json, "\"relu\"");
    }
}
