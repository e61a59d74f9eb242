use rand::Rng;

use crate::{
    activation::activation::ActivationFunction,
    layers::dense::Layer,
    math::matrix::Matrix,
    network::spec::LayerSpec,
};

#[derive(Debug, Clone)]
pub struct Network {
    pub layers: Vec<Layer>,
}

impl Network {
    /// Builds a freshly initialised network from layer descriptions.
    pub fn new<R: Rng + ?Sized>(layer_specs: &[LayerSpec], rng: &mut R) -> Network {
        let layers = layer_specs.iter()
            .map(|spec| Layer::new(spec.size, spec.input_size, spec.activation, rng))
            .collect();
        Network { layers }
    }

    pub fn n_in(&self) -> usize {
        self.layers.first().map(|l| l.input_size).unwrap_or(0)
    }

    pub fn n_out(&self) -> usize {
        self.layers.last().map(|l| l.size).unwrap_or(0)
    }

    /// Total number of trainable parameters.
    pub fn n_par(&self) -> usize {
        self.layers.iter().map(Layer::n_par).sum()
    }

    /// Forward pass; stores activations in each layer for backprop.
    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &mut self.layers {
            current = layer.feed_from(&current);
        }
        current
    }

    /// Inference-only forward pass.
    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.predict(&current).1;
        }
        current
    }

    /// Gradient of output `k` with respect to the input vector.
    pub fn jacobian(&self, input: &[f64], k: usize) -> Vec<f64> {
        // Forward pass keeping every pre-activation.
        let mut pre = Vec::with_capacity(self.layers.len());
        let mut current = input.to_vec();
        for layer in &self.layers {
            let (z, a) = layer.predict(&current);
            pre.push(z);
            current = a;
        }

        let Some(last) = self.layers.last() else {
            return vec![0.0; input.len()];
        };
        let z_last = &pre[pre.len() - 1];
        let mut delta = match last.activator {
            ActivationFunction::Softmax => {
                // d a_k / d z_j = a_k (δ_kj - a_j)
                let a_k = current[k];
                let row = current.iter().enumerate()
                    .map(|(j, &a_j)| {
                        let kronecker = if j == k { 1.0 } else { 0.0 };
                        a_k * (kronecker - a_j)
                    })
                    .collect();
                Matrix::row(row)
            }
            act => {
                let mut row = vec![0.0; last.size];
                row[k] = act.derivative(z_last[k]);
                Matrix::row(row)
            }
        };

        for i in (1..self.layers.len()).rev() {
            let d_prev = delta.dot(&self.layers[i].weights.transpose());
            let prev = &self.layers[i - 1];
            let deriv = Matrix::row(pre[i - 1].iter().map(|&z| prev.activator.derivative(z)).collect());
            delta = d_prev.hadamard(&deriv);
        }
        delta.dot(&self.layers[0].weights.transpose())
            .data.into_iter().next().unwrap_or_default()
    }

    /// For every output `k`, the mean of `jacobian(x, k)` over the samples
    /// whose target for `k` is positive. `None` where no sample qualifies.
    pub fn mean_jacobian(&self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Vec<Option<Vec<f64>>> {
        (0..self.n_out()).map(|k| {
            let mut sum = vec![0.0; self.n_in()];
            let mut count = 0usize;
            for (x, y) in inputs.iter().zip(targets.iter()) {
                if y.get(k).is_some_and(|&t| t > 0.0) {
                    for (s, d) in sum.iter_mut().zip(self.jacobian(x, k)) {
                        *s += d;
                    }
                    count += 1;
                }
            }
            (count > 0).then(|| sum.into_iter().map(|s| s / count as f64).collect())
        }).collect()
    }
}
