use rand::Rng;

use crate::{activation::activation::ActivationFunction, math::matrix::Matrix};

/// Fully connected layer computing `a = f(x·W + b)` for a row vector `x`.
#[derive(Debug, Clone)]
pub struct Layer {
    pub size: usize,
    pub input_size: usize,
    pub neurons: Matrix,
    pre_neurons: Matrix, // pre-activation values (z = xW + b) needed for correct derivative
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

impl Layer {
    /// Creates a layer with He weights in front of ReLU, Xavier weights
    /// otherwise, and zero biases.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = match activation {
            ActivationFunction::ReLU => Matrix::he(input_size, size, rng),
            _ => Matrix::xavier(input_size, size, rng),
        };
        Layer::from_parts(weights, Matrix::zeros(1, size), activation)
    }

    /// Rebuilds a layer from stored parameters. Shapes are checked by the
    /// model loader before this is called.
    pub fn from_parts(weights: Matrix, biases: Matrix, activation: ActivationFunction) -> Layer {
        let size = weights.cols;
        Layer {
            size,
            input_size: weights.rows,
            neurons: Matrix::zeros(1, size),
            pre_neurons: Matrix::zeros(1, size),
            weights,
            biases,
            activator: activation,
        }
    }

    /// Number of trainable parameters (weights plus biases).
    pub fn n_par(&self) -> usize {
        self.input_size * self.size + self.size
    }

    fn pre_activate(&self, input: &[f64]) -> Matrix {
        let mut z = Matrix::row(input.to_vec()).dot(&self.weights);
        z += &self.biases;
        z
    }

    /// Forward pass that caches `z` and `a` for a following backward pass.
    pub fn feed_from(&mut self, input: &[f64]) -> Vec<f64> {
        let z = self.pre_activate(input);
        let a = Matrix::row(self.activator.activate(z.first_row()));
        self.pre_neurons = z;
        self.neurons = a;
        self.neurons.first_row().to_vec()
    }

    /// Forward pass without touching the cache. Returns `(z, a)`.
    pub fn predict(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let z = self.pre_activate(input);
        let a = self.activator.activate(z.first_row());
        (z.data.into_iter().next().unwrap_or_default(), a)
    }

    /// Element-wise activation derivative at the cached pre-activation.
    pub fn activation_derivative(&self) -> Matrix {
        self.pre_neurons.map(|x| self.activator.derivative(x))
    }

    /// Computes gradient adjustments. Returns (weights_grad, biases_grad).
    /// `next_layer_delta` is ∂L/∂a for this layer (error in activation space).
    pub fn compute_gradients(
        &self,
        next_layer_delta: &Matrix,
        inputs: &Matrix,
    ) -> (Matrix, Matrix) {
        // δ = error ⊙ σ'(z)
        let layer_delta = next_layer_delta.hadamard(&self.activation_derivative());
        self.compute_gradients_from_logits(layer_delta, inputs)
    }

    /// Same as `compute_gradients` but `layer_delta` is already ∂L/∂z.
    pub fn compute_gradients_from_logits(
        &self,
        layer_delta: Matrix,
        inputs: &Matrix,
    ) -> (Matrix, Matrix) {
        let weights_adjustment = inputs.transpose_dot(&layer_delta);
        (weights_adjustment, layer_delta)
    }

    /// Subtracts pre-scaled parameter steps.
    pub fn apply_step(&mut self, weights_step: &Matrix, biases_step: &Matrix) {
        self.weights = std::mem::take(&mut self.weights) - weights_step.clone();
        self.biases = std::mem::take(&mut self.biases) - biases_step.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn fixed_layer(activation: ActivationFunction) -> Layer {
        let weights = Matrix::from_data(vec![vec![1.0, -1.0], vec![0.5, 2.0]]);
        let biases = Matrix::row(vec![0.0, 1.0]);
        Layer::from_parts(weights, biases, activation)
    }

    #[test]
    fn new_layer_has_requested_shape_and_zero_bias() {
        let layer = Layer::new(3, 5, ActivationFunction::ReLU, &mut StdRng::seed_from_u64(1));
        assert_eq!((layer.weights.rows, layer.weights.cols), (5, 3));
        assert!(layer.biases.values().all(|&b| b == 0.0));
        assert_eq!(layer.n_par(), 18);
    }

    #[test]
    fn predict_matches_feed_from() {
        let mut layer = fixed_layer(ActivationFunction::ReLU);
        let (z, a) = layer.predict(&[1.0, 1.0]);
        assert_eq!(z, vec![1.5, 2.0]);
        assert_eq!(a, vec![1.5, 2.0]);
        assert_eq!(layer.feed_from(&[1.0, 1.0]), a);
    }

    #[test]
    fn gradients_are_outer_product_of_input_and_delta() {
        let mut layer = fixed_layer(ActivationFunction::ReLU);
        layer.feed_from(&[2.0, -1.0]);
        // z = [1.5, -3.0]: second unit is inactive.
        let delta = Matrix::row(vec![1.0, 1.0]);
        let (w, b) = layer.compute_gradients(&delta, &Matrix::row(vec![2.0, -1.0]));
        assert_eq!(b.first_row(), &[1.0, 0.0]);
        assert_eq!(w.data, vec![vec![2.0, 0.0], vec![-1.0, 0.0]]);
    }

    #[test]
    fn apply_step_moves_against_the_step() {
        let mut layer = fixed_layer(ActivationFunction::Sigmoid);
        let w_step = Matrix::from_data(vec![vec![0.5, 0.0], vec![0.0, 0.0]]);
        let b_step = Matrix::row(vec![0.0, 0.25]);
        layer.apply_step(&w_step, &b_step);
        assert_eq!(layer.weights.data[0][0], 0.5);
        assert_eq!(layer.biases.first_row(), &[0.0, 0.75]);
    }
}
