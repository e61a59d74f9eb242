use crate::{math::matrix::Matrix, layers::dense::Layer, optim::Optimizer};

/// Added to the running mean square before the square root.
const EPS: f64 = 1e-6;

/// RMSprop: each parameter's step is the gradient divided by a running
/// root-mean-square of its recent gradients.
///
///   r ← decay·r + (1 − decay)·g²
///   θ ← θ − lr / √(ε + r) · g
pub struct RmsProp {
    pub learning_rate: f64,
    pub decay: f64,
    /// Running mean squares per layer: (weights, biases). Grown lazily.
    state: Vec<(Matrix, Matrix)>,
}

impl RmsProp {
    pub fn new(learning_rate: f64) -> RmsProp {
        RmsProp { learning_rate, decay: 0.9, state: Vec::new() }
    }

    fn scaled_step(&self, mean_sq: &mut Matrix, grad: &Matrix) -> Matrix {
        let mut step = Matrix::zeros(grad.rows, grad.cols);
        for ((r, &g), s) in mean_sq.values_mut().zip(grad.values()).zip(step.values_mut()) {
            *r = self.decay * *r + (1.0 - self.decay) * g * g;
            *s = self.learning_rate / (EPS + *r).sqrt() * g;
        }
        step
    }
}

impl Optimizer for RmsProp {
    fn step(&mut self, layer_index: usize, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &Matrix) {
        while self.state.len() <= layer_index {
            self.state.push((Matrix::default(), Matrix::default()));
        }
        let (mut w_sq, mut b_sq) = std::mem::take(&mut self.state[layer_index]);
        if w_sq.rows != weights_grad.rows || w_sq.cols != weights_grad.cols {
            w_sq = Matrix::zeros(weights_grad.rows, weights_grad.cols);
            b_sq = Matrix::zeros(biases_grad.rows, biases_grad.cols);
        }

        let w_step = self.scaled_step(&mut w_sq, weights_grad);
        let b_step = self.scaled_step(&mut b_sq, biases_grad);
        layer.apply_step(&w_step, &b_step);

        self.state[layer_index] = (w_sq, b_sq);
    }
}
