use crate::{math::matrix::Matrix, layers::dense::Layer, optim::Optimizer};

/// Plain mini-batch gradient descent.
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, _layer_index: usize, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &Matrix) {
        let lr = self.learning_rate;
        layer.apply_step(&weights_grad.map(|g| g * lr), &biases_grad.map(|g| g * lr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;

    #[test]
    fn step_scales_gradient_by_learning_rate() {
        let mut layer = Layer::from_parts(
            Matrix::from_data(vec![vec![1.0]]),
            Matrix::row(vec![0.0]),
            ActivationFunction::Sigmoid,
        );
        let mut sgd = Sgd::new(0.1);
        sgd.step(0, &mut layer, &Matrix::from_data(vec![vec![2.0]]), &Matrix::row(vec![-1.0]));
        assert!((layer.weights.data[0][0] - 0.8).abs() < 1e-12);
        assert!((layer.biases.data[0][0] - 0.1).abs() < 1e-12);
    }
}
