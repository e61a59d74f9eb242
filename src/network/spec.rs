use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Result, SannError};
use crate::loss::loss_type::LossType;
use crate::network::metadata::ModelMetadata;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`       — number of neurons in this layer
/// - `input_size` — number of neurons feeding into this layer (i.e. the output
///                  size of the previous layer, or the raw input dimension for
///                  the first layer)
/// - `activation` — activation function applied after the linear transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// The architecture of a model: its layers, the loss it is trained with and
/// optional metadata. This is what the split format writes to the
/// architecture file, separately from the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    /// Loss function to pair with this network during training.
    pub loss: LossType,
    #[serde(default)]
    pub metadata: ModelMetadata,
}

impl NetworkSpec {
    /// The standard multi-layer perceptron: `hidden` layers using
    /// `hidden_activation`, then an output layer whose activation is chosen
    /// by the loss.
    pub fn mlp(
        n_in: usize,
        hidden: &[usize],
        hidden_activation: ActivationFunction,
        n_out: usize,
        loss: LossType,
    ) -> Result<NetworkSpec> {
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut input_size = n_in;
        for &size in hidden {
            layers.push(LayerSpec { size, input_size, activation: hidden_activation });
            input_size = size;
        }
        layers.push(LayerSpec { size: n_out, input_size, activation: loss.output_activation() });

        let spec = NetworkSpec { layers, loss, metadata: ModelMetadata::default() };
        spec.validate()?;
        Ok(spec)
    }

    pub fn n_in(&self) -> usize {
        self.layers.first().map(|l| l.input_size).unwrap_or(0)
    }

    pub fn n_out(&self) -> usize {
        self.layers.last().map(|l| l.size).unwrap_or(0)
    }

    /// Checks that layers chain and are non-empty, that softmax and
    /// cross-entropy only appear together, and that metadata widths match.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(SannError::config("a network needs at least one layer"));
        }
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.size == 0 || layer.input_size == 0 {
                return Err(SannError::config(format!("layer {} has zero width", i + 1)));
            }
            if i > 0 && layer.input_size != self.layers[i - 1].size {
                return Err(SannError::shape(format!(
                    "layer {} expects {} inputs but layer {} has {} neurons",
                    i + 1, layer.input_size, i, self.layers[i - 1].size
                )));
            }
            let softmax = layer.activation == ActivationFunction::Softmax;
            if softmax && (i != last || self.loss != LossType::CrossEntropy) {
                return Err(SannError::config(
                    "softmax is only supported as the output of a cross-entropy model",
                ));
            }
        }
        if self.loss == LossType::CrossEntropy && self.layers[last].activation != ActivationFunction::Softmax {
            return Err(SannError::config("cross-entropy models need a softmax output layer"));
        }
        self.metadata.validate(self.n_in(), self.n_out())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mlp_chains_hidden_layers_into_output() {
        let spec = NetworkSpec::mlp(10, &[8, 4], ActivationFunction::ReLU, 3, LossType::BinaryCrossEntropy)
            .unwrap();
        assert_eq!(spec.layers.len(), 3);
        assert_eq!(spec.layers[1].input_size, 8);
        assert_eq!(spec.layers[2], LayerSpec { size: 3, input_size: 4, activation: ActivationFunction::Sigmoid });
        assert_eq!((spec.n_in(), spec.n_out()), (10, 3));
    }

    #[test]
    fn cross_entropy_gets_softmax_output() {
        let spec = NetworkSpec::mlp(2, &[5], ActivationFunction::Tanh, 2, LossType::CrossEntropy).unwrap();
        assert_eq!(spec.layers[1].activation, ActivationFunction::Softmax);
    }

    #[test]
    fn rejects_zero_width_hidden_layer() {
        let err = NetworkSpec::mlp(2, &[0], ActivationFunction::ReLU, 1, LossType::Mse).unwrap_err();
        assert!(matches!(err, SannError::Config(_)));
    }

    #[test]
    fn rejects_broken_chain() {
        let mut spec = NetworkSpec::mlp(2, &[3], ActivationFunction::ReLU, 1, LossType::Mse).unwrap();
        spec.layers[1].input_size = 4;
        assert!(matches!(spec.validate(), Err(SannError::Shape(_))));
    }

    #[test]
    fn rejects_softmax_hidden_layer() {
        let err = NetworkSpec::mlp(2, &[3], ActivationFunction::Softmax, 2, LossType::CrossEntropy)
            .unwrap_err();
        assert!(matches!(err, SannError::Config(_)));
    }
}
