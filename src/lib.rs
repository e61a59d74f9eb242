pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{LayerWeights, Model, ModelMetadata, Network, NetworkSpec, LayerSpec};
pub use loss::loss_type::LossType;
pub use optim::{Optimizer, OptimizerKind, RmsProp, Sgd};
pub use train::{train_loop, train_network, TrainConfig, TrainSummary};
pub use data::{read_table, write_predictions, Table};
pub use error::{Result, SannError};
