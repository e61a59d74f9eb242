pub mod rmsprop;
pub mod sgd;

use std::fmt;
use std::str::FromStr;

use crate::error::SannError;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;

pub use rmsprop::RmsProp;
pub use sgd::Sgd;

/// Applies one mini-batch update to a layer given its averaged gradients.
pub trait Optimizer {
    fn step(&mut self, layer_index: usize, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &Matrix);
}

/// Mini-batch optimisation algorithm selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerKind {
    Sgd,
    #[default]
    RmsProp,
}

impl OptimizerKind {
    pub fn default_learning_rate(&self) -> f64 {
        match self {
            OptimizerKind::Sgd => 0.01,
            OptimizerKind::RmsProp => 0.001,
        }
    }

    pub fn build(&self, learning_rate: f64) -> Box<dyn Optimizer> {
        match self {
            OptimizerKind::Sgd => Box::new(Sgd::new(learning_rate)),
            OptimizerKind::RmsProp => Box::new(RmsProp::new(learning_rate)),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = SannError;

    /// Accepts names or the numeric codes 1 (SGD) and 2 (RMSprop).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "sgd" => Ok(OptimizerKind::Sgd),
            "2" | "rmsprop" => Ok(OptimizerKind::RmsProp),
            other => Err(SannError::parse(format!("unknown optimizer '{other}'"))),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::RmsProp => "rmsprop",
        })
    }
}
