use crate::error::{Result, SannError};
use crate::optim::OptimizerKind;

/// Hyperparameters for a training run.
///
/// # Fields
/// - `epochs`              — maximum number of full passes over the training data
/// - `batch_size`          — samples per mini-batch; use `1` for online updates
/// - `optimizer`           — mini-batch algorithm (SGD or RMSprop)
/// - `learning_rate`       — `None` picks the optimizer's default
/// - `l2`                  — L2 penalty added to every parameter's gradient
/// - `validation_fraction` — share of samples held out to monitor overfitting
/// - `patience`            — epochs without a new best validation loss before
///                           training stops
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub optimizer: OptimizerKind,
    pub learning_rate: Option<f64>,
    pub l2: f64,
    pub validation_fraction: f64,
    pub patience: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 20,
            batch_size: 64,
            optimizer: OptimizerKind::default(),
            learning_rate: None,
            l2: 0.001,
            validation_fraction: 0.1,
            patience: 10,
        }
    }
}

impl TrainConfig {
    /// Creates a config with the given epoch count and batch size and
    /// defaults for everything else.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        TrainConfig { epochs, batch_size, ..Default::default() }
    }

    /// The learning rate actually used.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate.unwrap_or_else(|| self.optimizer.default_learning_rate())
    }

    /// Number of samples held out for validation out of `n`.
    pub fn validation_size(&self, n: usize) -> usize {
        (n as f64 * self.validation_fraction).floor() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(SannError::config("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(SannError::config("batch size must be at least 1"));
        }
        let lr = self.learning_rate();
        if !(lr.is_finite() && lr > 0.0) {
            return Err(SannError::config(format!("learning rate must be positive, got {lr}")));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(SannError::config(format!("L2 penalty must be non-negative, got {}", self.l2)));
        }
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(SannError::config(format!(
                "validation fraction must be in [0, 1), got {}",
                self.validation_fraction
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = TrainConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.learning_rate(), 0.001);
    }

    #[test]
    fn learning_rate_follows_optimizer_unless_set() {
        let mut cfg = TrainConfig { optimizer: OptimizerKind::Sgd, ..Default::default() };
        assert_eq!(cfg.learning_rate(), 0.01);
        cfg.learning_rate = Some(0.5);
        assert_eq!(cfg.learning_rate(), 0.5);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(TrainConfig::new(0, 10).validate().is_err());
        assert!(TrainConfig::new(5, 0).validate().is_err());
        let bad_frac = TrainConfig { validation_fraction: 1.0, ..Default::default() };
        assert!(bad_frac.validate().is_err());
        let bad_lr = TrainConfig { learning_rate: Some(0.0), ..Default::default() };
        assert!(bad_lr.validate().is_err());
        let bad_l2 = TrainConfig { l2: -0.1, ..Default::default() };
        assert!(bad_l2.validate().is_err());
    }

    #[test]
    fn validation_size_rounds_down() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.validation_size(4), 0);
        assert_eq!(cfg.validation_size(25), 2);
    }
}
