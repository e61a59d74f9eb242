use rand::Rng;
use tracing::info;

use crate::error::{Result, SannError};
use crate::network::model::Model;
use crate::train::epoch_stats::TrainSummary;
use crate::train::loop_fn::train_loop;
use crate::train::train_config::TrainConfig;

/// Trains `model` on the paired samples `x` / `y`.
///
/// The last `config.validation_size(n)` samples are held out for early
/// stopping; shuffle beforehand if the input order is not random. The
/// optimizer and learning rate come from `config`.
pub fn train_network<R: Rng + ?Sized>(
    model: &mut Model,
    x: &[Vec<f64>],
    y: &[Vec<f64>],
    config: &TrainConfig,
    rng: &mut R,
) -> Result<TrainSummary> {
    config.validate()?;
    if x.len() != y.len() {
        return Err(SannError::shape(format!(
            "input has {} rows but output has {}",
            x.len(),
            y.len()
        )));
    }

    let n_val = config.validation_size(x.len());
    let n_train = x.len() - n_val;
    if n_train == 0 {
        return Err(SannError::config("no samples left for training"));
    }
    let (train_x, val_x) = x.split_at(n_train);
    let (train_y, val_y) = y.split_at(n_train);

    let learning_rate = config.learning_rate();
    info!(
        train = n_train,
        validation = n_val,
        parameters = model.network.n_par(),
        optimizer = %config.optimizer,
        learning_rate,
        "training"
    );

    let mut optimizer = config.optimizer.build(learning_rate);
    let (val_inputs, val_labels) = if n_val > 0 {
        (Some(val_x), Some(val_y))
    } else {
        (None, None)
    };
    let loss = model.spec.loss;
    train_loop(
        &mut model.network,
        loss,
        train_x,
        train_y,
        val_inputs,
        val_labels,
        optimizer.as_mut(),
        config,
        rng,
    )
}
