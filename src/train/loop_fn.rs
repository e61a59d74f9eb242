use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::error::{Result, SannError};
use crate::loss::loss_type::LossType;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::Optimizer;
use crate::train::epoch_stats::{EpochStats, TrainSummary};
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for up to `config.epochs` epochs.
///
/// # Arguments
/// - `network`      — mutable reference to the network; modified in place
/// - `loss_type`    — loss the network is trained against
/// - `train_inputs` — training samples, each a `Vec<f64>` of length `n_in`
/// - `train_labels` — corresponding targets, same length as `train_inputs`
/// - `val_inputs`   — optional validation samples
/// - `val_labels`   — optional validation targets (required iff `val_inputs` is `Some`)
/// - `optimizer`    — applies the averaged mini-batch gradients
/// - `config`       — hyperparameters
/// - `rng`          — drives the per-epoch shuffling
///
/// # Early termination
/// With a validation set the loop stops once the validation loss has not
/// beaten its best value for more than `config.patience` epochs, or has
/// risen over the previous epoch more than `config.patience / 2` times in a
/// row. The network with the lowest validation loss is restored before
/// returning.
#[allow(clippy::too_many_arguments)]
pub fn train_loop<R: Rng + ?Sized>(
    network: &mut Network,
    loss_type: LossType,
    train_inputs: &[Vec<f64>],
    train_labels: &[Vec<f64>],
    val_inputs: Option<&[Vec<f64>]>,
    val_labels: Option<&[Vec<f64>]>,
    optimizer: &mut dyn Optimizer,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<TrainSummary> {
    config.validate()?;
    if train_inputs.is_empty() {
        return Err(SannError::config("no training samples"));
    }
    check_pairs(network, train_inputs, train_labels)?;
    let validation = match (val_inputs, val_labels) {
        (Some(vi), Some(vl)) if !vi.is_empty() => {
            check_pairs(network, vi, vl)?;
            Some((vi, vl))
        }
        (Some(vi), None) if !vi.is_empty() => {
            return Err(SannError::config("validation inputs given without labels"));
        }
        _ => None,
    };

    let mut history = Vec::new();
    let mut last_train_loss = 0.0;
    let mut best: Option<(f64, Network)> = None;
    let mut stopper = EarlyStopping::new(config.patience);
    let mut stopped_early = false;

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        let (train_loss, train_accuracy) = run_one_epoch(
            network,
            loss_type,
            train_inputs,
            train_labels,
            optimizer,
            config,
            rng,
        );
        last_train_loss = train_loss;

        // ── Validation ────────────────────────────────────────────────────
        let (val_loss, val_accuracy) = match validation {
            Some((vi, vl)) => {
                let (l, a) = evaluate(network, loss_type, vi, vl);
                (Some(l), Some(a))
            }
            None => (None, None),
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            val_loss,
            train_accuracy,
            val_accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        info!(
            epoch,
            train_loss = stats.train_loss,
            train_accuracy = stats.train_accuracy,
            val_loss = ?stats.val_loss,
            val_accuracy = ?stats.val_accuracy,
            elapsed_ms = stats.elapsed_ms,
            "epoch finished"
        );
        history.push(stats);

        // ── Early stopping ────────────────────────────────────────────────
        let Some(val) = val_loss else { continue };
        if stopper.observe(val) {
            best = Some((val, network.clone()));
        }
        if stopper.should_stop() {
            debug!(
                epoch,
                since_best = stopper.since_best,
                rising = stopper.rising,
                "validation loss stopped improving"
            );
            stopped_early = true;
            break;
        }
    }

    let best_val_loss = best.map(|(v, net)| {
        *network = net;
        v
    });

    Ok(TrainSummary {
        epochs_run: history.len(),
        train_loss: last_train_loss,
        best_val_loss,
        stopped_early,
        history,
    })
}

/// Mean loss and accuracy over a dataset without touching the weights.
pub fn evaluate(
    network: &Network,
    loss_type: LossType,
    inputs: &[Vec<f64>],
    labels: &[Vec<f64>],
) -> (f64, f64) {
    let n = inputs.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let (total, correct) = inputs.iter().zip(labels.iter())
        .fold((0.0, 0usize), |(total, correct), (input, label)| {
            let output = network.predict(input);
            let hit = loss_type.is_correct(&output, label) as usize;
            (total + loss_type.loss(&output, label), correct + hit)
        });
    (total / n as f64, correct as f64 / n as f64)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Early-stopping bookkeeping over the per-epoch validation loss.
///
/// `since_best` counts epochs worse than the best so far and `rising` counts
/// consecutive epochs worse than the previous one. An equal loss leaves
/// both counters alone.
#[derive(Debug)]
struct EarlyStopping {
    patience: usize,
    best: f64,
    prev: f64,
    since_best: usize,
    rising: usize,
}

impl EarlyStopping {
    fn new(patience: usize) -> Self {
        EarlyStopping {
            patience,
            best: f64::INFINITY,
            prev: f64::INFINITY,
            since_best: 0,
            rising: 0,
        }
    }

    /// Records one epoch. Returns `true` for a new best loss.
    fn observe(&mut self, val: f64) -> bool {
        let improved = val < self.best;
        if improved {
            self.best = val;
            self.since_best = 0;
        } else if val > self.best {
            self.since_best += 1;
        }
        if val < self.prev {
            self.rising = 0;
        } else if val > self.prev {
            self.rising += 1;
        }
        self.prev = val;
        improved
    }

    fn should_stop(&self) -> bool {
        self.since_best > self.patience || self.rising > self.patience / 2
    }
}

/// Runs one full epoch of mini-batch updates over the training data.
/// Returns the mean loss and the accuracy over all samples.
fn run_one_epoch<R: Rng + ?Sized>(
    network: &mut Network,
    loss_type: LossType,
    inputs: &[Vec<f64>],
    labels: &[Vec<f64>],
    optimizer: &mut dyn Optimizer,
    config: &TrainConfig,
    rng: &mut R,
) -> (f64, f64) {
    let n = inputs.len();
    let mut total_loss = 0.0;
    let mut correct = 0usize;

    // Shuffle sample order each epoch.
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    for batch in indices.chunks(config.batch_size) {
        let mut acc_grads: Vec<(Matrix, Matrix)> = network.layers.iter()
            .map(|layer| (
                Matrix::zeros(layer.weights.rows, layer.weights.cols),
                Matrix::zeros(layer.biases.rows, layer.biases.cols),
            ))
            .collect();

        for &idx in batch {
            let input    = &inputs[idx];
            let expected = &labels[idx];

            let output = network.forward(input);
            total_loss += loss_type.loss(&output, expected);
            if loss_type.is_correct(&output, expected) {
                correct += 1;
            }

            backprop(network, loss_type, input, &output, expected, &mut acc_grads);
        }

        // Add the L2 penalty to the summed gradient, average and apply.
        let inv_batch = 1.0 / batch.len() as f64;
        for (i, (w_acc, b_acc)) in acc_grads.into_iter().enumerate() {
            let layer = &mut network.layers[i];
            let w_grad = average_with_penalty(w_acc, &layer.weights, inv_batch, config.l2);
            let b_grad = average_with_penalty(b_acc, &layer.biases, inv_batch, config.l2);
            optimizer.step(i, layer, &w_grad, &b_grad);
        }
    }

    (total_loss / n as f64, correct as f64 / n as f64)
}

/// Backward pass for one sample whose forward pass has just run; adds the
/// gradients of every layer into `acc_grads`.
fn backprop(
    network: &Network,
    loss_type: LossType,
    input: &[f64],
    output: &[f64],
    expected: &[f64],
    acc_grads: &mut [(Matrix, Matrix)],
) {
    let last = network.layers.len() - 1;
    let output_activation = network.layers[last].activator;
    let paired = loss_type.pairs_with(output_activation);

    // ∂L/∂z when loss and output activation combine, ∂L/∂a otherwise.
    let mut delta = if paired {
        Matrix::row(loss_type.logit_gradient(output, expected))
    } else {
        Matrix::row(loss_type.derivative(output, expected))
    };

    for i in (0..=last).rev() {
        let input_for_layer = if i == 0 {
            Matrix::row(input.to_vec())
        } else {
            network.layers[i - 1].neurons.clone()
        };

        let layer = &network.layers[i];
        let (w_grad, b_grad) = if i == last && paired {
            layer.compute_gradients_from_logits(delta, &input_for_layer)
        } else {
            layer.compute_gradients(&delta, &input_for_layer)
        };

        // Propagate δ_i through weights to get ∂L/∂a_{i-1}.
        delta = b_grad.dot(&layer.weights.transpose());

        acc_grads[i].0 += &w_grad;
        acc_grads[i].1 += &b_grad;
    }
}

/// `(Σg + l2·θ) / batch`: the penalty is shared by the whole batch.
fn average_with_penalty(sum: Matrix, params: &Matrix, inv_batch: f64, l2: f64) -> Matrix {
    let mut grad = sum;
    for (g, &p) in grad.values_mut().zip(params.values()) {
        *g = (*g + l2 * p) * inv_batch;
    }
    grad
}

fn check_pairs(network: &Network, inputs: &[Vec<f64>], labels: &[Vec<f64>]) -> Result<()> {
    if inputs.len() != labels.len() {
        return Err(SannError::shape(format!(
            "{} input samples but {} targets",
            inputs.len(),
            labels.len()
        )));
    }
    let (n_in, n_out) = (network.n_in(), network.n_out());
    if let Some(bad) = inputs.iter().position(|x| x.len() != n_in) {
        return Err(SannError::shape(format!(
            "sample {} has {} inputs, the network expects {n_in}",
            bad + 1,
            inputs[bad].len()
        )));
    }
    if let Some(bad) = labels.iter().position(|y| y.len() != n_out) {
        return Err(SannError::shape(format!(
            "target {} has {} values, the network produces {n_out}",
            bad + 1,
            labels[bad].len()
        )));
    }
    Ok(())
}
