/// Per-epoch training statistics produced by `train_loop`.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Maximum epochs requested for this run.
    pub total_epochs: usize,
    /// Mean training loss over all samples in this epoch, measured while
    /// the weights were being updated.
    pub train_loss: f64,
    /// Mean validation loss, if a validation set was provided.
    pub val_loss: Option<f64>,
    /// Fraction of training samples predicted correctly during the epoch.
    pub train_accuracy: f64,
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Outcome of a whole training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    pub epochs_run: usize,
    /// Training loss of the last completed epoch.
    pub train_loss: f64,
    /// Lowest validation loss seen; the returned network is the one that
    /// achieved it.
    pub best_val_loss: Option<f64>,
    pub stopped_early: bool,
    pub history: Vec<EpochStats>,
}
