use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Args};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use sann::data::table::{check_same_rows, shuffle_together};
use sann::data::STDIO_PATH;
use sann::{ActivationFunction, LossType, Model, NetworkSpec, OptimizerKind, TrainConfig};

/// `-h` sets the hidden layer sizes, so help is long-only here.
#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct TrainArgs {
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Continue training the model in FILE
    #[arg(short = 'i', value_name = "FILE")]
    init: Option<PathBuf>,

    /// Hidden layer sizes
    #[arg(short = 'h', value_name = "INT[,INT]", value_delimiter = ',', default_value = "50")]
    hidden: Vec<usize>,

    /// Hidden activation: sigm|tanh|relu or 1|2|3
    #[arg(short = 'f', value_name = "ACT", default_value = "relu")]
    activation: ActivationFunction,

    /// Random seed
    #[arg(short = 's', value_name = "INT", default_value_t = 11)]
    seed: u64,

    /// Save the model to FILE (stdout when absent)
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Save in split format: architecture to -o, weights to FILE
    #[arg(short = 'W', value_name = "FILE", requires = "output")]
    weights: Option<PathBuf>,

    /// Optimizer: sgd|rmsprop or 1|2 [default: rmsprop]
    #[arg(short = 'm', value_name = "ALGO")]
    optimizer: Option<OptimizerKind>,

    /// Learning rate [default: 0.01 for sgd, 0.001 for rmsprop]
    #[arg(short = 'e', value_name = "FLOAT")]
    learning_rate: Option<f64>,

    /// Categorical cross-entropy over a softmax output
    #[arg(short = 'c')]
    categorical: bool,

    /// L2 regularisation [default: 0.001]
    #[arg(short = 'L', value_name = "FLOAT")]
    l2: Option<f64>,

    /// Fraction of samples held out for validation [default: 0.1]
    #[arg(short = 'T', value_name = "FLOAT")]
    validation_fraction: Option<f64>,

    /// Number of epochs [default: 20]
    #[arg(short = 'n', value_name = "INT")]
    epochs: Option<usize>,

    /// Early-stopping patience in epochs [default: 10]
    #[arg(short = 'l', value_name = "INT")]
    patience: Option<usize>,

    /// Minibatch size [default: 64]
    #[arg(short = 'B', value_name = "INT")]
    batch_size: Option<usize>,

    /// Input table (`-` for stdin)
    input: PathBuf,

    /// Target table
    targets: PathBuf,
}

impl TrainArgs {
    fn config(&self) -> TrainConfig {
        let defaults = TrainConfig::default();
        TrainConfig {
            epochs: self.epochs.unwrap_or(defaults.epochs),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            optimizer: self.optimizer.unwrap_or(defaults.optimizer),
            learning_rate: self.learning_rate,
            l2: self.l2.unwrap_or(defaults.l2),
            validation_fraction: self.validation_fraction.unwrap_or(defaults.validation_fraction),
            patience: self.patience.unwrap_or(defaults.patience),
        }
    }

    fn loss(&self) -> LossType {
        if self.categorical {
            LossType::CrossEntropy
        } else {
            LossType::BinaryCrossEntropy
        }
    }
}

pub fn run(args: TrainArgs) -> anyhow::Result<()> {
    let config = args.config();
    config.validate()?;

    let mut x = super::read_table(&args.input)?;
    let mut y = super::read_table(&args.targets)?;
    check_same_rows(&x, &y)?;
    if x.is_empty() {
        bail!("{} has no samples", args.input.display());
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut model = match &args.init {
        Some(path) => restore(path, &args, x.n_cols(), y.n_cols())?,
        None => {
            let spec = NetworkSpec::mlp(x.n_cols(), &args.hidden, args.activation, y.n_cols(), args.loss())?;
            Model::new(spec, &mut rng)?
        }
    };
    if let Some(names) = x.col_names.clone() {
        model.spec.metadata.input_names = Some(names);
    }
    if let Some(names) = y.col_names.clone() {
        model.spec.metadata.output_names = Some(names);
    }

    shuffle_together(&mut x, Some(&mut y), &mut rng)?;
    let summary = sann::train_network(&mut model, &x.rows, &y.rows, &config, &mut rng)?;
    info!(
        epochs = summary.epochs_run,
        train_loss = summary.train_loss,
        best_val_loss = ?summary.best_val_loss,
        stopped_early = summary.stopped_early,
        "training finished"
    );

    let output = args.output.unwrap_or_else(|| PathBuf::from(STDIO_PATH));
    match &args.weights {
        Some(weights) => model.save_split(&output, weights).with_context(|| {
            format!("saving model to {} and {}", output.display(), weights.display())
        })?,
        None => model
            .save_json(&output)
            .with_context(|| format!("saving model to {}", output.display()))?,
    }
    Ok(())
}

/// Loads the model to continue from and checks it against the data.
fn restore(path: &Path, args: &TrainArgs, n_in: usize, n_out: usize) -> anyhow::Result<Model> {
    let model = super::load_model(path, None)?;
    if model.n_in() != n_in {
        bail!("model {} expects {} inputs, the data has {n_in}", path.display(), model.n_in());
    }
    if model.n_out() != n_out {
        bail!("model {} has {} outputs, the targets have {n_out}", path.display(), model.n_out());
    }
    if args.categorical && model.spec.loss != LossType::CrossEntropy {
        warn!(loss = ?model.spec.loss, "-c ignored: continuing with the restored model's loss");
    }
    Ok(model)
}
