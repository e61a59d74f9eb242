mod apply;
mod jacob;
mod train;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use sann::Model;

pub use apply::ApplyArgs;
pub use jacob::JacobArgs;
pub use train::TrainArgs;

/// Train and apply small feed-forward neural networks on tab-separated data.
#[derive(Parser, Debug)]
#[command(name = "sann", version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train a model on an input table and a target table
    Train(TrainArgs),
    /// Print the model's predictions for every row of a table
    Apply(ApplyArgs),
    /// Print the mean input Jacobian of every output
    Jacob(JacobArgs),
    /// Print the version
    Version,
}

pub fn dispatch(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Train(args) => train::run(args),
        Command::Apply(args) => apply::run(args),
        Command::Jacob(args) => jacob::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Loads a single-file model, or a split one when `weights` is given.
pub(crate) fn load_model(model: &Path, weights: Option<&PathBuf>) -> anyhow::Result<Model> {
    let loaded = match weights {
        Some(weights) => Model::load_split(model, weights).with_context(|| {
            format!("loading model {} with weights {}", model.display(), weights.display())
        })?,
        None => Model::load_json(model)
            .with_context(|| format!("loading model {}", model.display()))?,
    };
    debug!(
        inputs = loaded.n_in(),
        outputs = loaded.n_out(),
        parameters = loaded.network.n_par(),
        "loaded model"
    );
    Ok(loaded)
}

pub(crate) fn read_table(path: &Path) -> anyhow::Result<sann::Table> {
    sann::read_table(path).with_context(|| format!("reading table {}", path.display()))
}
