use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::bail;
use clap::Args;

use sann::write_predictions;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Read weights from FILE; MODEL is then the architecture file
    #[arg(short = 'W', value_name = "FILE")]
    weights: Option<PathBuf>,

    /// Model file
    model: PathBuf,

    /// Input table (`-` for stdin)
    input: PathBuf,
}

pub fn run(args: ApplyArgs) -> anyhow::Result<()> {
    let model = super::load_model(&args.model, args.weights.as_ref())?;
    let x = super::read_table(&args.input)?;
    if !x.is_empty() && x.n_cols() != model.n_in() {
        bail!(
            "{} has {} columns, the model expects {}",
            args.input.display(),
            x.n_cols(),
            model.n_in()
        );
    }

    let predictions: Vec<Vec<f64>> = x.rows.iter()
        .map(|row| model.network.predict(row))
        .collect();

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    write_predictions(
        &mut out,
        model.spec.metadata.output_names.as_deref(),
        &x.row_names,
        &predictions,
    )?;
    out.flush()?;
    Ok(())
}
