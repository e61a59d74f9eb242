use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use tracing::warn;

use sann::data::output::{write_header, write_row};
use sann::data::table::check_same_rows;

#[derive(Args, Debug)]
pub struct JacobArgs {
    /// Read weights from FILE; MODEL is then the architecture file
    #[arg(short = 'W', value_name = "FILE")]
    weights: Option<PathBuf>,

    /// Model file
    model: PathBuf,

    /// Input table
    input: PathBuf,

    /// Target table; selects the samples averaged for each output
    targets: PathBuf,
}

pub fn run(args: JacobArgs) -> anyhow::Result<()> {
    let model = super::load_model(&args.model, args.weights.as_ref())?;
    let x = super::read_table(&args.input)?;
    let y = super::read_table(&args.targets)?;
    check_same_rows(&x, &y)?;
    if x.is_empty() {
        bail!("{} has no samples", args.input.display());
    }
    if x.n_cols() != model.n_in() {
        bail!("{} has {} columns, the model expects {}", args.input.display(), x.n_cols(), model.n_in());
    }
    if y.n_cols() != model.n_out() {
        bail!("{} has {} columns, the model has {} outputs", args.targets.display(), y.n_cols(), model.n_out());
    }

    let metadata = &model.spec.metadata;
    let input_names = x.col_names.as_ref().or(metadata.input_names.as_ref());
    let output_names = y.col_names.as_ref().or(metadata.output_names.as_ref());

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    if let Some(names) = input_names {
        write_header(&mut out, "out", names)?;
    }
    for (k, mean) in model.network.mean_jacobian(&x.rows, &y.rows).into_iter().enumerate() {
        let name = output_names
            .and_then(|names| names.get(k).cloned())
            .unwrap_or_else(|| format!("o{}", k + 1));
        let row = mean.unwrap_or_else(|| {
            warn!(output = %name, "no sample has a positive target; printing zeros");
            vec![0.0; model.n_in()]
        });
        write_row(&mut out, &name, &row)?;
    }
    out.flush()?;
    Ok(())
}
