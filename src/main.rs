//! sann: train and apply small feed-forward networks on tab-separated tables.

mod cli;

use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let started = Instant::now();
    cli::dispatch(cli.command)?;

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    info!(
        command = %command_line,
        elapsed_s = started.elapsed().as_secs_f64(),
        "done"
    );
    Ok(())
}

/// Human-readable logs on stderr; stdout carries models and predictions.
/// `RUST_LOG` takes precedence over the `-v`/`-q` flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
