//! pixi-sync binary
//!
//! Validates that the pixi sections of a `pyproject.toml` mirror its dependency groups.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p pixi-sync -- --manifest path/to/pyproject.toml
//! ```
//!
//! # Exit status
//!
//! - `0`: every pixi table matches its dependency group
//! - `1`: at least one table is out of sync; the differences are printed
//! - `2`: the manifest cannot be read or parsed
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter directives, e.g. `debug` or `pixi_sync=trace` (default: warn)

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pixi_sync::{render_report, Manifest};

#[derive(Parser)]
#[command(
    name = "pixi-sync",
    about = "Check that pixi dependency tables mirror the dependency groups",
    version
)]
struct Cli {
    /// Path to the manifest
    #[arg(long, default_value = "pyproject.toml")]
    manifest: PathBuf,
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let manifest = Manifest::from_file(&cli.manifest)?;
    let differences = manifest
        .differences()
        .with_context(|| format!("resolving dependency groups of {}", cli.manifest.display()))?;
    debug!("{} differences", differences.len());

    if differences.is_empty() {
        return Ok(true);
    }
    println!("{}", render_report(&differences));
    Ok(false)
}

fn main() -> ExitCode {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
