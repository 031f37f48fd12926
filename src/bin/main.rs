//! Mask Compositor CLI
//!
//! Composite a material texture set from color-coded masks described by a
//! YAML configuration.

use clap::{ArgAction, Parser};
use mask_compositor::{run, CompositeJob};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mask-compositor")]
#[command(author, version, about = "Composite material texture sets using color-coded masks", long_about = None)]
struct Cli {
    /// YAML configuration file; its stem names the output files
    config: PathBuf,

    /// Validate the configuration and print the resolved job as JSON
    /// without decoding or writing any image
    #[arg(long)]
    dry_run: bool,

    /// Output file format (e.g. "png", "tga"), overriding output.format
    #[arg(short, long)]
    format: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("Loading config from {:?}...", cli.config);
    let mut job = CompositeJob::from_path(&cli.config)?;
    if let Some(format) = &cli.format {
        job.set_output_format(format)?;
    }

    if cli.dry_run {
        println!("{}", job.to_json()?);
        return Ok(());
    }

    let written = run(&job)?;
    info!("Wrote {} layers to {:?}", written.len(), job.output.directory);

    Ok(())
}

/// Install the fmt subscriber. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
