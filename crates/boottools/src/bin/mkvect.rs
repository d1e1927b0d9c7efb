use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use boottools::logger;
use boottools::TrapTableGenerator;
use clap::Parser;

/// Generates the interrupt entry stubs and the trap_handlers table.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Assembly file to write. Printed to stdout when omitted
    output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    logger::init(logger::level_for_verbosity(args.verbose))?;

    let generator = TrapTableGenerator::default();

    match &args.output {
        Some(path) => {
            generator.write_to_file(path)?;
            log::info!("generated {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            generator
                .write_to(&mut stdout.lock())
                .context("failed to write trap table to stdout")?;
        }
    }

    Ok(())
}
