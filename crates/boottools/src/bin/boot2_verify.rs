use std::path::PathBuf;
use std::process;

use anyhow::Result;
use boottools::logger;
use boottools::{verify_with_source, GateError, VerifyConfig, VerifyReport};
use clap::{Parser, ValueEnum};
use colored::*;

const FATAL_ERROR_STRING: &str = "FATAL ERROR: Boot stage 2";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Checks that every section of the second-stage boot loader fits in the
/// disk sectors reserved for it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Prefix of the per-section files (`<base>.text`, `<base>.data`, ...).
    /// Defaults to $BOOT_STAGE2_BASE or ./boot-stage2
    #[arg(short, long, conflicts_with = "elf")]
    base: Option<PathBuf>,

    /// Read section sizes from the linked ELF image instead
    #[arg(short, long)]
    elf: Option<PathBuf>,

    /// Output format for the verified report
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = logger::init(logger::level_for_verbosity(args.verbose)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if args.format == Format::Text {
        println!("*** Boot stage 2 verification ***");
    }

    let mut config = VerifyConfig::from_env();
    if let Some(base) = args.base.clone() {
        config = config.with_base(base);
    }
    if let Some(elf) = args.elf.clone() {
        config = config.with_elf(elf);
    }

    match run(&config) {
        Ok(report) => {
            if let Err(e) = print_report(&report, args.format) {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
            if args.format == Format::Text {
                println!("Boot stage 2 has been verified.");
            }
        }
        Err(e) => {
            print_failure(&e, args.format);
            process::exit(1);
        }
    }
}

fn run(config: &VerifyConfig) -> Result<VerifyReport, GateError> {
    let source = config.source()?;
    verify_with_source(&config.limits, source.as_ref())
}

fn print_report(report: &VerifyReport, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        Format::Text => {
            for usage in &report.sections {
                println!(
                    "  {:<8} {:>6} / {:>6} bytes  {:>3} sectors  {:5.1}%  [{}]",
                    usage.section,
                    usage.size,
                    usage.limit,
                    usage.sectors_used(),
                    usage.percent_used(),
                    " OK ".green()
                );
            }
        }
    }
    Ok(())
}

fn print_failure(err: &GateError, format: Format) {
    match format {
        Format::Json => {
            let failure = serde_json::json!({
                "verified": false,
                "section": err.section(),
                "error": err.to_string(),
            });
            println!("{}", failure);
        }
        Format::Text => {
            println!("{}", FATAL_ERROR_STRING.red().bold());
            println!("{}", err);
        }
    }
}
