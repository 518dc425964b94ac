//! compress-eval CLI - compare compression strategies on one image

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use compress_eval::eval::session::DEFAULT_OUTPUT_DIR;
use log::LevelFilter;

mod commands;

/// Run every built-in compression strategy on an image and rank the results.
#[derive(Parser)]
#[command(name = "compress-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input image
    input: PathBuf,

    /// Directory for artifacts and the report
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, env = "COMPRESS_EVAL_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Stop at the first failing strategy instead of skipping it
    #[arg(long)]
    fail_fast: bool,

    /// Do not write the CSV summary
    #[arg(long)]
    no_csv: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    commands::evaluate::run(commands::evaluate::Options {
        input: cli.input,
        output_dir: cli.output_dir,
        fail_fast: cli.fail_fast,
        write_csv: !cli.no_csv,
    })
}
