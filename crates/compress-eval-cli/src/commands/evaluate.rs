//! Evaluate command.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use compress_eval::{EvalConfig, EvalSession, FailurePolicy, SourceImage};

/// Exit status when the report was written but some strategies were skipped.
///
/// Distinct from 1 (fatal error) and 2 (clap usage error).
pub const EXIT_PARTIAL: u8 = 3;

pub struct Options {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub fail_fast: bool,
    pub write_csv: bool,
}

pub fn run(options: Options) -> Result<ExitCode> {
    let skipped = evaluate(&options)?;
    if skipped == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL))
    }
}

/// Run the session, print the summary and write the report.
///
/// Returns the number of skipped strategies.
fn evaluate(options: &Options) -> Result<usize> {
    // Load before touching the output directory so a bad input leaves no files behind.
    let source = SourceImage::open(&options.input)
        .with_context(|| format!("input stage: cannot read {}", options.input.display()))?;

    let config = EvalConfig::builder()
        .output_dir(&options.output_dir)
        .failure_policy(if options.fail_fast {
            FailurePolicy::Abort
        } else {
            FailurePolicy::SkipFailed
        })
        .write_csv(options.write_csv)
        .build();
    let session = EvalSession::new(config);

    let evaluation = session
        .evaluate(&source)
        .map_err(|e| anyhow::anyhow!("{} stage: {}", e.stage(), e))?;
    let failures = evaluation.failures.clone();
    let report = evaluation.into_report(&source);

    println!();
    print!("{}", report.render_summary());

    for failure in &failures {
        eprintln!(
            "warning: strategy '{}' skipped: {}",
            failure.strategy, failure.reason
        );
    }

    let written = session
        .write_report(&report)
        .context("report stage: results above were not saved")?;
    for path in &written {
        println!("Report saved to: {}", path.display());
    }

    Ok(failures.len())
}
