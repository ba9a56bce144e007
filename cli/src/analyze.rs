//! Structural checks over one or more captures.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cscfed_core::analyze::Analyzer;
use cscfed_core::telemetry::{Stage, TelemetryTimer};

use crate::input;
use crate::output;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Raw capture files, analyzed in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    let mut analyzer = Analyzer::new();
    let mut timer = TelemetryTimer::new();

    for path in &args.inputs {
        let source = input::open(path)?;
        timer
            .time(Stage::Unpack, || analyzer.analyze_source(source))
            .with_context(|| format!("analyzing {}", path.display()))?;
    }
    timer.finish();
    output::log_timings(&timer);

    let report = analyzer.into_report();
    if args.json {
        return output::print_json(&report);
    }

    for issue in &report.issues {
        output::print_red(&issue.to_string());
    }
    println!(
        "{} files, {} events, {} with issues",
        report.files, report.events, report.events_with_issues
    );
    Ok(())
}
