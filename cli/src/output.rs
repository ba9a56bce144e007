//! Terminal output helpers.

use std::io::IsTerminal;

use serde::Serialize;

use cscfed_core::compare::DumpLine;
use cscfed_core::telemetry::TelemetryTimer;

const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

pub fn color_enabled() -> bool {
    std::io::stdout().is_terminal()
}

pub fn print_red(line: &str) {
    if color_enabled() {
        println!("{RED}{line}{RESET}");
    } else {
        println!("{line}");
    }
}

/// Mismatching lines in red when writing to a terminal.
pub fn print_dump(lines: &[DumpLine]) {
    let color = color_enabled();
    for line in lines {
        if line.mismatch && color {
            println!("{RED}{line}{RESET}");
        } else {
            println!("{line}");
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn log_timings(timer: &TelemetryTimer) {
    for (stage, dur) in &timer.stage_times {
        tracing::debug!(%stage, secs = dur.as_secs_f64(), "stage time");
    }
    tracing::info!(
        total_secs = timer.elapsed().as_secs_f64(),
        stages = %timer.stage_times,
        "timing"
    );
}
