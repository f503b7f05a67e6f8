//! `deptboard diff` — period-over-period deltas between two snapshot files.

use std::path::{Path, PathBuf};

use deptboard_report::diff::diff_snapshots;
use deptboard_report::{ReportSnapshot, SnapshotDiff};

use crate::exit_codes::EXIT_SNAPSHOT_IO;
use crate::util::{display_width, pad_right};
use crate::CliError;

fn snapshot_err(path: &Path, msg: String) -> CliError {
    CliError {
        code: EXIT_SNAPSHOT_IO,
        message: format!("{}: {msg}", path.display()),
        hint: None,
    }
}

fn read_snapshot(path: &Path) -> Result<ReportSnapshot, CliError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| snapshot_err(path, format!("cannot read: {e}")))?;
    serde_json::from_str(&data)
        .map_err(|e| snapshot_err(path, format!("not a report snapshot: {e}")))
}

pub fn cmd_diff(
    current: PathBuf,
    previous: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let current_snapshot = read_snapshot(&current)?;
    let previous_snapshot = match &previous {
        Some(path) => Some(read_snapshot(path)?),
        None => None,
    };

    let diff = diff_snapshots(&current_snapshot, previous_snapshot.as_ref());

    if json {
        let out = serde_json::to_string_pretty(&diff)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else {
        print_delta_table(&diff);
    }

    if !quiet {
        let mode = if diff.had_previous {
            "compared against previous snapshot"
        } else {
            "no previous snapshot, deltas default to 0"
        };
        eprintln!(
            "{} department(s), {} change-eligible metric(s), {mode}",
            diff.rows.len(),
            diff.eligible.len(),
        );
    }
    Ok(())
}

// ── Human output ────────────────────────────────────────────────────

const DELTA_CELL_WIDTH: usize = 18;

fn print_delta_table(diff: &SnapshotDiff) {
    if diff.rows.is_empty() {
        println!("(no departments)");
        return;
    }

    let dept_width = diff
        .rows
        .iter()
        .map(|r| display_width(&r.department))
        .max()
        .unwrap_or(0)
        .clamp(10, 32);

    let mut header_line = pad_right("department", dept_width);
    for header in &diff.eligible {
        header_line.push_str("  ");
        header_line.push_str(&pad_right(header, DELTA_CELL_WIDTH));
    }
    println!("{header_line}");

    for row in &diff.rows {
        let mut line = pad_right(&row.department, dept_width);
        for header in &diff.eligible {
            let cell = match row.deltas.get(header) {
                Some(Some(d)) => format_delta(*d),
                _ => "n/a".to_string(),
            };
            line.push_str("  ");
            line.push_str(&format!("{:>width$}", cell, width = DELTA_CELL_WIDTH));
        }
        println!("{line}");
    }
}

/// Signed rendering used for terminal deltas: "+7.00", "-3.00", "0.00".
fn format_delta(d: f64) -> String {
    if d == 0.0 {
        "0.00".to_string()
    } else if d > 0.0 {
        format!("+{d:.2}")
    } else {
        format!("{d:.2}")
    }
}
