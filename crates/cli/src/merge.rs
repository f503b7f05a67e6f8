//! `deptboard merge` — consolidate source exports into one metrics table.

use std::path::PathBuf;

use deptboard_report::build_report;

use crate::util::{load_batch, print_report_feedback};
use crate::CliError;

pub fn cmd_merge(
    files: Vec<PathBuf>,
    manifest: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let batch = load_batch(&files, manifest.as_deref(), json)?;
    let report = build_report(&batch.sources, &batch.overrides);

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if json {
        println!("{json_str}");
    }

    print_report_feedback(&report, quiet);
    Ok(())
}
