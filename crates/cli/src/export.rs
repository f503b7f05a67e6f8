//! `deptboard export` — render the styled workbook, with period deltas
//! pulled from (and recorded back into) the snapshot store.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use deptboard_io::{render_workbook, suggested_filename, ExportOptions, XLSX_MIME};
use deptboard_report::{build_report, snapshot_from_report, SnapshotStore};

use crate::exit_codes::EXIT_EXPORT_WRITE;
use crate::util::{load_batch, open_store, print_report_feedback, report_failure};
use crate::CliError;

/// Machine-readable receipt emitted with `--json`.
#[derive(Debug, Serialize)]
struct ExportReceipt {
    path: String,
    content_type: &'static str,
    rows: usize,
    metric_columns: usize,
    delta_columns: usize,
    data_bars: usize,
    had_previous: bool,
    saved: bool,
    timestamp: String,
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_export(
    files: Vec<PathBuf>,
    manifest: Option<PathBuf>,
    name: Option<String>,
    summary: Option<String>,
    org: Option<String>,
    template: Option<String>,
    store_dir: Option<String>,
    output: Option<PathBuf>,
    no_save: bool,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let batch = load_batch(&files, manifest.as_deref(), json)?;

    let report_name = name
        .or(batch.name)
        .unwrap_or_else(|| "Department Report".to_string());
    let summary = summary.or(batch.summary);
    let organization = org.or(batch.organization);
    let template = template.or(batch.template);

    let history = match (&organization, &template) {
        (Some(_), Some(_)) => true,
        (None, None) => false,
        _ => {
            return Err(CliError::args(
                "--org and --template must be given together",
            ))
        }
    };

    let report = build_report(&batch.sources, &batch.overrides);
    let current = snapshot_from_report(&report);

    let mut store = if history {
        Some(open_store(store_dir.as_deref(), json)?)
    } else {
        None
    };

    let previous = match (&store, &organization, &template) {
        (Some(store), Some(org), Some(template)) => store
            .get(org, template)
            .map_err(|e| report_failure(e, json))?,
        _ => None,
    };
    let had_previous = previous.is_some();

    let options = ExportOptions {
        report_name: report_name.clone(),
        summary,
    };
    let (bytes, stats) = render_workbook(&current, previous.as_ref(), &options)
        .map_err(|e| report_failure(e, json))?;

    let out_path = output.unwrap_or_else(|| {
        PathBuf::from(suggested_filename(&report_name, Utc::now().date_naive()))
    });
    std::fs::write(&out_path, &bytes).map_err(|e| CliError {
        code: EXIT_EXPORT_WRITE,
        message: format!("cannot write {}: {e}", out_path.display()),
        hint: None,
    })?;

    let mut saved = false;
    if !no_save {
        if let (Some(store), Some(org), Some(template)) =
            (&mut store, &organization, &template)
        {
            store
                .put(org, template, &current)
                .map_err(|e| report_failure(e, json))?;
            saved = true;
        }
    }

    print_report_feedback(&report, quiet);
    if !quiet {
        eprintln!("wrote {} ({})", out_path.display(), stats.summary());
        if saved {
            if let (Some(org), Some(template)) = (&organization, &template) {
                eprintln!("snapshot recorded for {org}/{template}");
            }
        }
    }

    if json {
        let receipt = ExportReceipt {
            path: out_path.display().to_string(),
            content_type: XLSX_MIME,
            rows: stats.rows,
            metric_columns: stats.metric_columns,
            delta_columns: stats.delta_columns,
            data_bars: stats.data_bars,
            had_previous,
            saved,
            timestamp: current.timestamp.clone(),
        };
        let out = serde_json::to_string_pretty(&receipt)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    }

    Ok(())
}
