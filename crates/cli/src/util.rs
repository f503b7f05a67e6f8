use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use unicode_width::UnicodeWidthStr;

use deptboard_io::{read_upload, JsonSnapshotStore, SourceFile};
use deptboard_report::{ManualOverride, MergedReport, ReportError, SourceSheets, UploadManifest};

use crate::exit_codes::{ReportErrorOutput, EXIT_INGEST_MANIFEST};
use crate::CliError;

// ── Terminal formatting ─────────────────────────────────────────────

/// Display width of a string, accounting for CJK double-width characters.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if
/// truncated. Department labels from real exports run long.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        // No room for "..": first char that fits, else empty
        for ch in s.chars() {
            let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if cw <= width {
                return ch.to_string();
            }
        }
        return String::new();
    }
    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }
    format!("{}..", &s[..end_byte])
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Convert column index to spreadsheet letter (0 -> A, 26 -> AA).
pub(crate) fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

// ── Paths and stores ────────────────────────────────────────────────

/// Expand `~` in user-supplied paths.
pub(crate) fn expand_path(s: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(s).to_string())
}

/// Platform data directory for snapshot storage when no --store-dir is given.
pub(crate) fn default_store_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("deptboard").join("snapshots"))
}

pub(crate) fn open_store(store_dir: Option<&str>, json: bool) -> Result<JsonSnapshotStore, CliError> {
    let root = match store_dir {
        Some(dir) => expand_path(dir),
        None => default_store_dir().ok_or_else(|| {
            CliError::args(
                "no snapshot store directory; pass --store-dir or set DEPTBOARD_STORE_DIR",
            )
        })?,
    };
    JsonSnapshotStore::open(root).map_err(|e| report_failure(e, json))
}

// ── Upload loading ──────────────────────────────────────────────────

/// One decoded upload batch plus the identity the manifest declared for it.
#[derive(Debug)]
pub(crate) struct LoadedBatch {
    pub sources: Vec<SourceSheets>,
    pub overrides: BTreeMap<usize, ManualOverride>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub organization: Option<String>,
    pub template: Option<String>,
}

/// Decode an upload batch from positional files or a manifest. Manifest file
/// paths resolve relative to the manifest's own directory.
pub(crate) fn load_batch(
    files: &[PathBuf],
    manifest: Option<&Path>,
    json: bool,
) -> Result<LoadedBatch, CliError> {
    if let Some(manifest_path) = manifest {
        let manifest_str = std::fs::read_to_string(manifest_path).map_err(|e| CliError {
            code: EXIT_INGEST_MANIFEST,
            message: format!("cannot read {}: {e}", manifest_path.display()),
            hint: None,
        })?;
        let manifest =
            UploadManifest::from_toml(&manifest_str).map_err(|e| report_failure(e, json))?;

        let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
        let source_files: Vec<SourceFile> = manifest
            .files
            .iter()
            .map(|entry| {
                SourceFile::with_original_name(base_dir.join(&entry.path), entry.resolved_name())
            })
            .collect();
        let sources = read_upload(&source_files).map_err(|e| report_failure(e, json))?;

        Ok(LoadedBatch {
            sources,
            overrides: manifest.overrides(),
            name: Some(manifest.name),
            summary: manifest.summary,
            organization: manifest.organization,
            template: manifest.template,
        })
    } else {
        if files.is_empty() {
            return Err(CliError::args("provide upload files or --manifest"));
        }
        let source_files: Vec<SourceFile> = files.iter().map(SourceFile::new).collect();
        let sources = read_upload(&source_files).map_err(|e| report_failure(e, json))?;

        Ok(LoadedBatch {
            sources,
            overrides: BTreeMap::new(),
            name: None,
            summary: None,
            organization: None,
            template: None,
        })
    }
}

/// Per-file counters and merge warnings, on stderr so stdout stays parseable.
pub(crate) fn print_report_feedback(report: &MergedReport, quiet: bool) {
    if quiet {
        return;
    }
    for stat in &report.stats {
        eprintln!("{}", stat.summary());
    }
    if let Some(warnings) = report.warning_summary() {
        eprintln!("{warnings}");
    }
    eprintln!("{}", report.summary());
}

/// Fail a `--json` command: emit the structured error to stderr, then return
/// a message-less CliError so main() only sets the exit code.
pub(crate) fn report_failure(err: ReportError, json: bool) -> CliError {
    if json {
        let out = ReportErrorOutput::from_report_error(&err);
        out.print(true);
        CliError {
            code: out.exit_code,
            message: String::new(),
            hint: None,
        }
    } else {
        CliError::report(err)
    }
}
