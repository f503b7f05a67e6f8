//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | ingest           | Upload reading and manifest codes        |
//! | 10-19   | snapshot         | Snapshot store codes                     |
//! | 20-29   | export           | Workbook rendering codes                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Ingest (3-9)
// =============================================================================

/// Upload extension is not one of .xlsx, .xls, .csv.
pub const EXIT_INGEST_UNSUPPORTED: u8 = 3;

/// Upload file is missing, unreadable, or corrupt.
pub const EXIT_INGEST_READ: u8 = 4;

/// Upload sheet has no usable header row.
/// Only surfaces from single-file commands; batch merges downgrade it to a
/// warning and skip the sheet.
pub const EXIT_INGEST_MALFORMED: u8 = 5;

/// Upload manifest failed to parse or validate.
pub const EXIT_INGEST_MANIFEST: u8 = 6;

// =============================================================================
// Snapshot (10-19)
// =============================================================================

/// Snapshot read/write failed (store directory or snapshot JSON files).
pub const EXIT_SNAPSHOT_IO: u8 = 10;

// =============================================================================
// Export (20-29)
// =============================================================================

/// Workbook rendering failed.
pub const EXIT_EXPORT_RENDER: u8 = 20;

/// Rendered workbook could not be written to disk.
pub const EXIT_EXPORT_WRITE: u8 = 21;

// =============================================================================
// Report Error Mapping
// =============================================================================

use deptboard_report::ReportError;

/// Map a ReportError to its exit code.
pub fn report_exit_code(err: &ReportError) -> u8 {
    match err {
        ReportError::UnsupportedFormat { .. } => EXIT_INGEST_UNSUPPORTED,
        ReportError::ReadFailure { .. } => EXIT_INGEST_READ,
        ReportError::MalformedSheet { .. } => EXIT_INGEST_MALFORMED,
        ReportError::ManifestInvalid(_) => EXIT_INGEST_MANIFEST,
        ReportError::Store(_) => EXIT_SNAPSHOT_IO,
        ReportError::Export(_) => EXIT_EXPORT_RENDER,
    }
}

/// Structured error output for commands running with `--json`.
/// Designed for both human-readable and machine-parseable output.
#[derive(Debug, serde::Serialize)]
pub struct ReportErrorOutput {
    pub error: String,
    pub message: String,
    pub exit_code: u8,
}

impl ReportErrorOutput {
    pub fn from_report_error(err: &ReportError) -> Self {
        let kind = match err {
            ReportError::UnsupportedFormat { .. } => "unsupported_format",
            ReportError::ReadFailure { .. } => "read_failure",
            ReportError::MalformedSheet { .. } => "malformed_sheet",
            ReportError::ManifestInvalid(_) => "invalid_manifest",
            ReportError::Store(_) => "snapshot_error",
            ReportError::Export(_) => "export_error",
        };
        Self {
            error: kind.to_string(),
            message: err.to_string(),
            exit_code: report_exit_code(err),
        }
    }

    /// Print error to stderr (human-readable by default).
    pub fn print(&self, json: bool) {
        if json {
            if let Ok(output) = serde_json::to_string(self) {
                eprintln!("{}", output);
            }
        } else {
            eprintln!("error: {}", self.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_do_not_collide() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_INGEST_UNSUPPORTED,
            EXIT_INGEST_READ,
            EXIT_INGEST_MALFORMED,
            EXIT_INGEST_MANIFEST,
            EXIT_SNAPSHOT_IO,
            EXIT_EXPORT_RENDER,
            EXIT_EXPORT_WRITE,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b, "duplicate exit code {a}");
            }
        }
    }

    #[test]
    fn report_errors_map_into_their_ranges() {
        let unsupported = ReportError::UnsupportedFormat {
            file: "x.pdf".into(),
            extension: "pdf".into(),
        };
        assert_eq!(report_exit_code(&unsupported), EXIT_INGEST_UNSUPPORTED);

        let store = ReportError::Store("disk full".into());
        assert_eq!(report_exit_code(&store), EXIT_SNAPSHOT_IO);

        let export = ReportError::Export("bad sheet name".into());
        assert_eq!(report_exit_code(&export), EXIT_EXPORT_RENDER);
    }

    #[test]
    fn error_output_carries_kind_and_code() {
        let err = ReportError::ManifestInvalid("files list is empty".into());
        let out = ReportErrorOutput::from_report_error(&err);
        assert_eq!(out.error, "invalid_manifest");
        assert_eq!(out.exit_code, EXIT_INGEST_MANIFEST);
        assert!(out.message.contains("files list is empty"));
    }
}
