use std::fmt;

/// Errors surfaced by the report pipeline.
///
/// File-level failures (`UnsupportedFormat`, `ReadFailure`) abort the whole
/// upload batch. `MalformedSheet` is recoverable: the merge skips the sheet
/// with a warning and keeps going.
#[derive(Debug)]
pub enum ReportError {
    /// File extension is not one of the supported spreadsheet formats.
    UnsupportedFormat { file: String, extension: String },
    /// The file could not be opened or decoded.
    ReadFailure { file: String, reason: String },
    /// A sheet has no header row to anchor the merge on.
    MalformedSheet { file: String, sheet: String },
    /// Manifest could not be parsed or failed validation.
    ManifestInvalid(String),
    /// Snapshot persistence failed.
    Store(String),
    /// Workbook rendering failed.
    Export(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::UnsupportedFormat { file, extension } => {
                if extension.is_empty() {
                    write!(f, "unsupported file format for '{}': no extension", file)
                } else {
                    write!(f, "unsupported file format for '{}': .{}", file, extension)
                }
            }
            ReportError::ReadFailure { file, reason } => {
                write!(f, "failed to read '{}': {}", file, reason)
            }
            ReportError::MalformedSheet { file, sheet } => {
                write!(f, "sheet '{}' in '{}' has no header row", sheet, file)
            }
            ReportError::ManifestInvalid(msg) => write!(f, "invalid manifest: {}", msg),
            ReportError::Store(msg) => write!(f, "snapshot store error: {}", msg),
            ReportError::Export(msg) => write!(f, "export error: {}", msg),
        }
    }
}

impl std::error::Error for ReportError {}
