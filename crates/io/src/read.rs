// Upload decoding - extension dispatch over the supported formats

use std::path::{Path, PathBuf};

use deptboard_report::{RawSheet, ReportError, SourceSheets};

use crate::{csv, excel};

/// One file in an upload batch.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Name the file was uploaded under; classification keys off this, not
    /// the stored path.
    pub original_name: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> SourceFile {
        let path = path.into();
        let original_name = basename(&path);
        SourceFile {
            path,
            original_name,
        }
    }

    pub fn with_original_name(
        path: impl Into<PathBuf>,
        original_name: impl Into<String>,
    ) -> SourceFile {
        SourceFile {
            path: path.into(),
            original_name: original_name.into(),
        }
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decode one file into its sheets, dispatching on the extension.
pub fn read_source(path: &Path, file_label: &str) -> Result<Vec<(String, RawSheet)>, ReportError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xls" => excel::read_workbook(path, file_label),
        "csv" => csv::read_csv(path, file_label),
        _ => Err(ReportError::UnsupportedFormat {
            file: file_label.to_string(),
            extension,
        }),
    }
}

/// Decode a whole upload batch, preserving upload order. The first failing
/// file aborts the batch; no partial result is returned.
pub fn read_upload(files: &[SourceFile]) -> Result<Vec<SourceSheets>, ReportError> {
    let mut sources = Vec::with_capacity(files.len());
    for file in files {
        let filename = basename(&file.path);
        let sheets = read_source(&file.path, &filename)?;
        sources.push(SourceSheets {
            original_name: file.original_name.clone(),
            filename,
            sheets,
        });
    }
    Ok(sources)
}
