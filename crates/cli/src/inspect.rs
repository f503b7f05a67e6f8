//! `deptboard inspect` — preview how an upload will be read, classified,
//! and keyed before committing to a merge.

use std::path::PathBuf;

use serde::Serialize;

use deptboard_io::{read_source, SourceFile};
use deptboard_report::classify::{classify_by_content, classify_file};
use deptboard_report::headers::normalize_headers;

use crate::util::{col_to_letter, pad_right, report_failure};
use crate::CliError;

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    original_name: String,
    domain: String,
    sheets: Vec<SheetReport>,
}

#[derive(Debug, Serialize)]
struct SheetReport {
    name: String,
    rows: usize,
    /// Domain detected from banner text inside the sheet, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    content_marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    department_column: Option<DepartmentColumn>,
    headers: Vec<HeaderEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<String>,
}

#[derive(Debug, Serialize)]
struct DepartmentColumn {
    index: usize,
    letter: String,
    name: String,
}

/// A retained metric header at its spreadsheet position.
#[derive(Debug, Serialize)]
struct HeaderEntry {
    column: String,
    name: String,
}

fn inspect_file(file: &PathBuf, json: bool) -> Result<FileReport, CliError> {
    let source = SourceFile::new(file);
    let sheets =
        read_source(&source.path, &source.original_name).map_err(|e| report_failure(e, json))?;
    let domain = classify_file(&source.original_name, &sheets);

    let mut sheet_reports = Vec::with_capacity(sheets.len());
    for (sheet_name, sheet) in &sheets {
        let content_marker = classify_by_content(sheet).map(|d| d.to_string());
        let rows = sheet.data_rows().len();

        match normalize_headers(sheet, &source.original_name, sheet_name) {
            Ok(normalized) => {
                let dept_name = sheet
                    .header_row()
                    .and_then(|r| r.get(normalized.department_col))
                    .map(|c| c.to_display())
                    .unwrap_or_default();
                sheet_reports.push(SheetReport {
                    name: sheet_name.clone(),
                    rows,
                    content_marker,
                    department_column: Some(DepartmentColumn {
                        index: normalized.department_col,
                        letter: col_to_letter(normalized.department_col),
                        name: dept_name,
                    }),
                    headers: normalized
                        .columns
                        .into_iter()
                        .map(|c| HeaderEntry {
                            column: col_to_letter(c.index),
                            name: c.name,
                        })
                        .collect(),
                    skipped: None,
                });
            }
            Err(err) => sheet_reports.push(SheetReport {
                name: sheet_name.clone(),
                rows,
                content_marker,
                department_column: None,
                headers: Vec::new(),
                skipped: Some(err.to_string()),
            }),
        }
    }

    Ok(FileReport {
        file: file.display().to_string(),
        original_name: source.original_name,
        domain: domain.to_string(),
        sheets: sheet_reports,
    })
}

pub fn cmd_inspect(file: PathBuf, json: bool) -> Result<(), CliError> {
    let report = inspect_file(&file, json)?;

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    println!("file: {}", report.original_name);
    println!("domain: {}", report.domain);
    for sheet in &report.sheets {
        println!();
        println!("sheet \"{}\": {} data row(s)", sheet.name, sheet.rows);
        if let Some(marker) = &sheet.content_marker {
            println!("  content marker: {marker}");
        }
        if let Some(skipped) = &sheet.skipped {
            println!("  skipped: {skipped}");
            continue;
        }
        if let Some(dept) = &sheet.department_column {
            println!("  department column: {} \"{}\"", dept.letter, dept.name);
        }
        if sheet.headers.is_empty() {
            println!("  no metric headers");
        } else {
            println!("  metric headers:");
            for header in &sheet.headers {
                println!("    {} {}", pad_right(&header.column, 3), header.name);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn csv_file_is_classified_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("careers_export.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Department,Job Profile Views").unwrap();
        writeln!(f, "Engineering,41").unwrap();
        writeln!(f, "Science,12").unwrap();

        let report = inspect_file(&path, false).unwrap();
        assert_eq!(report.domain, "careers");
        assert_eq!(report.sheets.len(), 1);
        assert_eq!(report.sheets[0].rows, 2);
        assert_eq!(report.sheets[0].headers.len(), 1);
        assert_eq!(report.sheets[0].headers[0].column, "B");
        assert_eq!(report.sheets[0].headers[0].name, "Job Profile Views");
        let dept = report.sheets[0].department_column.as_ref().unwrap();
        assert_eq!(dept.index, 0);
        assert_eq!(dept.letter, "A");
        assert_eq!(dept.name, "Department");
    }

    #[test]
    fn headerless_sheet_is_reported_as_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, ",,\n").unwrap();

        let report = inspect_file(&path, false).unwrap();
        assert_eq!(report.sheets.len(), 1);
        let sheet = &report.sheets[0];
        assert!(sheet.skipped.as_ref().unwrap().contains("no header row"));
        assert!(sheet.headers.is_empty());
    }

    #[test]
    fn missing_file_is_a_read_failure() {
        let err = inspect_file(&PathBuf::from("/nonexistent/x.csv"), false).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_INGEST_READ);
    }
}
