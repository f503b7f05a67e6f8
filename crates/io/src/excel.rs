// Excel workbook import (.xlsx and legacy .xls via calamine)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};

use deptboard_report::{CellScalar, RawSheet, ReportError};

/// Decode every sheet of a workbook, in workbook order.
pub fn read_workbook(path: &Path, file_label: &str) -> Result<Vec<(String, RawSheet)>, ReportError> {
    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| ReportError::ReadFailure {
            file: file_label.to_string(),
            reason: format!("failed to open workbook: {e}"),
        })?;

    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(ReportError::ReadFailure {
            file: file_label.to_string(),
            reason: "workbook contains no sheets".to_string(),
        });
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| ReportError::ReadFailure {
                file: file_label.to_string(),
                reason: format!("failed to read sheet '{name}': {e}"),
            })?;
        sheets.push((name.clone(), sheet_from_range(&range)));
    }
    Ok(sheets)
}

fn sheet_from_range(range: &Range<Data>) -> RawSheet {
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    RawSheet::new(rows)
}

fn cell_from_data(cell: &Data) -> CellScalar {
    match cell {
        Data::Empty => CellScalar::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellScalar::Empty
            } else {
                CellScalar::Text(s.clone())
            }
        }
        Data::Float(f) => CellScalar::Number(*f),
        Data::Int(i) => CellScalar::Number(*i as f64),
        Data::Bool(b) => CellScalar::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => CellScalar::Text(format!("#{e:?}")),
        // Dates come through as serial numbers; the merge keeps them numeric.
        Data::DateTime(dt) => CellScalar::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellScalar::Text(s.clone()),
        Data::DurationIso(s) => CellScalar::Text(s.clone()),
    }
}
