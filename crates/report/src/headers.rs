use crate::error::ReportError;
use crate::model::RawSheet;

/// Substrings that identify the department-key column, tried in this order
/// across the whole header row before falling through to the next alias.
const DEPARTMENT_ALIASES: &[&str] = &["department", "program", "course", "category"];

/// Headers equal to one of these (after trim and lowercase) are duplicate
/// department indicators and never become metric columns.
const DEPARTMENT_DUPLICATES: &[&str] = &["department", "dept", "program"];

/// One retained metric column: where it sits in the raw row and the header
/// text it will be qualified under.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderColumn {
    pub index: usize,
    pub name: String,
}

/// Header analysis for one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedHeaders {
    /// Column index rows are keyed by.
    pub department_col: usize,
    /// Metric columns in original order. Duplicates are preserved; collision
    /// handling happens later, after qualification.
    pub columns: Vec<HeaderColumn>,
}

/// Find the column holding department labels. Aliases are checked one at a
/// time across all headers, so a "Department" in column C beats a "Course"
/// in column A. Falls back to column 0 when nothing matches.
pub fn detect_department_column(headers: &[String]) -> usize {
    for alias in DEPARTMENT_ALIASES {
        for (idx, header) in headers.iter().enumerate() {
            if header.to_lowercase().contains(alias) {
                return idx;
            }
        }
    }
    0
}

/// Analyze a sheet's header row: locate the department column and filter the
/// rest down to usable metric headers.
pub fn normalize_headers(
    sheet: &RawSheet,
    file: &str,
    sheet_name: &str,
) -> Result<NormalizedHeaders, ReportError> {
    let header_row = sheet.header_row().ok_or_else(|| ReportError::MalformedSheet {
        file: file.to_string(),
        sheet: sheet_name.to_string(),
    })?;

    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_display()).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ReportError::MalformedSheet {
            file: file.to_string(),
            sheet: sheet_name.to_string(),
        });
    }

    let department_col = detect_department_column(&headers);

    let mut columns = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        if index == department_col {
            continue;
        }
        let trimmed = header.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Serial-number artifacts ("1", "2", ...) from row-numbered exports.
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let lowered = trimmed.to_lowercase();
        if DEPARTMENT_DUPLICATES.iter().any(|d| lowered == *d) {
            continue;
        }
        columns.push(HeaderColumn {
            index,
            name: trimmed.to_string(),
        });
    }

    Ok(NormalizedHeaders {
        department_col,
        columns,
    })
}
