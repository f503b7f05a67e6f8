use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Decoded source data
// ---------------------------------------------------------------------------

/// A single decoded cell value. Source formats disagree about typing (CSV is
/// all text, workbooks carry native numbers), so downstream code treats
/// numeric text and native numbers the same via [`CellScalar::as_number`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellScalar {
    Text(String),
    Number(f64),
    Empty,
}

impl CellScalar {
    pub fn is_empty(&self) -> bool {
        match self {
            CellScalar::Empty => true,
            CellScalar::Text(s) => s.trim().is_empty(),
            CellScalar::Number(_) => false,
        }
    }

    /// Numeric view of the cell. Text parses after trimming; a trailing `%`
    /// is accepted and divides the value by 100.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellScalar::Number(n) => Some(*n),
            CellScalar::Text(s) => parse_numeric_text(s),
            CellScalar::Empty => None,
        }
    }

    /// Text rendering used for department labels and content scans. Whole
    /// numbers render without a decimal point so `42.0` reads as `42`.
    pub fn to_display(&self) -> String {
        match self {
            CellScalar::Text(s) => s.trim().to_string(),
            CellScalar::Number(n) => format_number(*n),
            CellScalar::Empty => String::new(),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse a trimmed string as a number. Percentage-suffixed values divide by
/// 100 so "85%" and 0.85 compare equal across snapshots.
pub fn parse_numeric_text(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(stripped) = trimmed.strip_suffix('%') {
        return stripped.trim().parse::<f64>().ok().map(|v| v / 100.0);
    }
    trimmed.parse::<f64>().ok()
}

/// One sheet decoded to a dense grid. Row 0 is the header row; everything
/// after it is data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub rows: Vec<Vec<CellScalar>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<CellScalar>>) -> Self {
        RawSheet { rows }
    }

    pub fn header_row(&self) -> Option<&[CellScalar]> {
        self.rows.first().map(|r| r.as_slice())
    }

    pub fn data_rows(&self) -> &[Vec<CellScalar>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }
}

/// One uploaded file after decoding: its sheets in workbook order plus the
/// naming metadata classification runs on.
#[derive(Debug, Clone)]
pub struct SourceSheets {
    /// Name the file was uploaded under. Classification keys off this.
    pub original_name: String,
    /// Stored name, usually the basename on disk.
    pub filename: String,
    pub sheets: Vec<(String, RawSheet)>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Source-system domain a file's metrics belong to. The domain qualifies
/// every metric name so same-named headers from different systems never
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDomain {
    Placements,
    Enrichment,
    Employer,
    Careers,
    Assessments,
    Targets,
    Login,
    Default,
}

impl ContentDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentDomain::Placements => "placements",
            ContentDomain::Enrichment => "enrichment",
            ContentDomain::Employer => "employer",
            ContentDomain::Careers => "careers",
            ContentDomain::Assessments => "assessments",
            ContentDomain::Targets => "targets",
            ContentDomain::Login => "login",
            ContentDomain::Default => "default",
        }
    }
}

impl fmt::Display for ContentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-file manual classification supplied by the operator. The type string
/// is used verbatim as the qualifier domain and skips automatic
/// classification entirely; the color only travels through to file metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualOverride {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Merged report
// ---------------------------------------------------------------------------

/// A metric cell value as stored in the merged table. Numeric-looking text
/// was already parsed during the merge, so `Text` here means the source
/// value genuinely was not a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(s) => parse_numeric_text(s),
        }
    }

    pub fn to_display(&self) -> String {
        match self {
            MetricValue::Number(n) => format_number(*n),
            MetricValue::Text(s) => s.clone(),
        }
    }
}

/// Metadata for one merged file, kept alongside the table so the UI layer
/// can show where each column came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(rename = "originalName")]
    pub original_name: String,
    pub filename: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Per-file counters accumulated during a merge. Worth surfacing because a
/// quietly skipped sheet is the most common cause of "where did my column
/// go" questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeStats {
    pub file: String,
    pub sheets_read: usize,
    pub sheets_skipped: usize,
    pub rows_merged: usize,
    pub rows_skipped: usize,
    pub headers_retained: usize,
}

impl MergeStats {
    pub fn summary(&self) -> String {
        format!(
            "{}: {} sheet(s) read, {} skipped; {} row(s) merged, {} skipped; {} header(s) retained",
            self.file,
            self.sheets_read,
            self.sheets_skipped,
            self.rows_merged,
            self.rows_skipped,
            self.headers_retained
        )
    }
}

/// The consolidated per-department metrics table produced from one upload
/// batch.
#[derive(Debug, Clone, Serialize)]
pub struct MergedReport {
    /// Department labels in first-seen order across files.
    pub departments: Vec<String>,
    /// Qualified metric names in first-seen order. This is the column order
    /// snapshots and exports use.
    pub headers: Vec<String>,
    /// Department label -> qualified metric name -> value.
    pub metrics: BTreeMap<String, BTreeMap<String, MetricValue>>,
    /// Qualified metric name -> index of the file (in upload order) that
    /// last wrote it.
    pub header_file_map: BTreeMap<String, usize>,
    pub file_info: Vec<FileInfo>,
    pub timestamp: String,
    pub warnings: Vec<String>,
    pub stats: Vec<MergeStats>,
}

impl MergedReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "merged {} file(s) into {} department(s) x {} metric(s)",
            self.file_info.len(),
            self.departments.len(),
            self.headers.len()
        )
    }

    pub fn warning_summary(&self) -> Option<String> {
        if self.warnings.is_empty() {
            None
        } else {
            Some(format!(
                "{} warning(s):\n  {}",
                self.warnings.len(),
                self.warnings.join("\n  ")
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A snapshot table cell. `Empty` serializes as JSON null, which is how
/// stored snapshots distinguish "no data" from a literal zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotCell {
    Number(f64),
    Text(String),
    Empty,
}

impl SnapshotCell {
    pub fn is_empty(&self) -> bool {
        matches!(self, SnapshotCell::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            SnapshotCell::Number(n) => Some(*n),
            SnapshotCell::Text(s) => parse_numeric_text(s),
            SnapshotCell::Empty => None,
        }
    }

    pub fn to_display(&self) -> String {
        match self {
            SnapshotCell::Number(n) => format_number(*n),
            SnapshotCell::Text(s) => s.clone(),
            SnapshotCell::Empty => String::new(),
        }
    }
}

/// Frozen form of a merged report used for change tracking. `headers` holds
/// the qualified metric names; the department column is implicit, so every
/// row is one cell wider than `headers` with the label at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<SnapshotCell>>,
    pub timestamp: String,
}

impl ReportSnapshot {
    /// Column index into `rows` for the metric at `headers[idx]`.
    pub fn metric_col(idx: usize) -> usize {
        idx + 1
    }

    pub fn department_of(&self, row: usize) -> Option<String> {
        self.rows.get(row).and_then(|r| r.first()).map(|c| c.to_display())
    }
}

// ---------------------------------------------------------------------------
// Diffs
// ---------------------------------------------------------------------------

/// Change values for one current-snapshot row. Deltas are keyed by qualified
/// metric name; `None` means history exists but this cell's change could not
/// be computed (new department, new column, or a non-numeric value).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDiff {
    pub department: String,
    pub deltas: BTreeMap<String, Option<f64>>,
}

/// Result of diffing the current snapshot against the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotDiff {
    /// Headers that earn a delta column, in current-snapshot order.
    pub eligible: Vec<String>,
    /// One entry per current-snapshot row, in row order.
    pub rows: Vec<RowDiff>,
    /// False when no previous snapshot existed and every delta defaulted to
    /// zero.
    pub had_previous: bool,
}

impl SnapshotDiff {
    pub fn delta(&self, row: usize, header: &str) -> Option<f64> {
        self.rows
            .get(row)
            .and_then(|r| r.deltas.get(header))
            .copied()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_parses_with_trim() {
        assert_eq!(parse_numeric_text(" 42 "), Some(42.0));
        assert_eq!(parse_numeric_text("3.5"), Some(3.5));
        assert_eq!(parse_numeric_text("n/a"), None);
        assert_eq!(parse_numeric_text(""), None);
    }

    #[test]
    fn percentage_text_divides_by_100() {
        assert_eq!(parse_numeric_text("85%"), Some(0.85));
        assert_eq!(parse_numeric_text(" 12.5 % "), Some(0.125));
        assert_eq!(parse_numeric_text("%"), None);
    }

    #[test]
    fn cell_display_drops_trailing_zero() {
        assert_eq!(CellScalar::Number(42.0).to_display(), "42");
        assert_eq!(CellScalar::Number(3.25).to_display(), "3.25");
        assert_eq!(CellScalar::Text("  Maths  ".into()).to_display(), "Maths");
    }

    #[test]
    fn whitespace_text_counts_as_empty() {
        assert!(CellScalar::Text("   ".into()).is_empty());
        assert!(CellScalar::Empty.is_empty());
        assert!(!CellScalar::Number(0.0).is_empty());
    }

    #[test]
    fn snapshot_cell_null_round_trip() {
        let row = vec![
            SnapshotCell::Text("Maths".into()),
            SnapshotCell::Number(12.0),
            SnapshotCell::Empty,
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"["Maths",12.0,null]"#);
        let back: Vec<SnapshotCell> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn manual_override_uses_wire_field_names() {
        let json = r##"{"type":"custom-system","color":"#AABBCC"}"##;
        let o: ManualOverride = serde_json::from_str(json).unwrap();
        assert_eq!(o.content_type, "custom-system");
        assert_eq!(o.color.as_deref(), Some("#AABBCC"));
    }
}
