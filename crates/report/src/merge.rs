use std::collections::BTreeMap;

use crate::classify;
use crate::headers::{self, NormalizedHeaders};
use crate::model::{
    CellScalar, FileInfo, ManualOverride, MergeStats, MergedReport, MetricValue, RawSheet,
    SourceSheets,
};

// ---------------------------------------------------------------------------
// Data row filtering
// ---------------------------------------------------------------------------

/// Banner text some activity exports repeat above and below the data area.
const BANNER_MARKERS: &[&str] = &["enrichment activity", "employer activity"];

/// Blank or bare-number department cells are row-number artifacts, not
/// labels.
fn is_artifact_department(label: &str) -> bool {
    let trimmed = label.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().is_ok()
}

/// A row whose concatenated text carries an activity banner is decoration,
/// wherever the department cell happens to sit.
fn is_banner_row(row: &[CellScalar]) -> bool {
    let joined = row
        .iter()
        .map(|cell| cell.to_display())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    BANNER_MARKERS.iter().any(|m| joined.contains(m))
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Folds uploaded files into one merged table. Files are added in upload
/// order; when two files write the same qualified metric name, the later
/// file wins.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    departments: Vec<String>,
    headers: Vec<String>,
    metrics: BTreeMap<String, BTreeMap<String, MetricValue>>,
    header_file_map: BTreeMap<String, usize>,
    file_info: Vec<FileInfo>,
    warnings: Vec<String>,
    stats: Vec<MergeStats>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        ReportBuilder::default()
    }

    /// Merge one decoded file. `file_index` is the position in upload order;
    /// it keys manual overrides and is recorded in the header-to-file map.
    pub fn add_file(
        &mut self,
        file_index: usize,
        source: &SourceSheets,
        manual: Option<&ManualOverride>,
    ) {
        let label = match manual {
            Some(o) => o.content_type.clone(),
            None => classify::classify_file(&source.original_name, &source.sheets).to_string(),
        };

        let mut stats = MergeStats {
            file: source.filename.clone(),
            ..MergeStats::default()
        };

        for (sheet_name, sheet) in &source.sheets {
            match headers::normalize_headers(sheet, &source.filename, sheet_name) {
                Ok(normalized) => {
                    stats.sheets_read += 1;
                    stats.headers_retained += normalized.columns.len();
                    self.merge_sheet(file_index, &label, sheet, &normalized, &mut stats);
                }
                Err(err) => {
                    stats.sheets_skipped += 1;
                    self.warnings.push(format!("skipping sheet: {}", err));
                }
            }
        }

        self.stats.push(stats);
        self.file_info.push(FileInfo {
            original_name: source.original_name.clone(),
            filename: source.filename.clone(),
            content_type: label,
            color: manual.and_then(|o| o.color.clone()),
        });
    }

    fn merge_sheet(
        &mut self,
        file_index: usize,
        label: &str,
        sheet: &RawSheet,
        normalized: &NormalizedHeaders,
        stats: &mut MergeStats,
    ) {
        for row in sheet.data_rows() {
            let department = row
                .get(normalized.department_col)
                .map(|cell| cell.to_display())
                .unwrap_or_default();
            if is_artifact_department(&department) || is_banner_row(row) {
                stats.rows_skipped += 1;
                continue;
            }

            if !self.metrics.contains_key(&department) {
                self.departments.push(department.clone());
            }
            let dept_metrics = self.metrics.entry(department).or_default();

            for column in &normalized.columns {
                let cell = match row.get(column.index) {
                    Some(c) => c,
                    None => continue,
                };
                if cell.is_empty() {
                    continue;
                }
                let value = match cell.as_number() {
                    Some(n) => MetricValue::Number(n),
                    None => MetricValue::Text(cell.to_display()),
                };
                let qualified = format!("{} ({})", column.name, label);
                dept_metrics.insert(qualified.clone(), value);
                if !self.header_file_map.contains_key(&qualified) {
                    self.headers.push(qualified.clone());
                }
                self.header_file_map.insert(qualified, file_index);
            }
            stats.rows_merged += 1;
        }
    }

    pub fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    pub fn finish(self) -> MergedReport {
        MergedReport {
            departments: self.departments,
            headers: self.headers,
            metrics: self.metrics,
            header_file_map: self.header_file_map,
            file_info: self.file_info,
            timestamp: chrono::Utc::now().to_rfc3339(),
            warnings: self.warnings,
            stats: self.stats,
        }
    }
}
