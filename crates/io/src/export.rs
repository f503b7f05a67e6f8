// Styled XLSX rendering of a snapshot with change annotations

use chrono::NaiveDate;
use rust_xlsxwriter::{
    ConditionalFormatDataBar, ConditionalFormatType, Color, Format, FormatBorder,
    Workbook as XlsxWorkbook, XlsxError,
};

use deptboard_report::diff::{diff_snapshots, is_numeric_column, is_percentage_header};
use deptboard_report::section::{self, Section};
use deptboard_report::{ReportError, ReportSnapshot, SnapshotCell};

pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Title written above every delta column.
const DELTA_COLUMN_TITLE: &str = "+/-";

/// Fill used for the proportional bars on percentage columns.
const DATA_BAR_COLOR: u32 = 0x638EC6;

/// Caller-facing knobs for one export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub report_name: String,
    /// Free-text line rendered under the timestamp when present.
    pub summary: Option<String>,
}

/// Result of rendering an export workbook
#[derive(Debug, Default)]
pub struct RenderStats {
    /// Data rows written (one per department)
    pub rows: usize,
    /// Metric columns written
    pub metric_columns: usize,
    /// Delta columns inserted next to change-eligible metrics
    pub delta_columns: usize,
    /// Columns rendered with the percentage format
    pub percent_columns: usize,
    /// Proportional bars added to percentage columns
    pub data_bars: usize,
}

impl RenderStats {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        format!(
            "{} row{}, {} metric column{}, {} delta column{}",
            self.rows,
            if self.rows == 1 { "" } else { "s" },
            self.metric_columns,
            if self.metric_columns == 1 { "" } else { "s" },
            self.delta_columns,
            if self.delta_columns == 1 { "" } else { "s" },
        )
    }
}

/// Suggested download name: `{reportName}_{isoDate}.xlsx`.
pub fn suggested_filename(report_name: &str, date: NaiveDate) -> String {
    let safe: String = report_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            _ => c,
        })
        .collect();
    format!("{}_{}.xlsx", safe.trim(), date.format("%Y-%m-%d"))
}

// ---------------------------------------------------------------------------
// Column planning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Department,
    Metric { header_idx: usize, percentage: bool },
    Delta { header_idx: usize, percentage: bool },
}

#[derive(Debug, Clone)]
struct ColumnSpec {
    title: String,
    kind: ColumnKind,
    section: Section,
}

/// Lay out the export columns: department first, then each metric with its
/// delta column directly to the right when the metric is change-eligible.
/// Adjacency is the contract; deltas are never batched at the end.
fn plan_columns(current: &ReportSnapshot) -> Vec<ColumnSpec> {
    let mut columns = vec![ColumnSpec {
        title: "Department".to_string(),
        kind: ColumnKind::Department,
        section: Section::Department,
    }];

    for (header_idx, header) in current.headers.iter().enumerate() {
        let percentage = is_percentage_header(header);
        let section = section::classify(header);
        columns.push(ColumnSpec {
            title: header.clone(),
            kind: ColumnKind::Metric {
                header_idx,
                percentage,
            },
            section,
        });
        if percentage || is_numeric_column(current, header_idx) {
            columns.push(ColumnSpec {
                title: DELTA_COLUMN_TITLE.to_string(),
                kind: ColumnKind::Delta {
                    header_idx,
                    percentage,
                },
                section,
            });
        }
    }

    columns
}

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

fn header_format(section: Section) -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(section.color()))
        .set_border(FormatBorder::Thin)
}

fn delta_format(font: u32, fill: u32, percentage: bool) -> Format {
    let pattern = if percentage {
        "+0.00%;-0.00%;0.00%"
    } else {
        "+0.00;-0.00;0.00"
    };
    Format::new()
        .set_border(FormatBorder::Thin)
        .set_num_format(pattern)
        .set_font_color(Color::RGB(font))
        .set_background_color(Color::RGB(fill))
}

struct ExportFormats {
    title: Format,
    meta: Format,
    text: Format,
    number: Format,
    percent: Format,
    delta_positive: Format,
    delta_negative: Format,
    delta_zero: Format,
    delta_positive_pct: Format,
    delta_negative_pct: Format,
    delta_zero_pct: Format,
    delta_null: Format,
}

impl ExportFormats {
    fn new() -> ExportFormats {
        ExportFormats {
            title: Format::new().set_bold().set_font_size(13),
            meta: Format::new().set_font_color(Color::RGB(0x595959)),
            text: Format::new().set_border(FormatBorder::Thin),
            number: Format::new()
                .set_border(FormatBorder::Thin)
                .set_num_format("0.00"),
            percent: Format::new()
                .set_border(FormatBorder::Thin)
                .set_num_format("0.00%"),
            delta_positive: delta_format(0x006100, 0xC6EFCE, false),
            delta_negative: delta_format(0x9C0006, 0xFFC7CE, false),
            delta_zero: delta_format(0x9C6500, 0xFFEB9C, false),
            delta_positive_pct: delta_format(0x006100, 0xC6EFCE, true),
            delta_negative_pct: delta_format(0x9C0006, 0xFFC7CE, true),
            delta_zero_pct: delta_format(0x9C6500, 0xFFEB9C, true),
            delta_null: Format::new()
                .set_border(FormatBorder::Thin)
                .set_background_color(Color::RGB(0xF2F2F2)),
        }
    }

    fn for_delta(&self, delta: f64, percentage: bool) -> &Format {
        if percentage {
            if delta > 0.0 {
                &self.delta_positive_pct
            } else if delta < 0.0 {
                &self.delta_negative_pct
            } else {
                &self.delta_zero_pct
            }
        } else if delta > 0.0 {
            &self.delta_positive
        } else if delta < 0.0 {
            &self.delta_negative
        } else {
            &self.delta_zero
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Percentage cells may arrive as whole numbers (85) or fractions (0.85);
/// anything above 1 is a whole-number percent.
fn normalize_percent(value: f64) -> f64 {
    if value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

fn normalize_percent_delta(delta: f64) -> f64 {
    if delta.abs() > 1.0 {
        delta / 100.0
    } else {
        delta
    }
}

fn worksheet_name(report_name: &str) -> String {
    let cleaned: String = report_name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '-',
            _ => c,
        })
        .take(31)
        .collect();
    let trimmed = cleaned.trim().to_string();
    if trimmed.is_empty() {
        "Report".to_string()
    } else {
        trimmed
    }
}

fn xlsx_err(e: XlsxError) -> ReportError {
    ReportError::Export(e.to_string())
}

/// Render the current snapshot, annotated with deltas against the previous
/// one, into an XLSX document in memory.
pub fn render_workbook(
    current: &ReportSnapshot,
    previous: Option<&ReportSnapshot>,
    options: &ExportOptions,
) -> Result<(Vec<u8>, RenderStats), ReportError> {
    let diff = diff_snapshots(current, previous);
    let columns = plan_columns(current);
    let formats = ExportFormats::new();
    let mut stats = RenderStats {
        rows: current.rows.len(),
        metric_columns: current.headers.len(),
        delta_columns: diff.eligible.len(),
        percent_columns: columns
            .iter()
            .filter(|c| matches!(c.kind, ColumnKind::Metric { percentage: true, .. }))
            .count(),
        ..RenderStats::default()
    };

    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(worksheet_name(&options.report_name))
        .map_err(xlsx_err)?;

    // Metadata block: title, timestamp, optional summary, then one blank
    // spacer row before the table.
    let last_col = (columns.len() - 1) as u16;
    if last_col > 0 {
        worksheet
            .merge_range(0, 0, 0, last_col, &options.report_name, &formats.title)
            .map_err(xlsx_err)?;
    } else {
        worksheet
            .write_string_with_format(0, 0, &options.report_name, &formats.title)
            .map_err(xlsx_err)?;
    }
    worksheet
        .write_string_with_format(
            1,
            0,
            &format!("Generated: {}", current.timestamp),
            &formats.meta,
        )
        .map_err(xlsx_err)?;
    let header_row: u32 = match &options.summary {
        Some(summary) => {
            worksheet
                .write_string_with_format(2, 0, summary, &formats.meta)
                .map_err(xlsx_err)?;
            4
        }
        None => 3,
    };
    let data_first_row = header_row + 1;

    // Header row, colored by section.
    for (col, spec) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(
                header_row,
                col as u16,
                &spec.title,
                &header_format(spec.section),
            )
            .map_err(xlsx_err)?;
    }

    // Data rows.
    for (row_idx, row) in current.rows.iter().enumerate() {
        let out_row = data_first_row + row_idx as u32;
        for (col, spec) in columns.iter().enumerate() {
            let col = col as u16;
            match &spec.kind {
                ColumnKind::Department => {
                    let label = row.first().map(|c| c.to_display()).unwrap_or_default();
                    worksheet
                        .write_string_with_format(out_row, col, &label, &formats.text)
                        .map_err(xlsx_err)?;
                }
                ColumnKind::Metric {
                    header_idx,
                    percentage,
                } => {
                    let cell = row
                        .get(ReportSnapshot::metric_col(*header_idx))
                        .unwrap_or(&SnapshotCell::Empty);
                    write_metric(worksheet, out_row, col, cell, *percentage, &formats)
                        .map_err(xlsx_err)?;
                }
                ColumnKind::Delta {
                    header_idx,
                    percentage,
                } => {
                    let header = &current.headers[*header_idx];
                    let delta = diff
                        .rows
                        .get(row_idx)
                        .and_then(|r| r.deltas.get(header))
                        .copied()
                        .flatten();
                    match delta {
                        Some(value) => {
                            let value = if *percentage {
                                normalize_percent_delta(value)
                            } else {
                                value
                            };
                            worksheet
                                .write_number_with_format(
                                    out_row,
                                    col,
                                    value,
                                    formats.for_delta(value, *percentage),
                                )
                                .map_err(xlsx_err)?;
                        }
                        None => {
                            worksheet
                                .write_blank(out_row, col, &formats.delta_null)
                                .map_err(xlsx_err)?;
                        }
                    }
                }
            }
        }
    }

    // Column widths: generous department column, header-sized metrics,
    // narrow deltas.
    for (col, spec) in columns.iter().enumerate() {
        let width = match spec.kind {
            ColumnKind::Department => 24.0,
            ColumnKind::Metric { .. } => (spec.title.len() as f64 + 2.0).clamp(12.0, 36.0),
            ColumnKind::Delta { .. } => 9.0,
        };
        worksheet
            .set_column_width(col as u16, width)
            .map_err(xlsx_err)?;
    }

    // Proportional bars on percentage columns, scaled to the observed range.
    if !current.rows.is_empty() {
        let data_last_row = data_first_row + current.rows.len() as u32 - 1;
        for (col, spec) in columns.iter().enumerate() {
            let ColumnKind::Metric {
                header_idx,
                percentage: true,
            } = spec.kind
            else {
                continue;
            };
            let values: Vec<f64> = current
                .rows
                .iter()
                .filter_map(|row| row.get(ReportSnapshot::metric_col(header_idx)))
                .filter_map(|cell| cell.as_number())
                .map(normalize_percent)
                .collect();
            let (Some(min), Some(max)) = (
                values.iter().copied().reduce(f64::min),
                values.iter().copied().reduce(f64::max),
            ) else {
                continue;
            };
            if max <= min {
                continue;
            }
            let bar = ConditionalFormatDataBar::new()
                .set_minimum(ConditionalFormatType::Number, min)
                .set_maximum(ConditionalFormatType::Number, max)
                .set_fill_color(Color::RGB(DATA_BAR_COLOR));
            worksheet
                .add_conditional_format(data_first_row, col as u16, data_last_row, col as u16, &bar)
                .map_err(xlsx_err)?;
            stats.data_bars += 1;
        }
    }

    let buffer = workbook.save_to_buffer().map_err(xlsx_err)?;
    Ok((buffer, stats))
}

fn write_metric(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    cell: &SnapshotCell,
    percentage: bool,
    formats: &ExportFormats,
) -> Result<(), XlsxError> {
    match cell {
        SnapshotCell::Empty => {
            worksheet.write_blank(row, col, &formats.text)?;
        }
        _ if percentage => match cell.as_number() {
            Some(n) => {
                worksheet.write_number_with_format(
                    row,
                    col,
                    normalize_percent(n),
                    &formats.percent,
                )?;
            }
            None => {
                worksheet.write_string_with_format(row, col, &cell.to_display(), &formats.text)?;
            }
        },
        SnapshotCell::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, &formats.number)?;
        }
        SnapshotCell::Text(s) => {
            worksheet.write_string_with_format(row, col, s, &formats.text)?;
        }
    }
    Ok(())
}
