use std::collections::BTreeMap;

use crate::merge::ReportBuilder;
use crate::model::{
    ManualOverride, MergedReport, MetricValue, ReportSnapshot, SnapshotCell, SourceSheets,
};

/// Merge an upload batch into one report. Files fold in the order given;
/// that order decides same-domain collisions, so callers must pass files in
/// upload order.
pub fn build_report(
    sources: &[SourceSheets],
    overrides: &BTreeMap<usize, ManualOverride>,
) -> MergedReport {
    let mut builder = ReportBuilder::new();
    for (index, source) in sources.iter().enumerate() {
        builder.add_file(index, source, overrides.get(&index));
    }
    builder.finish()
}

/// Freeze a merged report into the snapshot shape used for change tracking.
/// Row cells align with `headers` shifted one right; index 0 holds the
/// department label.
pub fn snapshot_from_report(report: &MergedReport) -> ReportSnapshot {
    let mut rows = Vec::with_capacity(report.departments.len());
    for department in &report.departments {
        let mut row = Vec::with_capacity(report.headers.len() + 1);
        row.push(SnapshotCell::Text(department.clone()));
        let metrics = report.metrics.get(department);
        for header in &report.headers {
            let cell = match metrics.and_then(|m| m.get(header)) {
                Some(MetricValue::Number(n)) => SnapshotCell::Number(*n),
                Some(MetricValue::Text(s)) => SnapshotCell::Text(s.clone()),
                None => SnapshotCell::Empty,
            };
            row.push(cell);
        }
        rows.push(row);
    }
    ReportSnapshot {
        headers: report.headers.clone(),
        rows,
        timestamp: report.timestamp.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellScalar, RawSheet};

    fn text_sheet(rows: &[&[&str]]) -> RawSheet {
        RawSheet::new(
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| {
                            if cell.is_empty() {
                                CellScalar::Empty
                            } else {
                                CellScalar::Text((*cell).to_string())
                            }
                        })
                        .collect()
                })
                .collect(),
        )
    }

    fn source(original_name: &str, rows: &[&[&str]]) -> SourceSheets {
        SourceSheets {
            original_name: original_name.to_string(),
            filename: original_name.to_string(),
            sheets: vec![("Sheet1".to_string(), text_sheet(rows))],
        }
    }

    #[test]
    fn two_system_merge_qualifies_shared_headers() {
        let sources = vec![
            source(
                "placements.xlsx",
                &[&["Department", "Total Students"], &["Engineering", "100"]],
            ),
            source(
                "enrichment.csv",
                &[&["Program", "Total Students"], &["Engineering", "80"]],
            ),
        ];
        let report = build_report(&sources, &BTreeMap::new());

        assert_eq!(report.departments, vec!["Engineering"]);
        let eng = &report.metrics["Engineering"];
        assert_eq!(
            eng["Total Students (placements)"],
            MetricValue::Number(100.0)
        );
        assert_eq!(
            eng["Total Students (enrichment)"],
            MetricValue::Number(80.0)
        );
    }

    #[test]
    fn numbered_placeholder_rows_register_nothing() {
        let sources = vec![source(
            "placements.xlsx",
            &[&["Department", "Total Students"], &["1", "100"]],
        )];
        let report = build_report(&sources, &BTreeMap::new());
        assert!(report.departments.is_empty());
        assert!(report.metrics.is_empty());
    }

    #[test]
    fn file_info_content_type_round_trips_classification() {
        let sources = vec![source(
            "Careers Quiz Export.xlsx",
            &[&["Department", "Completions"], &["Maths", "4"]],
        )];
        let report = build_report(&sources, &BTreeMap::new());
        assert_eq!(report.file_info[0].content_type, "careers");
        assert_eq!(report.headers, vec!["Completions (careers)"]);
    }

    #[test]
    fn snapshot_rows_align_with_headers() {
        let sources = vec![
            source(
                "placements.xlsx",
                &[
                    &["Department", "Placed"],
                    &["Maths", "3"],
                    &["Science", "5"],
                ],
            ),
            source(
                "targets.csv",
                &[&["Department", "Goal"], &["Maths", "10"]],
            ),
        ];
        let report = build_report(&sources, &BTreeMap::new());
        let snapshot = snapshot_from_report(&report);

        assert_eq!(
            snapshot.headers,
            vec!["Placed (placements)", "Goal (targets)"]
        );
        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.rows[0][0], SnapshotCell::Text("Maths".into()));
        assert_eq!(snapshot.rows[0][1], SnapshotCell::Number(3.0));
        assert_eq!(snapshot.rows[0][2], SnapshotCell::Number(10.0));
        // Science has no targets value.
        assert_eq!(snapshot.rows[1][2], SnapshotCell::Empty);
        assert_eq!(snapshot.timestamp, report.timestamp);
    }

    #[test]
    fn overrides_apply_by_file_index() {
        let sources = vec![
            source("a.xlsx", &[&["Department", "X"], &["Maths", "1"]]),
            source("b.xlsx", &[&["Department", "X"], &["Maths", "2"]]),
        ];
        let mut overrides = BTreeMap::new();
        overrides.insert(
            1,
            ManualOverride {
                content_type: "survey".to_string(),
                color: None,
            },
        );
        let report = build_report(&sources, &overrides);
        assert_eq!(report.file_info[0].content_type, "default");
        assert_eq!(report.file_info[1].content_type, "survey");
        assert_eq!(report.headers, vec!["X (default)", "X (survey)"]);
    }
}
