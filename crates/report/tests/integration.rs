//! End-to-end pipeline tests: merge -> snapshot -> store -> diff.

use std::collections::BTreeMap;

use deptboard_report::{
    build_report, diff::diff_snapshots, snapshot_from_report, CellScalar, ManualOverride,
    MemorySnapshotStore, MetricValue, RawSheet, SnapshotCell, SnapshotStore, SourceSheets,
};

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

// ---------------------------------------------------------------------------
// Merge pipeline
// ---------------------------------------------------------------------------

#[test]
fn upload_batch_merges_across_systems() {
    let sources = vec![
        source(
            "Placements Week 6.xlsx",
            &[
                &["Department", "Total Students", "Placed"],
                &["Engineering", "100", "40"],
                &["Business", "80", "25"],
            ],
        ),
        source(
            "enrichment.csv",
            &[
                &["Program", "Total Students", "Hours"],
                &["Engineering", "80", "120"],
                &["Catering", "30", "45"],
            ],
        ),
        source(
            "login_audit.xlsx",
            &[
                &["Department", "Last Access"],
                &["Engineering", "2026-03-01"],
            ],
        ),
    ];
    let report = build_report(&sources, &BTreeMap::new());

    assert_eq!(
        report.departments,
        vec!["Engineering", "Business", "Catering"]
    );
    assert_eq!(
        report.headers,
        vec![
            "Total Students (placements)",
            "Placed (placements)",
            "Total Students (enrichment)",
            "Hours (enrichment)",
            "Last Access (login)",
        ]
    );

    let eng = &report.metrics["Engineering"];
    assert_eq!(
        eng["Total Students (placements)"],
        MetricValue::Number(100.0)
    );
    assert_eq!(eng["Total Students (enrichment)"], MetricValue::Number(80.0));
    assert_eq!(
        eng["Last Access (login)"],
        MetricValue::Text("2026-03-01".into())
    );

    assert_eq!(report.header_file_map["Hours (enrichment)"], 1);
    assert_eq!(report.file_info[2].content_type, "login");
    assert!(report.warnings.is_empty());
}

#[test]
fn override_and_malformed_sheet_in_one_batch() {
    let mut survey = source(
        "export (7).xlsx",
        &[&["Department", "Responses"], &["Engineering", "55"]],
    );
    survey
        .sheets
        .push(("Legend".to_string(), RawSheet::default()));

    let mut overrides = BTreeMap::new();
    overrides.insert(
        0,
        ManualOverride {
            content_type: "survey".to_string(),
            color: Some("#ABCDEF".to_string()),
        },
    );

    let report = build_report(&[survey], &overrides);
    assert_eq!(report.headers, vec!["Responses (survey)"]);
    assert_eq!(report.file_info[0].color.as_deref(), Some("#ABCDEF"));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("Legend"));
    assert_eq!(report.stats[0].sheets_read, 1);
    assert_eq!(report.stats[0].sheets_skipped, 1);
}

// ---------------------------------------------------------------------------
// Snapshot and diff pipeline
// ---------------------------------------------------------------------------

#[test]
fn period_over_period_flow_through_a_store() {
    let mut store = MemorySnapshotStore::new();

    // Week 1: no history, deltas default to zero.
    let week1 = build_report(
        &[source(
            "placements.xlsx",
            &[
                &["Department", "Placed"],
                &["Engineering", "40"],
                &["Business", "25"],
            ],
        )],
        &BTreeMap::new(),
    );
    let snap1 = snapshot_from_report(&week1);
    let previous = store.get("org-142", "termly").unwrap();
    let diff1 = diff_snapshots(&snap1, previous.as_ref());
    assert!(!diff1.had_previous);
    assert_eq!(diff1.delta(0, "Placed (placements)"), Some(0.0));
    store.put("org-142", "termly", &snap1).unwrap();

    // Week 2: history exists, deltas are real differences.
    let week2 = build_report(
        &[source(
            "placements.xlsx",
            &[
                &["Department", "Placed"],
                &["Engineering", "47"],
                &["Business", "22"],
                &["Catering", "5"],
            ],
        )],
        &BTreeMap::new(),
    );
    let snap2 = snapshot_from_report(&week2);
    let previous = store.get("org-142", "termly").unwrap();
    let diff2 = diff_snapshots(&snap2, previous.as_ref());

    assert!(diff2.had_previous);
    assert_eq!(diff2.delta(0, "Placed (placements)"), Some(7.0));
    assert_eq!(diff2.delta(1, "Placed (placements)"), Some(-3.0));
    // Catering is new this period: history exists but has no counterpart.
    assert_eq!(diff2.rows[2].deltas["Placed (placements)"], None);

    store.put("org-142", "termly", &snap2).unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn snapshot_preserves_empty_cells_for_missing_metrics() {
    let report = build_report(
        &[
            source(
                "placements.xlsx",
                &[&["Department", "Placed"], &["Engineering", "40"]],
            ),
            source(
                "targets.csv",
                &[&["Department", "Goal"], &["Business", "10"]],
            ),
        ],
        &BTreeMap::new(),
    );
    let snapshot = snapshot_from_report(&report);

    // Engineering has no targets value and Business has no placements value.
    assert_eq!(snapshot.rows[0][2], SnapshotCell::Empty);
    assert_eq!(snapshot.rows[1][1], SnapshotCell::Empty);

    // Empty cells diff to null once history exists.
    let diff = diff_snapshots(&snapshot, Some(&snapshot));
    assert_eq!(diff.rows[0].deltas["Goal (targets)"], None);
    assert_eq!(diff.rows[0].deltas["Placed (placements)"], Some(0.0));
}
