use std::collections::{BTreeMap, HashMap};

use crate::model::{ReportSnapshot, RowDiff, SnapshotDiff};

/// How many leading data rows are sampled when judging whether a column is
/// numeric. Sampling keeps eligibility cheap on wide uploads; a stray text
/// value past the sample window does not flip the verdict.
pub const NUMERIC_SAMPLE_ROWS: usize = 25;

/// A header names a percentage when it contains a percent sign or the word
/// itself.
pub fn is_percentage_header(header: &str) -> bool {
    header.contains('%') || header.to_lowercase().contains("percent")
}

/// Judge one metric column numeric over the sample window: at least one
/// non-empty value, and every non-empty sampled cell parses as a number.
pub fn is_numeric_column(snapshot: &ReportSnapshot, header_idx: usize) -> bool {
    let col = ReportSnapshot::metric_col(header_idx);
    let mut seen_value = false;
    for row in snapshot.rows.iter().take(NUMERIC_SAMPLE_ROWS) {
        let cell = match row.get(col) {
            Some(c) => c,
            None => continue,
        };
        if cell.is_empty() {
            continue;
        }
        if cell.as_number().is_none() {
            return false;
        }
        seen_value = true;
    }
    seen_value
}

fn eligible_indexes(current: &ReportSnapshot) -> Vec<usize> {
    (0..current.headers.len())
        .filter(|&idx| {
            is_numeric_column(current, idx) || is_percentage_header(&current.headers[idx])
        })
        .collect()
}

/// Headers that earn a delta column, in snapshot order. The department
/// column and purely textual columns never qualify.
pub fn eligible_headers(current: &ReportSnapshot) -> Vec<String> {
    eligible_indexes(current)
        .into_iter()
        .map(|idx| current.headers[idx].clone())
        .collect()
}

fn department_key(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Diff `current` against `previous`.
///
/// With no previous snapshot every eligible delta is exactly 0; that is the
/// "no history" convention. With a previous snapshot, a cell whose
/// counterpart is missing or non-numeric yields `None` instead, so callers
/// can tell "new this period" apart from "unchanged".
pub fn diff_snapshots(current: &ReportSnapshot, previous: Option<&ReportSnapshot>) -> SnapshotDiff {
    let eligible_idx = eligible_indexes(current);
    let eligible: Vec<String> = eligible_idx
        .iter()
        .map(|&idx| current.headers[idx].clone())
        .collect();

    let prev_header_cols: HashMap<&str, usize> = previous
        .map(|p| {
            p.headers
                .iter()
                .enumerate()
                .map(|(idx, h)| (h.as_str(), ReportSnapshot::metric_col(idx)))
                .collect()
        })
        .unwrap_or_default();
    let prev_rows: HashMap<String, usize> = previous
        .map(|p| {
            p.rows
                .iter()
                .enumerate()
                .filter_map(|(idx, row)| {
                    row.first().map(|c| (department_key(&c.to_display()), idx))
                })
                .collect()
        })
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(current.rows.len());
    for row in &current.rows {
        let department = row.first().map(|c| c.to_display()).unwrap_or_default();
        let mut deltas: BTreeMap<String, Option<f64>> = BTreeMap::new();

        for &idx in &eligible_idx {
            let header = &current.headers[idx];
            let prev = match previous {
                None => {
                    deltas.insert(header.clone(), Some(0.0));
                    continue;
                }
                Some(p) => p,
            };
            let delta = prev_header_cols
                .get(header.as_str())
                .and_then(|&prev_col| {
                    let prev_row = *prev_rows.get(&department_key(&department))?;
                    let old = prev.rows.get(prev_row)?.get(prev_col)?.as_number()?;
                    let new = row.get(ReportSnapshot::metric_col(idx))?.as_number()?;
                    Some(new - old)
                });
            deltas.insert(header.clone(), delta);
        }

        rows.push(RowDiff { department, deltas });
    }

    SnapshotDiff {
        eligible,
        rows,
        had_previous: previous.is_some(),
    }
}
