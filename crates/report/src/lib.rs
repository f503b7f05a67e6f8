//! deptboard-report — department metrics consolidation engine.
//!
//! Merges spreadsheet exports from several source systems into one
//! per-department metrics table, freezes the table into snapshots, and
//! diffs snapshots of the same template for change tracking.
//!
//! The crate is pure: it receives pre-decoded sheets and returns values.
//! File decoding, snapshot persistence, and workbook rendering live in
//! `deptboard-io`.

pub mod classify;
pub mod diff;
pub mod engine;
pub mod error;
pub mod headers;
pub mod manifest;
pub mod merge;
pub mod model;
pub mod section;
pub mod store;

pub use engine::{build_report, snapshot_from_report};
pub use error::ReportError;
pub use manifest::UploadManifest;
pub use model::{
    CellScalar, ContentDomain, FileInfo, ManualOverride, MergeStats, MergedReport, MetricValue,
    RawSheet, ReportSnapshot, RowDiff, SnapshotCell, SnapshotDiff, SourceSheets,
};
pub use store::{MemorySnapshotStore, SnapshotStore};
