// File I/O operations

pub mod csv;
pub mod excel;
pub mod export;
pub mod read;
pub mod store;

pub use export::{render_workbook, suggested_filename, ExportOptions, RenderStats, XLSX_MIME};
pub use read::{read_source, read_upload, SourceFile};
pub use store::JsonSnapshotStore;
