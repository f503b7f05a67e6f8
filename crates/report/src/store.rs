use std::collections::HashMap;

use crate::error::ReportError;
use crate::model::ReportSnapshot;

/// Persistence seam for change tracking. The engine computes snapshots and
/// diffs from values it is handed; where the previous snapshot lives is the
/// caller's concern.
pub trait SnapshotStore {
    /// Fetch the stored snapshot for a template, if any. `Ok(None)` means no
    /// history exists yet, which downstream code treats as the zero-delta
    /// case rather than an error.
    fn get(
        &self,
        organization_id: &str,
        template_key: &str,
    ) -> Result<Option<ReportSnapshot>, ReportError>;

    /// Replace the stored snapshot for a template.
    fn put(
        &mut self,
        organization_id: &str,
        template_key: &str,
        snapshot: &ReportSnapshot,
    ) -> Result<(), ReportError>;
}

/// In-memory store used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: HashMap<(String, String), ReportSnapshot>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        MemorySnapshotStore::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(
        &self,
        organization_id: &str,
        template_key: &str,
    ) -> Result<Option<ReportSnapshot>, ReportError> {
        let key = (organization_id.to_string(), template_key.to_string());
        Ok(self.snapshots.get(&key).cloned())
    }

    fn put(
        &mut self,
        organization_id: &str,
        template_key: &str,
        snapshot: &ReportSnapshot,
    ) -> Result<(), ReportError> {
        let key = (organization_id.to_string(), template_key.to_string());
        self.snapshots.insert(key, snapshot.clone());
        Ok(())
    }
}
