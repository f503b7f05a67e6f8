// Snapshot persistence - one JSON document per organization/template pair

use std::fs;
use std::path::{Path, PathBuf};

use deptboard_report::{ReportError, ReportSnapshot, SnapshotStore};

/// Directory-backed store: `<root>/<organization>/<template>.json`.
#[derive(Debug)]
pub struct JsonSnapshotStore {
    root: PathBuf,
}

impl JsonSnapshotStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<JsonSnapshotStore, ReportError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            ReportError::Store(format!("failed to create '{}': {e}", root.display()))
        })?;
        Ok(JsonSnapshotStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, organization_id: &str, template_key: &str) -> PathBuf {
        self.root
            .join(sanitize_component(organization_id))
            .join(format!("{}.json", sanitize_component(template_key)))
    }

    /// List stored (organization, template) pairs, sorted.
    pub fn list(&self) -> Result<Vec<(String, String)>, ReportError> {
        let mut entries = Vec::new();
        let orgs = fs::read_dir(&self.root).map_err(|e| {
            ReportError::Store(format!("failed to list '{}': {e}", self.root.display()))
        })?;
        for org in orgs {
            let org = org.map_err(|e| ReportError::Store(e.to_string()))?;
            if !org.path().is_dir() {
                continue;
            }
            let org_name = org.file_name().to_string_lossy().into_owned();
            let files = fs::read_dir(org.path()).map_err(|e| {
                ReportError::Store(format!("failed to list '{}': {e}", org.path().display()))
            })?;
            for file in files {
                let file = file.map_err(|e| ReportError::Store(e.to_string()))?;
                let path = file.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    if let Some(stem) = path.file_stem() {
                        entries.push((org_name.clone(), stem.to_string_lossy().into_owned()));
                    }
                }
            }
        }
        entries.sort();
        Ok(entries)
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn get(
        &self,
        organization_id: &str,
        template_key: &str,
    ) -> Result<Option<ReportSnapshot>, ReportError> {
        let path = self.snapshot_path(organization_id, template_key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            ReportError::Store(format!("failed to read '{}': {e}", path.display()))
        })?;
        let snapshot = serde_json::from_str(&content).map_err(|e| {
            ReportError::Store(format!("corrupt snapshot '{}': {e}", path.display()))
        })?;
        Ok(Some(snapshot))
    }

    fn put(
        &mut self,
        organization_id: &str,
        template_key: &str,
        snapshot: &ReportSnapshot,
    ) -> Result<(), ReportError> {
        let path = self.snapshot_path(organization_id, template_key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ReportError::Store(format!("failed to create '{}': {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| ReportError::Store(format!("failed to encode snapshot: {e}")))?;
        fs::write(&path, json).map_err(|e| {
            ReportError::Store(format!("failed to write '{}': {e}", path.display()))
        })?;
        Ok(())
    }
}

/// Keep identifiers filesystem-safe. Anything outside a conservative set
/// becomes '-', and dot-only names are rejected outright.
fn sanitize_component(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "-".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deptboard_report::SnapshotCell;
    use tempfile::tempdir;

    fn snapshot(stamp: &str) -> ReportSnapshot {
        ReportSnapshot {
            headers: vec!["Placed (placements)".to_string()],
            rows: vec![vec![
                SnapshotCell::Text("Maths".into()),
                SnapshotCell::Number(3.0),
            ]],
            timestamp: stamp.to_string(),
        }
    }

    #[test]
    fn test_get_before_put_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonSnapshotStore::open(dir.path().join("snapshots")).unwrap();
        assert!(store.get("org-142", "termly").unwrap().is_none());
    }

    #[test]
    fn test_round_trip_preserves_cells() {
        let dir = tempdir().unwrap();
        let mut store = JsonSnapshotStore::open(dir.path().join("snapshots")).unwrap();

        let mut snap = snapshot("2026-03-01T09:00:00Z");
        snap.rows[0].push(SnapshotCell::Empty);
        snap.headers.push("Goal (targets)".to_string());

        store.put("org-142", "termly", &snap).unwrap();
        let loaded = store.get("org-142", "termly").unwrap().unwrap();
        assert_eq!(loaded, snap);
    }

    #[test]
    fn test_put_overwrites_previous() {
        let dir = tempdir().unwrap();
        let mut store = JsonSnapshotStore::open(dir.path().join("snapshots")).unwrap();
        store.put("org-142", "termly", &snapshot("t1")).unwrap();
        store.put("org-142", "termly", &snapshot("t2")).unwrap();
        let loaded = store.get("org-142", "termly").unwrap().unwrap();
        assert_eq!(loaded.timestamp, "t2");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_is_sorted() {
        let dir = tempdir().unwrap();
        let mut store = JsonSnapshotStore::open(dir.path().join("snapshots")).unwrap();
        store.put("org-b", "weekly", &snapshot("t")).unwrap();
        store.put("org-a", "termly", &snapshot("t")).unwrap();
        store.put("org-a", "annual", &snapshot("t")).unwrap();
        assert_eq!(
            store.list().unwrap(),
            vec![
                ("org-a".to_string(), "annual".to_string()),
                ("org-a".to_string(), "termly".to_string()),
                ("org-b".to_string(), "weekly".to_string()),
            ]
        );
    }

    #[test]
    fn test_hostile_identifiers_stay_inside_the_root() {
        let dir = tempdir().unwrap();
        let mut store = JsonSnapshotStore::open(dir.path().join("snapshots")).unwrap();
        store.put("../escape", "..", &snapshot("t")).unwrap();

        // Written under a sanitized name, not outside the root.
        assert!(!dir.path().join("escape").exists());
        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "..-escape");
    }

    #[test]
    fn test_corrupt_snapshot_is_a_store_error() {
        let dir = tempdir().unwrap();
        let store = JsonSnapshotStore::open(dir.path().join("snapshots")).unwrap();
        let org_dir = dir.path().join("snapshots").join("org-142");
        fs::create_dir_all(&org_dir).unwrap();
        fs::write(org_dir.join("termly.json"), "not json").unwrap();

        let err = store.get("org-142", "termly").unwrap_err();
        assert!(matches!(err, ReportError::Store(_)));
    }
}
