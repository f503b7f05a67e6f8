use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ReportError;
use crate::model::ManualOverride;

// ---------------------------------------------------------------------------
// Upload manifest
// ---------------------------------------------------------------------------

/// One file entry in an upload manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    /// Name the file was uploaded under. Classification keys off this, so it
    /// can differ from the stored path. Defaults to the path's basename.
    #[serde(default)]
    pub original_name: Option<String>,
    /// Manual content type. When set, classification is skipped and this
    /// string qualifies the file's metrics verbatim.
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
    /// Display color carried through to file metadata untouched.
    #[serde(default)]
    pub color: Option<String>,
}

impl ManifestFile {
    pub fn resolved_name(&self) -> String {
        match &self.original_name {
            Some(name) => name.clone(),
            None => Path::new(&self.path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.clone()),
        }
    }
}

/// Declarative description of one upload batch: which files to merge, in
/// which order, under which report identity.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadManifest {
    /// Report name used for the export title and suggested filename.
    pub name: String,
    /// Organization scope for snapshot storage.
    #[serde(default)]
    pub organization: Option<String>,
    /// Template key for snapshot storage. Snapshots of the same template
    /// diff against each other.
    #[serde(default)]
    pub template: Option<String>,
    /// Free-text line included in the export metadata block.
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

impl UploadManifest {
    pub fn from_toml(input: &str) -> Result<UploadManifest, ReportError> {
        let manifest: UploadManifest =
            toml::from_str(input).map_err(|e| ReportError::ManifestInvalid(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ReportError> {
        if self.name.trim().is_empty() {
            return Err(ReportError::ManifestInvalid("report name is empty".into()));
        }
        if self.files.is_empty() {
            return Err(ReportError::ManifestInvalid("no files listed".into()));
        }
        for (index, file) in self.files.iter().enumerate() {
            if file.path.trim().is_empty() {
                return Err(ReportError::ManifestInvalid(format!(
                    "file {} has an empty path",
                    index
                )));
            }
        }
        if self.organization.is_some() != self.template.is_some() {
            return Err(ReportError::ManifestInvalid(
                "organization and template must be set together".into(),
            ));
        }
        Ok(())
    }

    /// Manual overrides in engine form, keyed by file index.
    pub fn overrides(&self) -> BTreeMap<usize, ManualOverride> {
        self.files
            .iter()
            .enumerate()
            .filter_map(|(index, file)| {
                file.content_type.as_ref().map(|content_type| {
                    (
                        index,
                        ManualOverride {
                            content_type: content_type.clone(),
                            color: file.color.clone(),
                        },
                    )
                })
            })
            .collect()
    }

    /// True when the manifest names a snapshot scope.
    pub fn tracks_history(&self) -> bool {
        self.organization.is_some() && self.template.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
name = "Spring Term Review"
organization = "org-142"
template = "termly-kpis"
summary = "Covers weeks 1-6"

[[files]]
path = "uploads/placements.xlsx"

[[files]]
path = "uploads/export (3).xlsx"
original_name = "Enrichment Hours.xlsx"

[[files]]
path = "uploads/survey.csv"
type = "survey"
color = "#DDEEFF"
"##;

    #[test]
    fn parses_a_full_manifest() {
        let manifest = UploadManifest::from_toml(SAMPLE).unwrap();
        assert_eq!(manifest.name, "Spring Term Review");
        assert_eq!(manifest.files.len(), 3);
        assert!(manifest.tracks_history());
        assert_eq!(manifest.files[0].resolved_name(), "placements.xlsx");
        assert_eq!(manifest.files[1].resolved_name(), "Enrichment Hours.xlsx");
    }

    #[test]
    fn overrides_are_keyed_by_file_index() {
        let manifest = UploadManifest::from_toml(SAMPLE).unwrap();
        let overrides = manifest.overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[&2].content_type, "survey");
        assert_eq!(overrides[&2].color.as_deref(), Some("#DDEEFF"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = UploadManifest::from_toml(
            r#"
name = "  "
[[files]]
path = "a.csv"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("report name"));
    }

    #[test]
    fn file_list_must_not_be_empty() {
        let err = UploadManifest::from_toml(r#"name = "X""#).unwrap_err();
        assert!(err.to_string().contains("no files"));
    }

    #[test]
    fn organization_requires_template() {
        let err = UploadManifest::from_toml(
            r#"
name = "X"
organization = "org-1"
[[files]]
path = "a.csv"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("together"));
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let err = UploadManifest::from_toml("name = ").unwrap_err();
        assert!(matches!(err, ReportError::ManifestInvalid(_)));
    }
}
