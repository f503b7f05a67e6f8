use crate::model::{ContentDomain, RawSheet};

/// Filename keyword groups checked in order; the first group with any match
/// wins. Order matters: "placement_engagement.xlsx" must classify as
/// placements, not employer.
const NAME_RULES: &[(&[&str], ContentDomain)] = &[
    (&["placement", "placed"], ContentDomain::Placements),
    (&["enrichment", "enrich"], ContentDomain::Enrichment),
    (&["employer", "engagement"], ContentDomain::Employer),
    (&["career"], ContentDomain::Careers),
    (&["assessment", "assess"], ContentDomain::Assessments),
    (&["target"], ContentDomain::Targets),
    (&["login", "access"], ContentDomain::Login),
];

/// Markers scanned for inside sheet bodies. Deliberately narrow: export
/// banners only reliably distinguish the two activity systems, so content
/// never reclassifies any other domain. Enrichment is checked first because
/// some employer exports mention enrichment columns further down.
const CONTENT_RULES: &[(&[&str], ContentDomain)] = &[
    (&["enrichment activity", "enrichment"], ContentDomain::Enrichment),
    (&["employer activity", "employer engagement"], ContentDomain::Employer),
];

/// Classify a file by the name it was uploaded under.
pub fn classify_by_name(original_name: &str) -> ContentDomain {
    let name = original_name.to_lowercase();
    for (keywords, domain) in NAME_RULES {
        if keywords.iter().any(|k| name.contains(k)) {
            return *domain;
        }
    }
    ContentDomain::Default
}

/// Scan a sheet's cell text for an activity-system banner. Returns `None`
/// unless a marker is found, in which case the result overrides whatever
/// the filename said.
pub fn classify_by_content(sheet: &RawSheet) -> Option<ContentDomain> {
    for row in &sheet.rows {
        let joined = row
            .iter()
            .map(|cell| cell.to_display())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        for (markers, domain) in CONTENT_RULES {
            if markers.iter().any(|m| joined.contains(m)) {
                return Some(*domain);
            }
        }
    }
    None
}

/// Full per-file classification: filename keywords first, then the content
/// override across the file's sheets in order.
pub fn classify_file(original_name: &str, sheets: &[(String, RawSheet)]) -> ContentDomain {
    let by_name = classify_by_name(original_name);
    for (_, sheet) in sheets {
        if let Some(domain) = classify_by_content(sheet) {
            return domain;
        }
    }
    by_name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellScalar;

    fn sheet(rows: &[&[&str]]) -> RawSheet {
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

    #[test]
    fn name_keywords_map_to_domains() {
        assert_eq!(classify_by_name("Placement Report Q3.xlsx"), ContentDomain::Placements);
        assert_eq!(classify_by_name("students_placed_2026.csv"), ContentDomain::Placements);
        assert_eq!(classify_by_name("Enrichment-Hours.xls"), ContentDomain::Enrichment);
        assert_eq!(classify_by_name("employer_engagement.xlsx"), ContentDomain::Employer);
        assert_eq!(classify_by_name("careers quiz export.csv"), ContentDomain::Careers);
        assert_eq!(classify_by_name("ASSESSMENT_SCORES.xlsx"), ContentDomain::Assessments);
        assert_eq!(classify_by_name("targets-by-department.csv"), ContentDomain::Targets);
        assert_eq!(classify_by_name("login audit.xlsx"), ContentDomain::Login);
        assert_eq!(classify_by_name("misc data.xlsx"), ContentDomain::Default);
    }

    #[test]
    fn earlier_name_rule_wins_on_overlap() {
        // Contains both "placement" and "engagement"; placement is listed first.
        assert_eq!(
            classify_by_name("placement_engagement.xlsx"),
            ContentDomain::Placements
        );
    }

    #[test]
    fn content_banner_overrides_misleading_name() {
        let s = sheet(&[
            &["Enrichment Activity Report", "", ""],
            &["Department", "Hours", "Students"],
            &["Maths", "10", "5"],
        ]);
        assert_eq!(
            classify_file("export (3).xlsx", &[("Sheet1".into(), s)]),
            ContentDomain::Enrichment
        );
    }

    #[test]
    fn content_override_is_limited_to_activity_systems() {
        // A placements banner is not a content marker; the filename verdict
        // stands.
        let s = sheet(&[
            &["Placements Summary", ""],
            &["Department", "Placed"],
        ]);
        assert_eq!(classify_by_content(&s), None);
        assert_eq!(
            classify_file("weekly download.xlsx", &[("Sheet1".into(), s)]),
            ContentDomain::Default
        );
    }

    #[test]
    fn enrichment_marker_beats_employer_marker() {
        let s = sheet(&[&["Enrichment Activity", "Employer Activity"]]);
        assert_eq!(classify_by_content(&s), Some(ContentDomain::Enrichment));
    }

    #[test]
    fn numeric_cells_join_into_the_scan_text() {
        let s = sheet(&[&["2026", "employer activity summary"]]);
        assert_eq!(classify_by_content(&s), Some(ContentDomain::Employer));
    }
}
