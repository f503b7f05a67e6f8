use std::fmt;

use serde::Serialize;

/// Visual grouping for one export column. Every qualified header maps to
/// exactly one section, which drives the header fill color in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Department,
    Placements,
    Assessments,
    Careers,
    Activities,
    Enrichment,
    Employment,
    EmployerActivity,
    EnrichmentActivity,
    Targets,
    Login,
    Default,
}

impl Section {
    /// Header fill color as 0xRRGGBB.
    pub fn color(self) -> u32 {
        match self {
            Section::Department => 0xD9E1F2,
            Section::Placements => 0xC6EFCE,
            Section::Assessments => 0xFFE699,
            Section::Careers => 0xBDD7EE,
            Section::Activities => 0xE2EFDA,
            Section::Enrichment => 0xFCE4D6,
            Section::Employment => 0xDDEBF7,
            Section::EmployerActivity => 0xD6DCE4,
            Section::EnrichmentActivity => 0xFFF2CC,
            Section::Targets => 0xF8CBAD,
            Section::Login => 0xEDEDED,
            Section::Default => 0xFFFFFF,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::Department => "department",
            Section::Placements => "placements",
            Section::Assessments => "assessments",
            Section::Careers => "careers",
            Section::Activities => "activities",
            Section::Enrichment => "enrichment",
            Section::Employment => "employment",
            Section::EmployerActivity => "employer-activity",
            Section::EnrichmentActivity => "enrichment-activity",
            Section::Targets => "targets",
            Section::Login => "login",
            Section::Default => "default",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Qualifier suffixes checked before any keyword rule. Order is load
/// bearing: "(employer activity)" must be tested before the bare employer
/// keywords, or those columns would land in the employment section.
const SUFFIX_RULES: &[(&str, Section)] = &[
    ("(employer activity)", Section::EmployerActivity),
    ("(enrichment activity)", Section::EnrichmentActivity),
    ("(enrichment)", Section::Enrichment),
    ("(employer)", Section::Employment),
    ("(employment)", Section::Employment),
    ("(placements)", Section::Placements),
    ("(careers)", Section::Careers),
    ("(assessments)", Section::Assessments),
    ("(targets)", Section::Targets),
    ("(login)", Section::Login),
];

/// Map one header to its section. Rules run in a fixed order: the exact
/// department label, then qualifier suffixes, then keyword fallbacks, then
/// the default.
pub fn classify(header: &str) -> Section {
    let h = header.trim().to_lowercase();
    if h == "department" {
        return Section::Department;
    }
    for (suffix, section) in SUFFIX_RULES {
        if h.contains(suffix) {
            return *section;
        }
    }
    if h.contains("placement") || h.contains("placed") || (h.contains("hours") && h.contains("scheduled")) {
        return Section::Placements;
    }
    if h.contains("enrichment") {
        return Section::Enrichment;
    }
    if h.contains("employer") && (h.contains("engagement") || h.contains("activity")) {
        return Section::Employment;
    }
    if h.contains("career") || h.contains("job profile") || h.contains("quiz") {
        return Section::Careers;
    }
    if h.contains("assessment") || h.contains("average score") || h.contains("students without") {
        return Section::Assessments;
    }
    if h.contains("activity") || h.contains("hours") {
        return Section::Activities;
    }
    if h.contains("login") || h.contains("access") {
        return Section::Login;
    }
    Section::Default
}
