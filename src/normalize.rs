//! Result normalization: keystroke sanitizing, assembly-time rules and
//! display values.
//!
//! Nothing here fails. Values that are missing or outside a parameter's
//! allowed set display as [`PLACEHOLDER`]; gating happens in `form`.

use crate::catalog::{params, TITER_MAX_DIGITS};
use crate::models::{AboGroup, ResultSet, RhFactor, TestKind};

/// Printed for any missing or unrecognized value.
pub const PLACEHOLDER: &str = "N/A";

/// Prefix for WIDAL agglutination titers.
pub const TITER_PREFIX: &str = "1:";

/// Keep only ASCII digits, truncated to the titer width.
pub fn sanitize_titer_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(TITER_MAX_DIGITS)
        .collect()
}

/// Prefix a titer denominator with `1:`. Idempotent; blank stays blank.
pub fn prefix_titer(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with(TITER_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{TITER_PREFIX}{trimmed}")
    }
}

/// `1:` followed by one to three digits.
pub fn is_well_formed_titer(value: &str) -> bool {
    value.strip_prefix(TITER_PREFIX).is_some_and(|digits| {
        (1..=TITER_MAX_DIGITS).contains(&digits.len())
            && digits.chars().all(|c| c.is_ascii_digit())
    })
}

/// Combined ABO/Rh label such as `A+` or `O-`, when both parts are valid.
pub fn blood_group_label(abo: Option<&str>, rh: Option<&str>) -> Option<String> {
    let abo: AboGroup = abo?.trim().parse().ok()?;
    let rh: RhFactor = rh?.trim().parse().ok()?;
    Some(format!("{}{}", abo.as_str(), rh.symbol()))
}

impl TestKind {
    /// Clean a raw keystroke value for storage in the form state.
    pub fn sanitize_input(self, parameter: &str, raw: &str) -> String {
        match (self, parameter) {
            (TestKind::Widal, params::TYPHI_TO | params::TYPHI_TH) => sanitize_titer_input(raw),
            _ => raw.to_string(),
        }
    }

    /// Apply assembly-time rules to a copy of the stored results:
    /// kind-specific formatting, then fixed-value injection from the catalog.
    pub fn finalize(self, mut results: ResultSet) -> ResultSet {
        if self == TestKind::Widal {
            for parameter in [params::TYPHI_TO, params::TYPHI_TH] {
                if let Some(value) = results.get(parameter) {
                    if !value.trim().is_empty() {
                        let prefixed = prefix_titer(value);
                        results.insert(parameter, prefixed);
                    }
                }
            }
        }
        for (parameter, value) in self.definition().fixed_parameters() {
            results.insert(parameter.name.as_str(), value);
        }
        results
    }

    /// Value as printed for one parameter.
    pub fn display_value(self, parameter: &str, results: &ResultSet) -> String {
        let Some(value) = results.get(parameter).map(str::trim).filter(|v| !v.is_empty()) else {
            return PLACEHOLDER.to_string();
        };
        if self == TestKind::Widal && !is_well_formed_titer(value) {
            return PLACEHOLDER.to_string();
        }
        match self.choices(parameter) {
            Some(allowed) if !allowed.contains(&value) => PLACEHOLDER.to_string(),
            _ => value.to_string(),
        }
    }

    /// Printed rows for this test, shaped by `layout()`.
    pub fn report_rows(self, results: &ResultSet) -> Vec<ReportRow> {
        match self {
            TestKind::BloodGrouping => {
                let combined = blood_group_label(
                    results.get(params::ABO_GROUP),
                    results.get(params::RH_FACTOR),
                )
                .unwrap_or_else(|| self.display_value(params::ABO_GROUP, results));
                vec![
                    ReportRow {
                        name: params::ABO_GROUP.to_string(),
                        result: combined,
                        normal_range: None,
                    },
                    ReportRow {
                        name: params::RH_FACTOR.to_string(),
                        result: self.display_value(params::RH_FACTOR, results),
                        normal_range: None,
                    },
                ]
            }
            TestKind::Widal | TestKind::Crp => self
                .definition()
                .parameters
                .iter()
                .map(|p| ReportRow {
                    name: p.name.clone(),
                    result: self.display_value(&p.name, results),
                    normal_range: Some(p.normal_range.clone()),
                })
                .collect(),
        }
    }
}

/// One printed line of a test table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub name: String,
    pub result: String,
    pub normal_range: Option<String>,
}
