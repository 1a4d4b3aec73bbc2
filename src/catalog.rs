//! Static test catalog and the per-test layout rules the form and the
//! report views share.
//!
//! Every `TestKind` variant has exactly one definition here. Adding a test
//! type means adding a variant, a `build` arm, and its rules in
//! `input_widget`/`layout`/`choices` (plus `normalize` if it has
//! assembly-time rules).

use std::sync::LazyLock;

use crate::models::{AboGroup, CrpBand, Parameter, RhFactor, TestDefinition, TestKind};

/// Parameter names used by special-cased rules.
pub mod params {
    pub const TYPHI_TO: &str = "S. Typhi - TO";
    pub const TYPHI_TH: &str = "S. Typhi - TH";
    pub const PARA_TYPHI_AH: &str = "S. Para Typhi - AH";
    pub const PARA_TYPHI_BH: &str = "S. Para Typhi - BH";
    pub const ABO_GROUP: &str = "Blood Grouping (ABO)";
    pub const RH_FACTOR: &str = "Rh- Factor (Anti-D)";
    pub const CRP: &str = "CRP (C-Reactive Protein)";
}

/// Fixed value reported for the WIDAL para-typhi agglutinins.
pub const WIDAL_FIXED_TITER: &str = "1:80";

/// Maximum digits accepted for a WIDAL titer denominator.
pub const TITER_MAX_DIGITS: usize = 3;

static CATALOG: LazyLock<Vec<TestDefinition>> =
    LazyLock::new(|| TestKind::ALL.iter().map(|kind| build(*kind)).collect());

static ABO_CHOICES: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| AboGroup::ALL.iter().map(|g| g.as_str()).collect());
static RH_CHOICES: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| RhFactor::ALL.iter().map(|r| r.as_str()).collect());
static CRP_CHOICES: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| CrpBand::ALL.iter().map(|b| b.as_str()).collect());

fn build(kind: TestKind) -> TestDefinition {
    match kind {
        TestKind::Widal => TestDefinition {
            id: kind,
            name: "WIDAL TEST".into(),
            parameters: vec![
                Parameter::input(params::TYPHI_TO, "Ratio", "Less Than 1:80"),
                Parameter::input(params::TYPHI_TH, "Ratio", "Less Than 1:80"),
                Parameter::fixed(params::PARA_TYPHI_AH, "Ratio", "Less Than 1:80", WIDAL_FIXED_TITER),
                Parameter::fixed(params::PARA_TYPHI_BH, "Ratio", "Less Than 1:80", WIDAL_FIXED_TITER),
            ],
        },
        TestKind::BloodGrouping => TestDefinition {
            id: kind,
            name: "Blood Grouping".into(),
            parameters: vec![
                Parameter::input(params::ABO_GROUP, "Type", "A, B, AB, O"),
                Parameter::input(params::RH_FACTOR, "Type", "Positive/Negative"),
            ],
        },
        TestKind::Crp => TestDefinition {
            id: kind,
            name: "CRP".into(),
            parameters: vec![Parameter::input(params::CRP, "mg/dl", "Less than 6 mg/dl")],
        },
    }
}

/// All definitions, in `TestKind::ALL` order.
pub fn all() -> &'static [TestDefinition] {
    &CATALOG
}

pub fn definition(kind: TestKind) -> &'static TestDefinition {
    &CATALOG[kind as usize]
}

/// Look up a definition by its wire id (e.g. `"widal_test"`).
pub fn find(id: &str) -> Option<&'static TestDefinition> {
    id.parse::<TestKind>().ok().map(definition)
}

/// How a parameter is captured on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputWidget {
    /// Digits only, shown after a fixed `1:` prefix.
    Titer { max_digits: usize },
    Select(&'static [&'static str]),
    Radio(&'static [&'static str]),
    Text,
    /// Not editable; value injected at assembly.
    Fixed,
}

/// Table shape used for a test on the printed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLayout {
    /// TEST | RESULT
    TestResult,
    /// NAME OF TEST | RESULT | NORMAL RANGE
    NameResultRange,
}

impl ReportLayout {
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::TestResult => &["TEST", "RESULT"],
            Self::NameResultRange => &["NAME OF TEST", "RESULT", "NORMAL RANGE"],
        }
    }
}

impl TestKind {
    pub fn definition(self) -> &'static TestDefinition {
        definition(self)
    }

    /// Allowed literal values for a constrained parameter.
    pub fn choices(self, parameter: &str) -> Option<&'static [&'static str]> {
        match (self, parameter) {
            (TestKind::BloodGrouping, params::ABO_GROUP) => Some(ABO_CHOICES.as_slice()),
            (TestKind::BloodGrouping, params::RH_FACTOR) => Some(RH_CHOICES.as_slice()),
            (TestKind::Crp, params::CRP) => Some(CRP_CHOICES.as_slice()),
            _ => None,
        }
    }

    pub fn input_widget(self, parameter: &str) -> InputWidget {
        if self.definition().parameter(parameter).is_some_and(|p| !p.is_input) {
            return InputWidget::Fixed;
        }
        match (self, parameter) {
            (TestKind::Widal, params::TYPHI_TO | params::TYPHI_TH) => InputWidget::Titer {
                max_digits: TITER_MAX_DIGITS,
            },
            (TestKind::BloodGrouping, params::ABO_GROUP) => InputWidget::Select(ABO_CHOICES.as_slice()),
            _ => match self.choices(parameter) {
                Some(choices) => InputWidget::Radio(choices),
                None => InputWidget::Text,
            },
        }
    }

    pub fn layout(self) -> ReportLayout {
        match self {
            TestKind::BloodGrouping => ReportLayout::TestResult,
            TestKind::Widal | TestKind::Crp => ReportLayout::NameResultRange,
        }
    }
}
