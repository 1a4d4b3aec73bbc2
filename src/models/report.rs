use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::TestKind;
use super::patient::PatientInfo;
use super::results::ResultSet;
use super::test_definition::TestDefinition;

/// A test definition paired with its normalized results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledTest {
    pub test: TestDefinition,
    pub results: ResultSet,
}

impl AssembledTest {
    pub fn kind(&self) -> TestKind {
        self.test.id
    }
}

/// The frozen hand-off from the form to the print view.
///
/// Only built by `report::assemble` or deserialized and then checked with
/// `report::validate_payload`. Fields are read-only; editing goes back
/// through the form via [`EditRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    patient_info: PatientInfo,
    tests: Vec<AssembledTest>,
    is_multiple_tests: bool,
    generated_at: NaiveDateTime,
}

impl ReportPayload {
    pub(crate) fn new(
        patient_info: PatientInfo,
        tests: Vec<AssembledTest>,
        generated_at: NaiveDateTime,
    ) -> Self {
        let is_multiple_tests = tests.len() > 1;
        Self {
            patient_info,
            tests,
            is_multiple_tests,
            generated_at,
        }
    }

    pub fn patient_info(&self) -> &PatientInfo {
        &self.patient_info
    }

    pub fn tests(&self) -> &[AssembledTest] {
        &self.tests
    }

    pub fn is_multiple_tests(&self) -> bool {
        self.is_multiple_tests
    }

    pub fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    pub fn test(&self, kind: TestKind) -> Option<&AssembledTest> {
        self.tests.iter().find(|t| t.kind() == kind)
    }
}

/// Data the print view sends back to re-open the form for editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub edit_mode: bool,
    pub patient_info: PatientInfo,
    pub selected_tests: Vec<AssembledTest>,
}

impl EditRequest {
    pub fn from_payload(payload: &ReportPayload) -> Self {
        Self {
            edit_mode: true,
            patient_info: payload.patient_info.clone(),
            selected_tests: payload.tests.clone(),
        }
    }
}
