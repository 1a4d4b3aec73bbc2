//! Boundary checks for payloads that did not come from `assemble`.

use std::collections::HashSet;

use crate::models::{PatientField, ReportPayload, TestKind};
use crate::normalize::is_well_formed_titer;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Report contains no tests")]
    NoTests,
    #[error("Patient information incomplete: missing {0:?}")]
    IncompletePatient(Vec<PatientField>),
    #[error("Test {0} appears more than once")]
    DuplicateTest(TestKind),
    #[error("Definition for {0} does not match the catalog")]
    DefinitionMismatch(TestKind),
    #[error("{test} has no parameter named {parameter:?}")]
    UnknownParameter { test: TestKind, parameter: String },
    #[error("{parameter:?} on {test} must be {expected:?}")]
    FixedValueMismatch {
        test: TestKind,
        parameter: String,
        expected: String,
    },
    #[error("{parameter:?} on {test} is not a titer: {value:?}")]
    MalformedTiter {
        test: TestKind,
        parameter: String,
        value: String,
    },
    #[error("Multiple-tests flag disagrees with {count} test(s)")]
    MultipleFlagMismatch { count: usize },
}

/// Reject a payload the print view should not render.
///
/// Missing input values are allowed (they print as `N/A`); structural
/// problems are not.
pub fn validate_payload(payload: &ReportPayload) -> Result<(), PayloadError> {
    let tests = payload.tests();
    if tests.is_empty() {
        return Err(PayloadError::NoTests);
    }

    let missing = payload.patient_info().missing_fields();
    if !missing.is_empty() {
        return Err(PayloadError::IncompletePatient(missing));
    }

    if payload.is_multiple_tests() != (tests.len() > 1) {
        return Err(PayloadError::MultipleFlagMismatch { count: tests.len() });
    }

    let mut seen = HashSet::new();
    for item in tests {
        let kind = item.kind();
        if !seen.insert(kind) {
            return Err(PayloadError::DuplicateTest(kind));
        }
        if &item.test != kind.definition() {
            return Err(PayloadError::DefinitionMismatch(kind));
        }
        if let Some(parameter) = item.results.keys().find(|k| item.test.parameter(k).is_none()) {
            return Err(PayloadError::UnknownParameter {
                test: kind,
                parameter: parameter.to_string(),
            });
        }
        for (param, expected) in item.test.fixed_parameters() {
            if item.results.get(&param.name) != Some(expected) {
                return Err(PayloadError::FixedValueMismatch {
                    test: kind,
                    parameter: param.name.clone(),
                    expected: expected.to_string(),
                });
            }
        }
        if kind == TestKind::Widal {
            let malformed = item
                .results
                .iter()
                .map(|(parameter, value)| (parameter, value.trim()))
                .find(|(_, value)| !value.is_empty() && !is_well_formed_titer(value));
            if let Some((parameter, value)) = malformed {
                return Err(PayloadError::MalformedTiter {
                    test: kind,
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::params;
    use crate::models::{Gender, PatientInfo, ResultSet};
    use crate::report::assemble;
    use serde_json::{json, Value};

    fn at() -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 1, 2)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap()
    }

    fn valid_json() -> Value {
        let patient = PatientInfo {
            name: "Jane Doe".into(),
            age: "30".into(),
            gender: Some(Gender::Female),
            patient_id: String::new(),
        };
        let widal: ResultSet = [(params::TYPHI_TO, "160")].into_iter().collect();
        serde_json::to_value(assemble(patient, [(TestKind::Widal, widal)], at())).unwrap()
    }

    fn check(value: Value) -> Result<(), PayloadError> {
        let payload: ReportPayload = serde_json::from_value(value).unwrap();
        validate_payload(&payload)
    }

    #[test]
    fn assembled_payload_is_valid() {
        assert_eq!(check(valid_json()), Ok(()));
    }

    #[test]
    fn empty_tests_rejected() {
        let mut v = valid_json();
        v["tests"] = json!([]);
        assert_eq!(check(v), Err(PayloadError::NoTests));
    }

    #[test]
    fn incomplete_patient_rejected() {
        let mut v = valid_json();
        v["patientInfo"]["gender"] = Value::Null;
        assert_eq!(
            check(v),
            Err(PayloadError::IncompletePatient(vec![PatientField::Gender]))
        );
    }

    #[test]
    fn flag_mismatch_rejected() {
        let mut v = valid_json();
        v["isMultipleTests"] = json!(true);
        assert_eq!(check(v), Err(PayloadError::MultipleFlagMismatch { count: 1 }));
    }

    #[test]
    fn tampered_fixed_value_rejected() {
        let mut v = valid_json();
        v["tests"][0]["results"][params::PARA_TYPHI_AH] = json!("1:640");
        assert!(matches!(check(v), Err(PayloadError::FixedValueMismatch { .. })));
    }

    #[test]
    fn malformed_titer_rejected() {
        let mut v = valid_json();
        v["tests"][0]["results"][params::TYPHI_TO] = json!("1:abc");
        assert_eq!(
            check(v),
            Err(PayloadError::MalformedTiter {
                test: TestKind::Widal,
                parameter: params::TYPHI_TO.to_string(),
                value: "1:abc".to_string(),
            })
        );
    }

    #[test]
    fn blank_titer_is_allowed() {
        let mut v = valid_json();
        v["tests"][0]["results"][params::TYPHI_TH] = json!("");
        assert_eq!(check(v), Ok(()));
    }

    #[test]
    fn edited_definition_rejected() {
        let mut v = valid_json();
        v["tests"][0]["test"]["name"] = json!("WIDAL");
        assert_eq!(check(v), Err(PayloadError::DefinitionMismatch(TestKind::Widal)));
    }

    #[test]
    fn unknown_parameter_rejected() {
        let mut v = valid_json();
        v["tests"][0]["results"]["S. Typhi - XO"] = json!("1:40");
        assert!(matches!(check(v), Err(PayloadError::UnknownParameter { .. })));
    }

    #[test]
    fn duplicate_test_rejected() {
        let mut v = valid_json();
        let first = v["tests"][0].clone();
        v["tests"] = json!([first.clone(), first]);
        v["isMultipleTests"] = json!(true);
        assert_eq!(check(v), Err(PayloadError::DuplicateTest(TestKind::Widal)));
    }

    #[test]
    fn unknown_test_id_fails_to_parse() {
        let mut v = valid_json();
        v["tests"][0]["test"]["id"] = json!("lipid_profile");
        assert!(serde_json::from_value::<ReportPayload>(v).is_err());
    }
}
