//! Untyped form input as it arrives from a browser or JSON client.
//!
//! `form::LabForm::from_submission` replays it as input events, so the
//! same sanitizing and deselection rules apply as for interactive edits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::FormMode;

/// Separator between test id and parameter name in url-encoded field names.
pub const RESULT_FIELD_SEPARATOR: &str = "::";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientInput {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub patient_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSubmission {
    pub mode: Option<FormMode>,
    pub edit_mode: bool,
    pub patient_info: PatientInput,
    pub selected_tests: Vec<String>,
    pub results: BTreeMap<String, BTreeMap<String, String>>,
}

impl FormSubmission {
    /// Build from url-encoded pairs. Unknown field names are ignored;
    /// malformed `mode` values fall back to the configured mode.
    pub fn from_fields(fields: &[(String, String)]) -> Self {
        let mut sub = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                "name" => sub.patient_info.name = value.clone(),
                "age" => sub.patient_info.age = value.clone(),
                "gender" => sub.patient_info.gender = value.clone(),
                "patient_id" => sub.patient_info.patient_id = value.clone(),
                "mode" => sub.mode = value.parse().ok(),
                "edit" => sub.edit_mode = value == "1" || value == "true",
                "test" => {
                    if !sub.selected_tests.contains(value) {
                        sub.selected_tests.push(value.clone());
                    }
                }
                other => {
                    if let Some((test_id, parameter)) = other.split_once(RESULT_FIELD_SEPARATOR) {
                        sub.results
                            .entry(test_id.to_string())
                            .or_default()
                            .insert(parameter.to_string(), value.clone());
                    }
                }
            }
        }
        sub
    }
}
