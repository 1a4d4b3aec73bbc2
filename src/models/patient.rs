use serde::{Deserialize, Serialize};

use super::enums::{Gender, PatientField};

/// Patient demographics as entered on the form.
///
/// `gender` is `None` until a choice is made; `patient_id` may stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientInfo {
    pub name: String,
    pub age: String,
    pub gender: Option<Gender>,
    pub patient_id: String,
}

impl PatientInfo {
    /// Required fields that are still blank, in form order.
    pub fn missing_fields(&self) -> Vec<PatientField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(PatientField::Name);
        }
        if self.age.trim().is_empty() {
            missing.push(PatientField::Age);
        }
        if self.gender.is_none() {
            missing.push(PatientField::Gender);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Registration number as printed; blank IDs print as `N/A`.
    pub fn registration_label(&self) -> &str {
        let id = self.patient_id.trim();
        if id.is_empty() {
            crate::normalize::PLACEHOLDER
        } else {
            id
        }
    }
}
