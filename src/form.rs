//! Form state holder and completion gate.
//!
//! `LabForm` owns one form session: patient info, the selected tests in
//! selection order, and the raw results of each selected test. All
//! mutation is synchronous; the only way out is [`LabForm::assemble`],
//! which is refused until the gate opens.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{
    EditRequest, FormMode, FormSubmission, Gender, ModelError, PatientField, PatientInfo,
    ReportPayload, ResultSet, TestKind,
};
use crate::report;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Unknown test: {0}")]
    UnknownTest(String),
    #[error("{test} has no parameter named {parameter:?}")]
    UnknownParameter { test: TestKind, parameter: String },
    #[error("{parameter:?} on {test} is not editable")]
    NotEditable { test: TestKind, parameter: String },
    #[error("{0} is not selected")]
    TestNotSelected(TestKind),
    #[error(transparent)]
    InvalidChoice(#[from] ModelError),
    #[error("Report generation blocked: {0}")]
    Blocked(GenerationBlocked),
}

/// Why the generate action is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GenerationBlocked {
    #[error("patient information incomplete ({})", field_list(.missing))]
    PatientInfoIncomplete { missing: Vec<PatientField> },
    #[error("no test selected")]
    NoTestSelected,
    #[error("no selected test has all results entered")]
    NoCompleteTest,
}

fn field_list(fields: &[PatientField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Gate status snapshot for views and the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub patient_complete: bool,
    pub missing_patient_fields: Vec<PatientField>,
    pub complete_tests: Vec<TestKind>,
    pub incomplete_tests: Vec<TestKind>,
    pub can_generate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabForm {
    mode: FormMode,
    edit_mode: bool,
    patient: PatientInfo,
    selected: Vec<TestKind>,
    results: BTreeMap<TestKind, ResultSet>,
}

impl LabForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Repopulate from the print view's edit data, exactly as stored.
    ///
    /// A multi-test report always re-opens in `Multiple` mode so no
    /// selection is lost.
    pub fn from_edit(mode: FormMode, edit: &EditRequest) -> Self {
        let mode = if edit.selected_tests.len() > 1 {
            FormMode::Multiple
        } else {
            mode
        };
        let mut form = Self::new(mode);
        form.edit_mode = edit.edit_mode;
        form.patient = edit.patient_info.clone();
        for item in &edit.selected_tests {
            let kind = item.kind();
            if !form.selected.contains(&kind) {
                form.selected.push(kind);
            }
            form.results.insert(kind, item.results.clone());
        }
        form
    }

    /// Replay an untyped submission as input events.
    ///
    /// Results for tests that are not selected are dropped, as if the test
    /// had been deselected. Values for fixed parameters are ignored.
    pub fn from_submission(default_mode: FormMode, sub: &FormSubmission) -> Result<Self, FormError> {
        let mut form = Self::new(sub.mode.unwrap_or(default_mode));
        form.edit_mode = sub.edit_mode;

        let info = &sub.patient_info;
        form.set_patient_field(PatientField::Name, &info.name)?;
        form.set_patient_field(PatientField::Age, &info.age)?;
        form.set_patient_field(PatientField::Gender, &info.gender)?;
        form.set_patient_field(PatientField::PatientId, &info.patient_id)?;

        for id in &sub.selected_tests {
            let kind: TestKind = id.parse().map_err(|_| FormError::UnknownTest(id.clone()))?;
            form.select_test(kind);
        }

        for (id, values) in &sub.results {
            let kind: TestKind = id.parse().map_err(|_| FormError::UnknownTest(id.clone()))?;
            if !form.is_selected(kind) {
                tracing::debug!(test = %kind, "dropping results for unselected test");
                continue;
            }
            for (parameter, value) in values {
                match form.set_result(kind, parameter, value) {
                    Ok(()) => {}
                    Err(FormError::NotEditable { .. }) => {
                        tracing::debug!(test = %kind, parameter = %parameter, "ignoring value for fixed parameter");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(form)
    }

    /// Best-effort replay for redisplaying a rejected submission: invalid
    /// values (bad gender, unknown test ids or parameters) are skipped and
    /// everything else is kept.
    pub fn recover_submission(default_mode: FormMode, sub: &FormSubmission) -> Self {
        let mut form = Self::new(sub.mode.unwrap_or(default_mode));
        form.edit_mode = sub.edit_mode;

        let info = &sub.patient_info;
        form.patient.name = info.name.clone();
        form.patient.age = info.age.clone();
        form.patient.patient_id = info.patient_id.clone();
        form.patient.gender = info.gender.trim().parse().ok();

        for kind in sub.selected_tests.iter().filter_map(|id| id.parse().ok()) {
            form.select_test(kind);
        }
        for (id, values) in &sub.results {
            let Ok(kind) = id.parse::<TestKind>() else {
                continue;
            };
            if !form.is_selected(kind) {
                continue;
            }
            for (parameter, value) in values {
                let _ = form.set_result(kind, parameter, value);
            }
        }
        form
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn selected_tests(&self) -> &[TestKind] {
        &self.selected
    }

    pub fn is_selected(&self, kind: TestKind) -> bool {
        self.selected.contains(&kind)
    }

    pub fn results_for(&self, kind: TestKind) -> Option<&ResultSet> {
        self.results.get(&kind)
    }

    // ── Input events ────────────────────────────────────────

    /// Set a patient field. Gender must be one of the enumerated labels;
    /// an empty string clears it.
    pub fn set_patient_field(&mut self, field: PatientField, value: &str) -> Result<(), FormError> {
        match field {
            PatientField::Name => self.patient.name = value.to_string(),
            PatientField::Age => self.patient.age = value.to_string(),
            PatientField::PatientId => self.patient.patient_id = value.to_string(),
            PatientField::Gender => {
                self.patient.gender = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.trim().parse::<Gender>()?)
                };
            }
        }
        Ok(())
    }

    /// Fill the patient ID from a millisecond timestamp; returns the new ID.
    pub fn generate_patient_id(&mut self, now_millis: i64) -> &str {
        self.patient.patient_id = crate::patient_id::from_millis(now_millis);
        &self.patient.patient_id
    }

    /// Select a test. In `Single` mode any other selection is dropped
    /// (with its results).
    pub fn select_test(&mut self, kind: TestKind) {
        if self.is_selected(kind) {
            return;
        }
        if self.mode == FormMode::Single {
            for other in std::mem::take(&mut self.selected) {
                self.results.remove(&other);
            }
        }
        self.selected.push(kind);
    }

    /// Deselect a test and discard its results entirely.
    pub fn deselect_test(&mut self, kind: TestKind) {
        self.selected.retain(|k| *k != kind);
        self.results.remove(&kind);
    }

    /// Flip selection; returns whether the test is now selected.
    pub fn toggle_test(&mut self, kind: TestKind) -> bool {
        if self.is_selected(kind) {
            self.deselect_test(kind);
            false
        } else {
            self.select_test(kind);
            true
        }
    }

    /// Store a result value after the test's input sanitizing.
    pub fn set_result(&mut self, kind: TestKind, parameter: &str, raw: &str) -> Result<(), FormError> {
        let param = kind
            .definition()
            .parameter(parameter)
            .ok_or_else(|| FormError::UnknownParameter {
                test: kind,
                parameter: parameter.to_string(),
            })?;
        if !param.is_input {
            return Err(FormError::NotEditable {
                test: kind,
                parameter: parameter.to_string(),
            });
        }
        if !self.is_selected(kind) {
            return Err(FormError::TestNotSelected(kind));
        }
        let value = kind.sanitize_input(parameter, raw);
        self.results.entry(kind).or_default().insert(parameter, value);
        Ok(())
    }

    // ── Completion gate ─────────────────────────────────────

    pub fn is_patient_info_complete(&self) -> bool {
        self.patient.is_complete()
    }

    /// Selected and every input parameter holds a non-blank value.
    pub fn is_test_complete(&self, kind: TestKind) -> bool {
        if !self.is_selected(kind) {
            return false;
        }
        let Some(results) = self.results.get(&kind) else {
            return false;
        };
        kind.definition()
            .input_parameters()
            .all(|p| results.is_filled(&p.name))
    }

    pub fn generation_status(&self) -> Result<(), GenerationBlocked> {
        let missing = self.patient.missing_fields();
        if !missing.is_empty() {
            return Err(GenerationBlocked::PatientInfoIncomplete { missing });
        }
        if self.selected.is_empty() {
            return Err(GenerationBlocked::NoTestSelected);
        }
        if !self.selected.iter().any(|k| self.is_test_complete(*k)) {
            return Err(GenerationBlocked::NoCompleteTest);
        }
        Ok(())
    }

    pub fn can_generate(&self) -> bool {
        self.generation_status().is_ok()
    }

    pub fn completion(&self) -> Completion {
        let (complete_tests, incomplete_tests) = self
            .selected
            .iter()
            .copied()
            .partition::<Vec<TestKind>, _>(|k| self.is_test_complete(*k));
        Completion {
            patient_complete: self.is_patient_info_complete(),
            missing_patient_fields: self.patient.missing_fields(),
            complete_tests,
            incomplete_tests,
            can_generate: self.can_generate(),
        }
    }

    /// Freeze the form into a report payload.
    pub fn assemble(&self, generated_at: NaiveDateTime) -> Result<ReportPayload, FormError> {
        if let Err(blocked) = self.generation_status() {
            tracing::info!(reason = %blocked, "report generation blocked");
            return Err(FormError::Blocked(blocked));
        }
        let tests = self.selected.iter().map(|kind| {
            let results = self.results.get(kind).cloned().unwrap_or_default();
            (*kind, results)
        });
        Ok(report::assemble(self.patient.clone(), tests, generated_at))
    }
}
