//! Report assembly, boundary validation and export.
//!
//! `assemble` is the only constructor of a fresh `ReportPayload`. Payloads
//! arriving from outside (a client carrying navigation state) go through
//! `validate_payload` before any view touches them.

pub mod pdf;
pub mod validate;

use chrono::NaiveDateTime;

use crate::models::{AssembledTest, PatientInfo, ReportPayload, ResultSet, TestKind};

pub use pdf::{generate_report_pdf, ExportError};
pub use validate::{validate_payload, PayloadError};

/// Pair each selected test with its normalized results.
///
/// Infallible: the caller has already passed the completion gate.
pub fn assemble(
    patient: PatientInfo,
    tests: impl IntoIterator<Item = (TestKind, ResultSet)>,
    generated_at: NaiveDateTime,
) -> ReportPayload {
    let tests: Vec<AssembledTest> = tests
        .into_iter()
        .map(|(kind, results)| AssembledTest {
            test: kind.definition().clone(),
            results: kind.finalize(results),
        })
        .collect();

    tracing::info!(
        tests = tests.len(),
        kinds = ?tests.iter().map(|t| t.kind().as_str()).collect::<Vec<_>>(),
        "report assembled"
    );

    ReportPayload::new(patient, tests, generated_at)
}

/// `Lab_Report_<patientId|Unknown>_<date>_<Single_Test|Multiple_Tests>`
pub fn document_title(payload: &ReportPayload) -> String {
    let id = payload.patient_info().patient_id.trim();
    let id = if id.is_empty() { "Unknown" } else { id };
    let scope = if payload.is_multiple_tests() {
        "Multiple_Tests"
    } else {
        "Single_Test"
    };
    format!(
        "Lab_Report_{id}_{}_{scope}",
        payload.generated_at().format("%Y-%m-%d")
    )
}

/// Report date line, e.g. `March 14, 2026 at 10:05 AM`.
pub fn format_report_date(at: NaiveDateTime) -> String {
    at.format("%B %-d, %Y at %I:%M %p").to_string()
}
