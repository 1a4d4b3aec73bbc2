//! Domain types shared by the form, the assembler and the report views.

pub mod enums;
pub mod patient;
pub mod report;
pub mod results;
pub mod submission;
pub mod test_definition;

pub use enums::{AboGroup, CrpBand, FormMode, Gender, PatientField, RhFactor, TestKind};
pub use patient::PatientInfo;
pub use report::{AssembledTest, EditRequest, ReportPayload};
pub use results::ResultSet;
pub use submission::{FormSubmission, PatientInput};
pub use test_definition::{Parameter, TestDefinition};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid {field} value: {value:?}")]
    InvalidEnum { field: &'static str, value: String },
}
