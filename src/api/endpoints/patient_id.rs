//! `POST /api/patient-id`: a fresh timestamp-derived patient ID.

use axum::Json;

use crate::api::types::PatientIdResponse;

pub async fn generate() -> Json<PatientIdResponse> {
    Json(PatientIdResponse {
        patient_id: crate::patient_id::generate(),
    })
}
