//! Report JSON endpoints: create from a form submission, fetch, and the
//! edit round trip.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CreatedReport};
use crate::form::LabForm;
use crate::models::{EditRequest, FormSubmission, ReportPayload};

/// `POST /api/reports`: gate, assemble and store.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(submission): Json<FormSubmission>,
) -> Result<(StatusCode, Json<CreatedReport>), ApiError> {
    let form = LabForm::from_submission(ctx.config().form_mode, &submission)?;
    let report = form.assemble(chrono::Local::now().naive_local())?;
    let report_id = ctx.state.store_report(report.clone())?;
    Ok((StatusCode::CREATED, Json(CreatedReport { report_id, report })))
}

/// `GET /api/reports/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<ReportPayload>, ApiError> {
    let (_, report) = ctx
        .find_report(&id)?
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;
    Ok(Json(report.as_ref().clone()))
}

/// `GET /api/reports/:id/edit`
pub async fn edit(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<EditRequest>, ApiError> {
    let (_, report) = ctx
        .find_report(&id)?
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;
    Ok(Json(EditRequest::from_payload(&report)))
}
