//! `POST /api/form/status`: completion gate for a submitted form.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::form::{Completion, LabForm};
use crate::models::FormSubmission;

pub async fn status(
    State(ctx): State<ApiContext>,
    Json(submission): Json<FormSubmission>,
) -> Result<Json<Completion>, ApiError> {
    let form = LabForm::from_submission(ctx.config().form_mode, &submission)?;
    Ok(Json(form.completion()))
}
