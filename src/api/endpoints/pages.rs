//! HTML pages: the lab form and the printable report.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::form::{FormError, LabForm};
use crate::models::{EditRequest, FormMode, FormSubmission, ReportPayload};
use crate::report::{document_title, generate_report_pdf, validate_payload};
use crate::views::{
    render_form_page, render_missing_report, render_report_page, render_report_problem, FormNotice,
};

#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    pub mode: Option<String>,
}

/// Keep filename characters that are safe inside a quoted header value.
fn attachment_name(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') { c } else { '_' })
        .collect()
}

fn missing_report() -> Response {
    (StatusCode::NOT_FOUND, Html(render_missing_report())).into_response()
}

/// `GET /` and `GET /lab-form`: a blank form.
pub async fn lab_form(State(ctx): State<ApiContext>, Query(query): Query<FormQuery>) -> Html<String> {
    let mode = query
        .mode
        .and_then(|m| m.parse::<FormMode>().ok())
        .unwrap_or(ctx.config().form_mode);
    Html(render_form_page(&LabForm::new(mode), &ctx.config().clinic, None))
}

/// `POST /lab-form`: replay the submission, then act on `action`.
pub async fn submit_lab_form(
    State(ctx): State<ApiContext>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let clinic = &ctx.config().clinic;
    let action = fields
        .iter()
        .find(|(key, _)| key == "action")
        .map(|(_, value)| value.as_str())
        .unwrap_or("refresh");
    let submission = FormSubmission::from_fields(&fields);
    let default_mode = ctx.config().form_mode;

    let mut form = match LabForm::from_submission(default_mode, &submission) {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!(error = %e, "rejected form submission");
            let form = LabForm::recover_submission(default_mode, &submission);
            let notice = FormNotice::Error(e.to_string());
            let html = render_form_page(&form, clinic, Some(&notice));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
        }
    };

    match action {
        "patient_id" => {
            let id = form
                .generate_patient_id(chrono::Utc::now().timestamp_millis())
                .to_string();
            let notice = FormNotice::Info(format!("Patient ID generated: {id}"));
            Ok(Html(render_form_page(&form, clinic, Some(&notice))).into_response())
        }
        "report" => match form.assemble(chrono::Local::now().naive_local()) {
            Ok(payload) => {
                let id = ctx.state.store_report(payload)?;
                Ok(Redirect::to(&format!("/print-report/{id}")).into_response())
            }
            Err(FormError::Blocked(reason)) => {
                let notice = FormNotice::Blocked(reason);
                let html = render_form_page(&form, clinic, Some(&notice));
                Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
            }
            Err(e) => Err(e.into()),
        },
        _ => Ok(Html(render_form_page(&form, clinic, None)).into_response()),
    }
}

/// `GET /print-report`: nothing to show without a payload.
pub async fn print_report_empty() -> Response {
    missing_report()
}

/// `GET /print-report/:id`
pub async fn print_report(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some((id, payload)) = ctx.find_report(&id)? else {
        return Ok(missing_report());
    };
    let html = render_report_page(&payload, &ctx.config().clinic, Some(id));
    Ok(Html(html).into_response())
}

/// `POST /print-report`: render a payload carried by the client.
pub async fn print_posted_report(State(ctx): State<ApiContext>, body: Bytes) -> Response {
    if body.iter().all(u8::is_ascii_whitespace) {
        return missing_report();
    }
    let payload: ReportPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "malformed report payload");
            let html = render_report_problem("The report data could not be read.");
            return (StatusCode::BAD_REQUEST, Html(html)).into_response();
        }
    };
    if let Err(e) = validate_payload(&payload) {
        tracing::warn!(error = %e, "report payload rejected");
        let html = render_report_problem(&e.to_string());
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response();
    }
    Html(render_report_page(&payload, &ctx.config().clinic, None)).into_response()
}

/// `GET /print-report/:id/edit`: reopen the form with the report's data.
pub async fn edit_report(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some((_, payload)) = ctx.find_report(&id)? else {
        return Ok(missing_report());
    };
    let form = LabForm::from_edit(ctx.config().form_mode, &EditRequest::from_payload(&payload));
    Ok(Html(render_form_page(&form, &ctx.config().clinic, None)).into_response())
}

/// `GET /print-report/:id/pdf`
pub async fn report_pdf(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some((_, payload)) = ctx.find_report(&id)? else {
        return Ok(missing_report());
    };
    let bytes = generate_report_pdf(&payload, &ctx.config().clinic)?;
    let disposition = format!("attachment; filename=\"{}.pdf\"", attachment_name(&document_title(&payload)));
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::Internal(format!("content disposition: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
