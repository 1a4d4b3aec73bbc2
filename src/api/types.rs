//! Shared types for the HTTP layer.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::config::AppConfig;
use crate::models::ReportPayload;
use crate::state::AppState;

/// Handler state: cheap to clone, one per request.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }

    /// Look up a stored report by its path segment.
    ///
    /// A malformed id is reported the same as an unknown one.
    pub fn find_report(&self, raw_id: &str) -> Result<Option<(Uuid, Arc<ReportPayload>)>, ApiError> {
        let Ok(id) = Uuid::parse_str(raw_id) else {
            return Ok(None);
        };
        Ok(self.state.report(&id)?.map(|payload| (id, payload)))
    }
}

/// `POST /api/reports` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReport {
    pub report_id: Uuid,
    pub report: ReportPayload,
}

/// `POST /api/patient-id` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIdResponse {
    pub patient_id: String,
}
