//! `GET /api/catalog`: the supported tests and their parameters.

use axum::Json;

use crate::models::TestDefinition;

pub async fn list() -> Json<&'static [TestDefinition]> {
    Json(crate::catalog::all())
}
