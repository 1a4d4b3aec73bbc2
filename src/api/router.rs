//! Application router.
//!
//! HTML pages at the root, JSON endpoints under `/api/`. Every response
//! touching a report carries `Cache-Control: no-store`.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::state::AppState;

/// Build the full router for a shared `AppState`.
pub fn app_router(state: Arc<AppState>) -> Router {
    build_router(ApiContext::new(state))
}

fn no_store() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))
}

fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/catalog", get(endpoints::catalog::list))
        .route("/patient-id", post(endpoints::patient_id::generate))
        .route("/form/status", post(endpoints::form::status))
        .with_state(ctx.clone());

    let api_reports = Router::new()
        .route("/reports", post(endpoints::reports::create))
        .route("/reports/:id", get(endpoints::reports::detail))
        .route("/reports/:id/edit", get(endpoints::reports::edit))
        .with_state(ctx.clone())
        .layer(no_store());

    let forms = Router::new()
        .route("/", get(endpoints::pages::lab_form))
        .route(
            "/lab-form",
            get(endpoints::pages::lab_form).post(endpoints::pages::submit_lab_form),
        )
        .with_state(ctx.clone())
        .layer(no_store());

    let print = Router::new()
        .route(
            "/print-report",
            get(endpoints::pages::print_report_empty).post(endpoints::pages::print_posted_report),
        )
        .route("/print-report/:id", get(endpoints::pages::print_report))
        .route("/print-report/:id/edit", get(endpoints::pages::edit_report))
        .route("/print-report/:id/pdf", get(endpoints::pages::report_pdf))
        .with_state(ctx)
        .layer(no_store());

    Router::new()
        .nest("/api", api.merge(api_reports))
        .merge(forms)
        .merge(print)
        .layer(axum::middleware::from_fn(middleware::logging::log_requests))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::catalog::params;
    use crate::config::AppConfig;

    fn test_app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(AppConfig::default()));
        (app_router(state.clone()), state)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/lab-form")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn complete_submission() -> serde_json::Value {
        serde_json::json!({
            "patientInfo": {"name": "Jane Doe", "age": "30", "gender": "Female"},
            "selectedTests": ["widal_test", "crp_test"],
            "results": {
                "widal_test": {"S. Typhi - TO": "160", "S. Typhi - TH": "80"},
                "crp_test": {}
            }
        })
    }

    const COMPLETE_FORM: &str = "name=Jane+Doe&age=30&gender=Female&patient_id=&mode=multiple\
        &test=blood_grouping\
        &blood_grouping%3A%3ABlood+Grouping+%28ABO%29=O\
        &blood_grouping%3A%3ARh-+Factor+%28Anti-D%29=Positive";

    #[tokio::test]
    async fn health_returns_ok() {
        let (app, _) = test_app();
        let response = app.oneshot(get_req("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn catalog_lists_three_tests() {
        let (app, _) = test_app();
        let response = app.oneshot(get_req("/api/catalog")).await.unwrap();
        let json = body_json(response).await;
        let ids: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["widal_test", "blood_grouping", "crp_test"]);
    }

    #[tokio::test]
    async fn patient_id_has_prefix() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::builder().method("POST").uri("/api/patient-id").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        let id = json["patientId"].as_str().unwrap();
        assert!(id.starts_with("PAT"));
        assert_eq!(id.len(), 9);
    }

    #[tokio::test]
    async fn form_status_reports_gate() {
        let (app, _) = test_app();
        let response = app
            .oneshot(json_request("POST", "/api/form/status", complete_submission()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["patientComplete"], true);
        assert_eq!(json["completeTests"], serde_json::json!(["widal_test"]));
        assert_eq!(json["incompleteTests"], serde_json::json!(["crp_test"]));
        assert_eq!(json["canGenerate"], true);
    }

    #[tokio::test]
    async fn create_report_then_fetch_and_edit() {
        let (app, _) = test_app();
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/reports", complete_submission()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
        let created = body_json(response).await;
        let id = created["reportId"].as_str().unwrap().to_string();
        assert_eq!(created["report"]["isMultipleTests"], true);
        assert_eq!(
            created["report"]["tests"][0]["results"][params::TYPHI_TO],
            "1:160"
        );

        let response = app.clone().oneshot(get_req(&format!("/api/reports/{id}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, created["report"]);

        let response = app.oneshot(get_req(&format!("/api/reports/{id}/edit"))).await.unwrap();
        let edit = body_json(response).await;
        assert_eq!(edit["editMode"], true);
        assert_eq!(edit["patientInfo"]["name"], "Jane Doe");
        assert_eq!(edit["selectedTests"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blocked_report_returns_422() {
        let (app, state) = test_app();
        let mut submission = complete_submission();
        submission["patientInfo"]["age"] = serde_json::json!("  ");
        let response = app
            .oneshot(json_request("POST", "/api/reports", submission))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "GENERATION_BLOCKED");
        assert!(state.read_reports().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_test_id_returns_422() {
        let (app, _) = test_app();
        let mut submission = complete_submission();
        submission["selectedTests"] = serde_json::json!(["lipid_profile"]);
        let response = app
            .oneshot(json_request("POST", "/api/form/status", submission))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_FORM");
    }

    #[tokio::test]
    async fn unknown_report_returns_404() {
        let (app, _) = test_app();
        let response = app
            .clone()
            .oneshot(get_req(&format!("/api/reports/{}", uuid::Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get_req("/api/reports/not-a-uuid")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_form_page_renders() {
        let (app, _) = test_app();
        let response = app.clone().oneshot(get_req("/lab-form")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Patient Information"));
        assert!(html.contains(r#"type="checkbox" name="test""#));

        let response = app.oneshot(get_req("/?mode=single")).await.unwrap();
        let html = body_string(response).await;
        assert!(html.contains(r#"type="radio" name="test""#));
    }

    #[tokio::test]
    async fn form_post_generates_patient_id() {
        let (app, _) = test_app();
        let response = app
            .oneshot(form_request("name=Jane&age=30&gender=Female&action=patient_id"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Patient ID generated: PAT"));
        assert!(html.contains(r#"name="name" value="Jane""#));
    }

    #[tokio::test]
    async fn form_post_report_redirects_to_print_view() {
        let (app, state) = test_app();
        let response = app
            .clone()
            .oneshot(form_request(&format!("{COMPLETE_FORM}&action=report")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.starts_with("/print-report/"));
        assert_eq!(state.read_reports().unwrap().len(), 1);

        let response = app.clone().oneshot(get_req(&location)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
        let html = body_string(response).await;
        assert!(html.contains("BLOOD GROUPING"));
        assert!(html.contains("<td>O+</td>"));
        assert!(html.contains("<td>N/A</td>"));

        let response = app.clone().oneshot(get_req(&format!("{location}/edit"))).await.unwrap();
        let html = body_string(response).await;
        assert!(html.contains("Edit Mode Active"));
        assert!(html.contains(r#"<option value="O" selected>"#));

        let response = app.oneshot(get_req(&format!("{location}/pdf"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Lab_Report_Unknown_"));
        assert!(disposition.ends_with("_Single_Test.pdf\""));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[tokio::test]
    async fn blocked_form_post_redisplays_with_reason() {
        let (app, state) = test_app();
        let response = app
            .oneshot(form_request("name=Jane&age=30&gender=Female&test=crp_test&action=report"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_string(response).await;
        assert!(html.contains("Cannot generate report: no selected test has all results entered"));
        assert!(state.read_reports().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_gender_redisplays_form() {
        let (app, _) = test_app();
        let response = app
            .oneshot(form_request("name=Jane&age=30&gender=Unknown&action=refresh"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_string(response).await;
        assert!(html.contains(r#"<div class="notice notice-error">"#));
        assert!(html.contains(r#"name="name" value="Jane""#));
        assert!(html.contains(r#"name="age" value="30""#));
    }

    #[tokio::test]
    async fn unknown_test_redisplay_keeps_entries() {
        let (app, _) = test_app();
        let response = app
            .oneshot(form_request(
                "name=Jane&age=30&gender=Female&mode=multiple&test=lipid_profile&test=crp_test\
                 &crp_test%3A%3ACRP+%28C-Reactive+Protein%29=%3C6+mg%2Fdl&action=refresh",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_string(response).await;
        assert!(html.contains("lipid_profile"));
        assert!(html.contains(r#"name="name" value="Jane""#));
        assert!(html.contains("CRP: complete"));
    }

    #[tokio::test]
    async fn print_view_without_payload_shows_recovery_page() {
        let (app, _) = test_app();
        let response = app.clone().oneshot(get_req("/print-report")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("No Report Data Found"));

        let response = app
            .clone()
            .oneshot(get_req(&format!("/print-report/{}", uuid::Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("Go to Lab Form"));

        let response = app
            .oneshot(Request::builder().method("POST").uri("/print-report").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn posted_payload_is_validated_and_rendered() {
        let (app, _) = test_app();
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/reports", complete_submission()))
            .await
            .unwrap();
        let report = body_json(response).await["report"].clone();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/print-report", report.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("WIDAL TEST"));
        assert!(html.contains(r#"<h2 class="test-title">CRP</h2>"#));

        let mut tampered = report.clone();
        tampered["isMultipleTests"] = serde_json::json!(false);
        let response = app
            .clone()
            .oneshot(json_request("POST", "/print-report", tampered))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let mut garbled = report.clone();
        if let Some(tests) = garbled["tests"].as_array_mut() {
            for item in tests.iter_mut().filter(|t| t["test"]["id"] == "widal_test") {
                item["results"]["S. Typhi - TO"] = serde_json::json!("1:abc");
            }
        }
        let response = app
            .clone()
            .oneshot(json_request("POST", "/print-report", garbled))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_string(response).await.contains("is not a titer"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/print-report")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (app, _) = test_app();
        let response = app.oneshot(get_req("/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
