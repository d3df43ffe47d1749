//! HTTP status mapping for the export endpoint

mod common;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::Router;
use ccda_export::adapters::database::InMemorySource;
use ccda_export::config::{secret_string, ApiKeyConfig, ApiKeyRole, DocumentConfig};
use ccda_export::core::export::ExportCoordinator;
use ccda_export::server::{build_router, ApiKeyStore, AppState};
use std::sync::Arc;
use tower::ServiceExt;

const CLINICIAN_KEY: &str = "riverside-clinician-0001";
const OTHER_TENANT_KEY: &str = "lakeside-clinician-0001";
const PATIENT_KEY: &str = "riverside-patient-key-01";
const OTHER_PATIENT: &str = "0b5a6b1e-52c4-4c55-9d0e-1f1c1ad0e7a2";

fn key(key: &str, tenant: &str, role: ApiKeyRole, patient: Option<&str>) -> ApiKeyConfig {
    ApiKeyConfig {
        key: secret_string(key.to_string()),
        tenant_id: tenant.to_string(),
        role,
        patient_id: patient.map(String::from),
    }
}

fn app_with(source: InMemorySource) -> Router {
    let keys = ApiKeyStore::from_config(&[
        key(CLINICIAN_KEY, common::TENANT, ApiKeyRole::Clinician, None),
        key(OTHER_TENANT_KEY, "lakeside", ApiKeyRole::Clinician, None),
        key(PATIENT_KEY, common::TENANT, ApiKeyRole::Patient, Some(common::PATIENT)),
    ])
    .unwrap();

    build_router(
        AppState {
            coordinator: ExportCoordinator::new(Arc::new(source), DocumentConfig::default()),
            keys: Arc::new(keys),
        },
        &["https://portal.example.org".to_string()],
    )
}

fn app() -> Router {
    let mut source = InMemorySource::with_record(common::full_record());
    source.insert(ccda_export::domain::PatientRecord::new(common::profile(
        OTHER_PATIENT,
        common::TENANT,
    )));
    app_with(source)
}

fn export(token: Option<&str>, patient: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/ccda-export")
        .header(CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {t}"));
    }
    builder
        .body(Body::from(format!(r#"{{"patient_id":"{patient}"}}"#)))
        .unwrap()
}

async fn json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn missing_token_is_401() {
    let response = app().oneshot(export(None, common::PATIENT)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_token_is_401() {
    let response = app()
        .oneshot(export(Some("not-a-configured-key"), common::PATIENT))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cross_tenant_request_is_403() {
    let response = app()
        .oneshot(export(Some(OTHER_TENANT_KEY), common::PATIENT))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn patient_key_for_other_patient_is_403() {
    let response = app()
        .oneshot(export(Some(PATIENT_KEY), OTHER_PATIENT))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn patient_key_for_own_record_is_200() {
    let response = app()
        .oneshot(export(Some(PATIENT_KEY), common::PATIENT))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn clinician_export_returns_document() {
    let response = app()
        .oneshot(export(Some(CLINICIAN_KEY), common::PATIENT))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    let xml = body["xml"].as_str().unwrap();
    assert!(xml.contains("Metformin 500 MG Oral Tablet"));
    assert!(xml.contains("Penicillin"));
}

#[tokio::test]
async fn fetch_failure_is_generic_500() {
    let source = InMemorySource::with_record(common::full_record()).fail_on("vital_signs");
    let response = app_with(source)
        .oneshot(export(Some(CLINICIAN_KEY), common::PATIENT))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json(response).await;
    assert_eq!(body["error"], "Failed to generate C-CDA document");
    assert!(!body.to_string().contains("vital_signs"));
}

#[tokio::test]
async fn unknown_patient_is_500() {
    let response = app()
        .oneshot(export(Some(CLINICIAN_KEY), "no-such-patient"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unreadable_bodies_are_json_400() {
    let cases = [
        (Some("application/json"), "not json"),
        (Some("application/json"), "{}"),
        (Some("application/json"), r#"{"patient_id": 42}"#),
        (None, r#"{"patient_id":"7d44b88c-4199-4bad-97dc-d78268e01398"}"#),
    ];

    for (content_type, body) in cases {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/ccda-export")
            .header(AUTHORIZATION, format!("Bearer {CLINICIAN_KEY}"));
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        let response = app()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = json(response).await;
        assert!(json["error"].is_string(), "body: {body}");
    }
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/ccda-export")
        .header("Origin", "https://portal.example.org")
        .header("Access-Control-Request-Method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://portal.example.org"
    );
}
