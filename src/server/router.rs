//! HTTP router
//!
//! - `POST /ccda-export` (bearer key required) returns `{ "xml": "..." }`
//! - `GET /health` (open) returns `{ "status": "ok" }`

use super::auth::{require_api_key, ApiKeyStore, Principal};
use super::error::ApiError;
use crate::core::export::{ExportCoordinator, ExportRequest};
use crate::domain::PatientId;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: ExportCoordinator,
    pub keys: Arc<ApiKeyStore>,
}

#[derive(Debug, Deserialize)]
pub struct ExportBody {
    pub patient_id: String,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub xml: String,
}

/// Build the application router
///
/// `allowed_origins` feeds the CORS layer; `"*"` allows any origin and an
/// empty list disables cross-origin access.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/ccda-export", post(export_ccda))
        .route_layer(axum::middleware::from_fn_with_state(
            state.keys.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn export_ccda(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<ExportBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(status = %rejection.status(), "Rejected export request body");
        ApiError::BadRequest(
            "Request body must be JSON of the form {\"patient_id\": \"...\"}".to_string(),
        )
    })?;
    let patient_id = PatientId::new(body.patient_id).map_err(ApiError::BadRequest)?;

    principal.authorize(&patient_id, None)?;
    let owner = state
        .coordinator
        .source()
        .patient_tenant(&patient_id)
        .await?;
    principal.authorize(&patient_id, owner.as_ref())?;

    let outcome = state
        .coordinator
        .export(&ExportRequest {
            patient_id,
            tenant_id: principal.tenant_id,
        })
        .await?;

    let mut response = Json(ExportResponse { xml: outcome.xml }).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::InMemorySource;
    use crate::config::{secret_string, ApiKeyConfig, ApiKeyRole, DocumentConfig};
    use crate::domain::{PatientProfile, PatientRecord, TenantId};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const KEY: &str = "clinician-key-0001";

    fn app() -> Router {
        let record = PatientRecord::new(PatientProfile::new(
            PatientId::new("p-1").unwrap(),
            TenantId::new("t-1").unwrap(),
            "Ada",
            "Lovelace",
        ));
        let keys = ApiKeyStore::from_config(&[ApiKeyConfig {
            key: secret_string(KEY.to_string()),
            tenant_id: "t-1".into(),
            role: ApiKeyRole::Clinician,
            patient_id: None,
        }])
        .unwrap();

        build_router(
            AppState {
                coordinator: ExportCoordinator::new(
                    Arc::new(InMemorySource::with_record(record)),
                    DocumentConfig::default(),
                ),
                keys: Arc::new(keys),
            },
            &[],
        )
    }

    fn export_request(token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/ccda-export")
            .header(CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {t}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn health_is_open() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn export_requires_auth_before_body_parsing() {
        let response = app()
            .oneshot(export_request(None, "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn export_returns_xml() {
        let response = app()
            .oneshot(export_request(Some(KEY), r#"{"patient_id":"p-1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "no-store");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["xml"].as_str().unwrap().contains("<ClinicalDocument"));
    }

    #[tokio::test]
    async fn invalid_patient_id_is_bad_request() {
        let response = app()
            .oneshot(export_request(Some(KEY), r#"{"patient_id":"   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_json_bad_request() {
        let response = app()
            .oneshot(export_request(Some(KEY), "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("patient_id"));
    }
}
