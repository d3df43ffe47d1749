//! Bearer token authentication and patient-level authorization
//!
//! Keys come from `[[server.api_keys]]`. Incoming tokens are hashed and
//! looked up by SHA-256 digest; the plain keys are not kept after startup.

use super::error::ApiError;
use crate::config::{ApiKeyConfig, ApiKeyRole};
use crate::domain::{ExportError, PatientId, Result, TenantId};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub tenant_id: TenantId,
    pub role: ApiKeyRole,
    /// Set only for patient-role keys
    pub patient_id: Option<PatientId>,
}

impl Principal {
    /// Check that the caller may read `patient_id`
    ///
    /// `owner` is the tenant the patient belongs to, when known. Patient keys
    /// are limited to their own record; every key is limited to its tenant.
    pub fn authorize(
        &self,
        patient_id: &PatientId,
        owner: Option<&TenantId>,
    ) -> std::result::Result<(), ApiError> {
        if self.role == ApiKeyRole::Patient && self.patient_id.as_ref() != Some(patient_id) {
            tracing::warn!(
                tenant_id = %self.tenant_id,
                "Patient key used for another patient"
            );
            return Err(ApiError::Forbidden);
        }

        if let Some(owner) = owner {
            if owner != &self.tenant_id {
                tracing::warn!(
                    tenant_id = %self.tenant_id,
                    "Cross-tenant export attempt"
                );
                return Err(ApiError::Forbidden);
            }
        }

        Ok(())
    }
}

/// Accepted API keys indexed by digest
#[derive(Debug, Default)]
pub struct ApiKeyStore {
    keys: HashMap<[u8; 32], Principal>,
}

impl ApiKeyStore {
    /// Build the store from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a tenant or patient ID is invalid.
    pub fn from_config(keys: &[ApiKeyConfig]) -> Result<Self> {
        let mut store = HashMap::with_capacity(keys.len());

        for key in keys {
            let tenant_id = TenantId::new(key.tenant_id.clone()).map_err(ExportError::Configuration)?;
            let patient_id = key
                .patient_id
                .clone()
                .map(PatientId::new)
                .transpose()
                .map_err(ExportError::Configuration)?;

            store.insert(
                key.key.expose_secret().sha256(),
                Principal {
                    tenant_id,
                    role: key.role,
                    patient_id,
                },
            );
        }

        Ok(Self { keys: store })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolve the caller from the `Authorization` header
    pub fn authenticate(&self, headers: &HeaderMap) -> std::result::Result<Principal, ApiError> {
        let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
        let digest: [u8; 32] = Sha256::digest(token.as_bytes()).into();

        self.keys.get(&digest).cloned().ok_or_else(|| {
            tracing::warn!("Rejected unknown API key");
            ApiError::Unauthorized
        })
    }
}

/// Extracts the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively; an empty token is treated as
/// missing.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware requiring a known API key
///
/// On success the [`Principal`] is inserted into request extensions.
pub async fn require_api_key(
    State(keys): State<Arc<ApiKeyStore>>,
    mut req: Request,
    next: Next,
) -> Response {
    match keys.authenticate(req.headers()) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
