// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Credential routes act on the [`Principal`] placed in the request
//! extensions by [`require_auth`](crate::auth::require_auth). Unknown body
//! fields, including any owner field, are ignored.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use passvault_auth::TokenPair;
use passvault_core::{HealthStatus, PassvaultError, Principal, RecordId};
use passvault_credentials::validation::REQUIRED;
use passvault_credentials::{
    CredentialChanges, CredentialRecord, CredentialRepository, NewCredential,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::server::GatewayState;

/// Marker set on list items whose secret could not be opened.
pub const SECRET_UNAVAILABLE: &str = "unavailable";

/// Request body for creating and updating records.
#[derive(Debug, Default, Deserialize)]
pub struct RecordRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub service_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Write-only.
    #[serde(default)]
    pub raw_password: Option<String>,
}

impl RecordRequest {
    fn into_changes(self) -> CredentialChanges {
        CredentialChanges {
            title: self.title,
            username: self.username,
            service_url: self.service_url,
            notes: self.notes,
            raw_password: self.raw_password.map(SecretString::from),
        }
    }
}

/// A record as returned to its owner.
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: String,
    pub title: String,
    pub username: String,
    pub service_url: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
    pub decrypted_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_error: Option<&'static str>,
}

impl RecordResponse {
    fn new(record: CredentialRecord, secret: Option<SecretString>) -> Self {
        let secret_error = secret.is_none().then_some(SECRET_UNAVAILABLE);
        Self {
            id: record.id.0,
            title: record.title,
            username: record.username,
            service_url: record.service_url,
            notes: record.notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
            decrypted_password: secret.map(|s| s.expose_secret().to_string()),
            secret_error,
        }
    }

    /// Single-record form: a secret that cannot be opened fails the request.
    fn revealed(
        repo: &CredentialRepository,
        record: CredentialRecord,
    ) -> Result<Self, PassvaultError> {
        let secret = repo.reveal(&record)?;
        Ok(Self::new(record, Some(secret)))
    }

    /// List form: a secret that cannot be opened only marks this item.
    fn listed(repo: &CredentialRepository, record: CredentialRecord) -> Self {
        let secret = repo.reveal(&record).ok();
        Self::new(record, secret)
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Collects "This field is required." for each absent field.
#[derive(Default)]
struct Required(BTreeMap<String, String>);

impl Required {
    fn check<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() {
            self.0.insert(field.to_string(), REQUIRED.to_string());
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge in problems found in the fields that were supplied.
    fn into_error(mut self, others: Result<CredentialChanges, PassvaultError>) -> PassvaultError {
        if let Err(PassvaultError::Validation { fields, .. }) = others {
            for (field, detail) in fields {
                self.0.entry(field).or_insert(detail);
            }
        }
        PassvaultError::invalid_fields(self.0)
    }
}

/// GET /api/passwords
pub async fn list_passwords(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<RecordResponse>>> {
    let records = state.credentials.list(&principal).await?;
    let items = records
        .into_iter()
        .map(|record| RecordResponse::listed(&state.credentials, record))
        .collect();
    Ok(Json(items))
}

/// POST /api/passwords
pub async fn create_password(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<RecordRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let Json(body) = payload?;

    let mut required = Required::default();
    required.check("title", &body.title);
    required.check("raw_password", &body.raw_password);
    if !required.is_empty() {
        return Err(required.into_error(body.into_changes().validated()).into());
    }

    let changes = body.into_changes();
    let new = NewCredential {
        title: changes.title.unwrap_or_default(),
        username: changes.username,
        service_url: changes.service_url,
        notes: changes.notes,
        raw_password: changes
            .raw_password
            .unwrap_or_else(|| SecretString::from(String::new())),
    };
    let record = state.credentials.create(&principal, new).await?;
    let response = RecordResponse::revealed(&state.credentials, record)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/passwords/{id}
pub async fn get_password(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state.credentials.get(&principal, &RecordId(id)).await?;
    Ok(Json(RecordResponse::revealed(&state.credentials, record)?))
}

/// PUT /api/passwords/{id}
///
/// Title is required; other absent fields keep their values.
pub async fn replace_password(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<RecordRequest>, JsonRejection>,
) -> ApiResult<Json<RecordResponse>> {
    let Json(body) = payload?;
    let changes = body.into_changes().validated_full()?;
    update(&state, &principal, RecordId(id), changes).await
}

/// PATCH /api/passwords/{id}
pub async fn patch_password(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<RecordRequest>, JsonRejection>,
) -> ApiResult<Json<RecordResponse>> {
    let Json(body) = payload?;
    update(&state, &principal, RecordId(id), body.into_changes()).await
}

async fn update(
    state: &GatewayState,
    principal: &Principal,
    id: RecordId,
    changes: CredentialChanges,
) -> ApiResult<Json<RecordResponse>> {
    let record = state.credentials.update(principal, &id, changes).await?;
    Ok(Json(RecordResponse::revealed(&state.credentials, record)?))
}

/// DELETE /api/passwords/{id}
pub async fn delete_password(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.credentials.delete(&principal, &RecordId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/token
pub async fn obtain_token(
    State(state): State<GatewayState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<Json<TokenPair>> {
    let Json(body) = payload?;

    let mut required = Required::default();
    required.check("email", &body.email);
    required.check("password", &body.password);
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(PassvaultError::invalid_fields(required.0).into());
    };

    let pair = state
        .auth
        .obtain_tokens(&email, &SecretString::from(password))
        .await?;
    Ok(Json(pair))
}

/// POST /api/token/refresh
pub async fn refresh_token(
    State(state): State<GatewayState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<AccessResponse>> {
    let Json(body) = payload?;
    let Some(refresh) = body.refresh else {
        return Err(PassvaultError::invalid_field("refresh", REQUIRED).into());
    };

    let access = state.auth.refresh(&refresh).await?;
    Ok(Json(AccessResponse { access }))
}

/// GET /health
///
/// Unauthenticated; reports storage reachability.
pub async fn get_health(State(state): State<GatewayState>) -> (StatusCode, Json<HealthResponse>) {
    let version = env!("CARGO_PKG_VERSION");
    match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                version,
            }),
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            tracing::warn!(%reason, "storage degraded");
            (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "degraded",
                    version,
                }),
            )
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            tracing::warn!(%reason, "storage unhealthy");
            unavailable(version)
        }
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            unavailable(version)
        }
    }
}

fn unavailable(version: &'static str) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse {
            status: "unavailable",
            version,
        }),
    )
}
