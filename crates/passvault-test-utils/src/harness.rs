// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete gateway stack on a temp SQLite
//! database. Requests go through the real router, middleware included,
//! without binding a socket.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use passvault_auth::{NewPrincipal, PrincipalDirectory, TokenIssuer, TokenPair};
use passvault_config::model::StorageConfig;
use passvault_core::{PassvaultError, Principal, RecordId, StorageAdapter};
use passvault_gateway::{build_router, GatewayState};
use passvault_storage::SqliteStorage;
use passvault_vault::ProcessKey;
use secrecy::SecretString;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// JWT secret used by every harness.
pub const TEST_JWT_SECRET: &str = "passvault-test-harness-jwt-secret-0123456789";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    key: Option<ProcessKey>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            access_ttl_secs: 300,
            refresh_ttl_secs: 86_400,
            key: None,
        }
    }

    /// Set the access token lifetime.
    pub fn with_access_ttl(mut self, secs: u64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    /// Use a specific process key instead of a random one.
    pub fn with_key(mut self, key: ProcessKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Build the harness: temp database with migrations applied, key,
    /// issuer, and router.
    pub async fn build(self) -> Result<TestHarness, PassvaultError> {
        let dir = tempfile::tempdir()
            .map_err(|e| PassvaultError::Internal(format!("failed to create temp dir: {e}")))?;
        let db_path = dir.path().join("passvault-test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        let key = match self.key {
            Some(key) => key,
            None => ProcessKey::generate()?,
        };
        let issuer = TokenIssuer::new(
            TEST_JWT_SECRET.as_bytes(),
            self.access_ttl_secs,
            self.refresh_ttl_secs,
        )?;
        let state = GatewayState::new(storage.clone(), Arc::new(key), issuer)?;

        Ok(TestHarness {
            router: build_router(state.clone()),
            directory: PrincipalDirectory::new(storage.clone()),
            state,
            storage,
            db_path,
            _temp_dir: dir,
        })
    }
}

/// Status and decoded JSON body of one request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// `Value::Null` when the body is empty.
    pub json: Value,
}

/// Complete gateway stack for end-to-end tests.
pub struct TestHarness {
    pub router: Router,
    pub state: GatewayState,
    pub storage: Arc<SqliteStorage>,
    pub directory: PrincipalDirectory,
    db_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default settings.
    pub async fn new() -> Result<Self, PassvaultError> {
        Self::builder().build().await
    }

    /// Provision an active principal `<handle>@example.com`.
    pub async fn create_principal(
        &self,
        handle: &str,
        password: &str,
    ) -> Result<Principal, PassvaultError> {
        self.directory
            .create(NewPrincipal {
                email: format!("{handle}@example.com"),
                handle: handle.to_string(),
                password: SecretString::from(password.to_string()),
                is_staff: false,
                is_superuser: false,
            })
            .await
    }

    /// Log in as `<handle>@example.com`.
    pub async fn login(&self, handle: &str, password: &str) -> Result<TokenPair, PassvaultError> {
        self.state
            .auth
            .obtain_tokens(
                &format!("{handle}@example.com"),
                &SecretString::from(password.to_string()),
            )
            .await
    }

    /// Provision a principal and return its access token.
    pub async fn principal_with_token(
        &self,
        handle: &str,
    ) -> Result<(Principal, String), PassvaultError> {
        let password = format!("{handle}-password");
        let principal = self.create_principal(handle, &password).await?;
        let pair = self.login(handle, &password).await?;
        Ok((principal, pair.access))
    }

    /// Send one request through the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse, PassvaultError> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .map_err(|e| PassvaultError::Internal(format!("bad test request: {e}")))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| PassvaultError::Internal(format!("failed to read body: {e}")))?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| PassvaultError::Internal(format!("response is not JSON: {e}")))?
        };
        Ok(TestResponse { status, json })
    }

    /// Read a record's stored envelope straight from the database file.
    pub fn stored_envelope(&self, id: &RecordId) -> Result<String, PassvaultError> {
        let conn = rusqlite::Connection::open(&self.db_path).map_err(PassvaultError::storage)?;
        conn.query_row(
            "SELECT envelope FROM credential_records WHERE id = ?1",
            [id.as_str()],
            |row| row.get(0),
        )
        .map_err(PassvaultError::storage)
    }

    /// Overwrite a record's stored envelope, bypassing the codec.
    pub fn overwrite_envelope(&self, id: &RecordId, envelope: &str) -> Result<(), PassvaultError> {
        let conn = rusqlite::Connection::open(&self.db_path).map_err(PassvaultError::storage)?;
        conn.execute(
            "UPDATE credential_records SET envelope = ?1 WHERE id = ?2",
            [envelope, id.as_str()],
        )
        .map_err(PassvaultError::storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_and_serves_health() {
        let harness = TestHarness::new().await.unwrap();
        let response = harness
            .request(Method::GET, "/health", None, None)
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json["status"], "ok");
    }

    #[tokio::test]
    async fn principal_with_token_authenticates() {
        let harness = TestHarness::new().await.unwrap();
        let (_, token) = harness.principal_with_token("ana").await.unwrap();
        let response = harness
            .request(Method::GET, "/api/passwords", Some(&token), None)
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json, serde_json::json!([]));
    }
}
