// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of [`PassvaultError`] onto HTTP responses.
//!
//! Server-side failures are logged here and reach the client only as a
//! generic message.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use passvault_core::PassvaultError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// Handler error type.
#[derive(Debug)]
pub struct ApiError(pub PassvaultError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<PassvaultError> for ApiError {
    fn from(err: PassvaultError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(PassvaultError::Validation {
            message: rejection.body_text(),
            fields: BTreeMap::new(),
        })
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PassvaultError::Validation { .. } => StatusCode::BAD_REQUEST,
            PassvaultError::Authentication(_) => StatusCode::UNAUTHORIZED,
            PassvaultError::NotFound => StatusCode::NOT_FOUND,
            PassvaultError::Conflict(_) => StatusCode::CONFLICT,
            PassvaultError::Codec(_)
            | PassvaultError::RetrievalFailed
            | PassvaultError::Storage { .. }
            | PassvaultError::Config(_)
            | PassvaultError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        match &self.0 {
            PassvaultError::Validation { message, fields } => ErrorResponse {
                error: message.clone(),
                fields: (!fields.is_empty()).then(|| fields.clone()),
            },
            PassvaultError::Authentication(msg) => ErrorResponse {
                error: msg.clone(),
                fields: None,
            },
            PassvaultError::NotFound => ErrorResponse {
                error: "not found".to_string(),
                fields: None,
            },
            PassvaultError::Conflict(msg) => ErrorResponse {
                error: msg.clone(),
                fields: None,
            },
            // Codec detail stays in the logs.
            PassvaultError::Codec(_) | PassvaultError::RetrievalFailed => ErrorResponse {
                error: PassvaultError::RetrievalFailed.to_string(),
                fields: None,
            },
            PassvaultError::Storage { .. }
            | PassvaultError::Config(_)
            | PassvaultError::Internal(_) => ErrorResponse {
                error: "internal server error".to_string(),
                fields: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = Json(self.body());
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
