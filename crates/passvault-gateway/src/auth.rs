// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer authentication middleware for the gateway.
//!
//! Resolves `Authorization: Bearer <access token>` to a [`Principal`] and
//! places it in the request extensions. Handlers take the owner from there
//! and never from the payload.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use passvault_core::{AuthAdapter, PassvaultError};

use crate::error::ApiError;
use crate::server::GatewayState;

const MISSING_CREDENTIALS: &str = "authentication credentials were not provided";

/// Pull the token out of an `Authorization: Bearer` header.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Reject the request with 401 unless it carries a valid access token for
/// an active principal.
pub async fn require_auth(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "request without bearer token");
        return Err(PassvaultError::Authentication(MISSING_CREDENTIALS.to_string()).into());
    };

    let principal = state.auth.authenticate(token).await?;
    tracing::debug!(principal_id = %principal.id, "request authenticated");

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer(&headers("Bearer ")), None);
        assert_eq!(extract_bearer(&headers("bearer abc")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
