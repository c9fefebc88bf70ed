// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HS256 access and refresh tokens.
//!
//! Both kinds are signed with the same secret and told apart by the
//! `token_type` claim, so a refresh token never passes as an access token.

use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use passvault_config::model::AuthConfig;
use passvault_core::{PassvaultError, Principal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum HMAC secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Generic rejection for any token that fails validation.
pub(crate) const INVALID_TOKEN: &str = "token is invalid or expired";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id.
    pub sub: String,
    pub handle: String,
    pub token_type: TokenType,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

/// An access/refresh pair returned by the token endpoint.
#[derive(Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Signs and validates tokens with one process-wide HMAC secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(
        secret: &[u8],
        access_ttl_secs: u64,
        refresh_ttl_secs: u64,
    ) -> Result<Self, PassvaultError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(PassvaultError::Config(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes (got {})",
                secret.len()
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }

    /// Build from the `[auth]` section. A missing secret is fatal.
    pub fn from_config(config: &AuthConfig) -> Result<Self, PassvaultError> {
        let secret = config.jwt_secret.as_deref().ok_or_else(|| {
            PassvaultError::Config(
                "auth.jwt_secret is not set (use PASSVAULT_AUTH_JWT_SECRET)".to_string(),
            )
        })?;
        Self::new(
            secret.as_bytes(),
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        )
    }

    pub fn issue_pair(&self, principal: &Principal) -> Result<TokenPair, PassvaultError> {
        Ok(TokenPair {
            access: self.issue(principal, TokenType::Access)?,
            refresh: self.issue(principal, TokenType::Refresh)?,
        })
    }

    pub fn issue(
        &self,
        principal: &Principal,
        token_type: TokenType,
    ) -> Result<String, PassvaultError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl_secs,
            TokenType::Refresh => self.refresh_ttl_secs,
        };
        let iat = get_current_timestamp();
        let claims = Claims {
            sub: principal.id.to_string(),
            handle: principal.handle.clone(),
            token_type,
            iat,
            exp: iat.saturating_add(ttl),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, PassvaultError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| PassvaultError::Internal(format!("failed to sign token: {e}")))
    }

    /// Check signature, expiry and token type.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, PassvaultError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature {
                debug!("token expired");
            } else {
                debug!(error = %e, "token rejected");
            }
            PassvaultError::Authentication(INVALID_TOKEN.to_string())
        })?;

        if data.claims.token_type != expected {
            debug!(
                expected = ?expected,
                actual = ?data.claims.token_type,
                "token type mismatch"
            );
            return Err(PassvaultError::Authentication(INVALID_TOKEN.to_string()));
        }
        Ok(data.claims)
    }
}
