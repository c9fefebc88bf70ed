// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login, refresh, and bearer authentication against stored principals.

use std::sync::Arc;

use async_trait::async_trait;
use passvault_core::{
    AuthAdapter, HealthStatus, PassvaultError, PluginAdapter, Principal, PrincipalId,
    StorageAdapter,
};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::password::{hash_password, verify_off_runtime};
use crate::principal::normalize_email;
use crate::tokens::{TokenIssuer, TokenPair, TokenType, INVALID_TOKEN};

/// Login failure message. Unknown email, wrong password and inactive
/// principal all read the same.
pub const BAD_CREDENTIALS: &str = "no active account found with the given credentials";

/// JWT-backed [`AuthAdapter`].
///
/// Every successful validation reloads the principal, so deactivation takes
/// effect on tokens that are already out.
pub struct JwtAuthenticator {
    storage: Arc<dyn StorageAdapter>,
    issuer: TokenIssuer,
    /// Verified against when the email is unknown, so both paths cost one
    /// Argon2id verification.
    decoy_hash: String,
}

impl JwtAuthenticator {
    pub fn new(storage: Arc<dyn StorageAdapter>, issuer: TokenIssuer) -> Result<Self, PassvaultError> {
        let decoy_hash = hash_password(&SecretString::from("passvault-decoy".to_string()))?;
        Ok(Self {
            storage,
            issuer,
            decoy_hash,
        })
    }

    /// Exchange email and password for an access/refresh pair.
    pub async fn obtain_tokens(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<TokenPair, PassvaultError> {
        let email = normalize_email(email);
        let Some(found) = self.storage.find_principal_by_email(&email).await? else {
            let _ = verify_off_runtime(password, &self.decoy_hash).await?;
            debug!("login for unknown email");
            return Err(bad_credentials());
        };

        if !verify_off_runtime(password, &found.password_hash).await? {
            debug!(principal_id = %found.principal.id, "login with wrong password");
            return Err(bad_credentials());
        }
        if !found.principal.is_active {
            debug!(principal_id = %found.principal.id, "login for inactive principal");
            return Err(bad_credentials());
        }

        info!(principal_id = %found.principal.id, "tokens issued");
        self.issuer.issue_pair(&found.principal)
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, PassvaultError> {
        let principal = self.resolve(refresh_token, TokenType::Refresh).await?;
        self.issuer.issue(&principal, TokenType::Access)
    }

    async fn resolve(&self, token: &str, expected: TokenType) -> Result<Principal, PassvaultError> {
        let claims = self.issuer.validate(token, expected)?;
        let principal = self
            .storage
            .get_principal(&PrincipalId(claims.sub))
            .await?
            .ok_or_else(|| PassvaultError::Authentication(INVALID_TOKEN.to_string()))?;

        if !principal.is_active {
            debug!(principal_id = %principal.id, "token for inactive principal");
            return Err(PassvaultError::Authentication(INVALID_TOKEN.to_string()));
        }
        Ok(principal)
    }
}

fn bad_credentials() -> PassvaultError {
    PassvaultError::Authentication(BAD_CREDENTIALS.to_string())
}

#[async_trait]
impl PluginAdapter for JwtAuthenticator {
    fn name(&self) -> &str {
        "jwt"
    }

    async fn health_check(&self) -> Result<HealthStatus, PassvaultError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PassvaultError> {
        Ok(())
    }
}

#[async_trait]
impl AuthAdapter for JwtAuthenticator {
    async fn authenticate(&self, bearer: &str) -> Result<Principal, PassvaultError> {
        self.resolve(bearer, TokenType::Access).await
    }
}
