// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication adapter trait for bearer credential validation.

use async_trait::async_trait;

use crate::error::PassvaultError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Principal;

/// Resolves a bearer credential to the principal it identifies.
///
/// Everything downstream of this trait only ever sees the returned
/// [`Principal`]; nothing parses the credential itself.
#[async_trait]
pub trait AuthAdapter: PluginAdapter {
    /// Validates the bearer credential and returns an active principal.
    ///
    /// Fails with [`PassvaultError::Authentication`] for any invalid,
    /// expired, or inactive credential.
    async fn authenticate(&self, bearer: &str) -> Result<Principal, PassvaultError>;
}
