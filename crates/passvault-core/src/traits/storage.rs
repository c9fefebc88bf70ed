// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::PassvaultError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    CredentialPatch, Principal, PrincipalCredentials, PrincipalId, RecordId, StoredCredential,
};

/// Adapter for storage and persistence backends.
///
/// Every credential operation takes the owning principal's id and filters on
/// it inside the backend, so a record owned by someone else is
/// indistinguishable from one that does not exist.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), PassvaultError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), PassvaultError>;

    // --- Principals ---

    /// Inserts a new principal. Fails with [`PassvaultError::Conflict`] when
    /// the email or handle is already taken.
    async fn insert_principal(
        &self,
        principal: &Principal,
        password_hash: &str,
    ) -> Result<(), PassvaultError>;

    /// Looks up a principal by id.
    async fn get_principal(&self, id: &PrincipalId) -> Result<Option<Principal>, PassvaultError>;

    /// Looks up a principal and its password hash by normalized email.
    async fn find_principal_by_email(
        &self,
        email: &str,
    ) -> Result<Option<PrincipalCredentials>, PassvaultError>;

    /// Flips the active flag. Returns `false` when no such principal exists.
    async fn set_principal_active(
        &self,
        id: &PrincipalId,
        active: bool,
    ) -> Result<bool, PassvaultError>;

    /// Deletes a principal; its credential records cascade. Backs the
    /// operator's `passvault user delete`.
    async fn delete_principal(&self, id: &PrincipalId) -> Result<bool, PassvaultError>;

    // --- Credential records ---

    /// Inserts a new credential record.
    async fn insert_credential(&self, record: &StoredCredential) -> Result<(), PassvaultError>;

    /// Lists the owner's records in insertion order.
    async fn list_credentials(
        &self,
        owner: &PrincipalId,
    ) -> Result<Vec<StoredCredential>, PassvaultError>;

    /// Fetches one record if, and only if, it belongs to `owner`.
    async fn get_credential(
        &self,
        owner: &PrincipalId,
        id: &RecordId,
    ) -> Result<Option<StoredCredential>, PassvaultError>;

    /// Applies `patch` atomically to the owner's record and returns the new row.
    async fn update_credential(
        &self,
        owner: &PrincipalId,
        id: &RecordId,
        patch: &CredentialPatch,
    ) -> Result<Option<StoredCredential>, PassvaultError>;

    /// Deletes the owner's record. Returns `false` when nothing matched.
    async fn delete_credential(
        &self,
        owner: &PrincipalId,
        id: &RecordId,
    ) -> Result<bool, PassvaultError>;
}
