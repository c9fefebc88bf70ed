// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The only path from a principal to its credential records.
//!
//! Every operation takes the acting [`Principal`] and passes its id down to
//! storage, where it becomes part of the `WHERE` clause. Records owned by
//! anyone else are indistinguishable from records that do not exist.

use std::sync::Arc;

use passvault_core::{
    timestamp_now, CredentialPatch, PassvaultError, Principal, RecordId, StorageAdapter,
    StoredCredential,
};
use passvault_vault::{codec, ProcessKey};
use secrecy::SecretString;
use tracing::{debug, warn};

use crate::model::{CredentialChanges, CredentialRecord, NewCredential};

/// Owner-scoped access to credential records.
#[derive(Clone)]
pub struct CredentialRepository {
    storage: Arc<dyn StorageAdapter>,
    key: Arc<ProcessKey>,
}

impl CredentialRepository {
    pub fn new(storage: Arc<dyn StorageAdapter>, key: Arc<ProcessKey>) -> Self {
        Self { storage, key }
    }

    /// All of the principal's records, in insertion order.
    ///
    /// Secrets stay enveloped; callers open them one by one with
    /// [`reveal`](Self::reveal) so one bad record cannot fail the list.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<CredentialRecord>, PassvaultError> {
        let records = self.storage.list_credentials(&principal.id).await?;
        Ok(records.into_iter().map(CredentialRecord::from).collect())
    }

    /// Create a record owned by `principal`. The secret is enveloped before it is stored.
    pub async fn create(
        &self,
        principal: &Principal,
        new: NewCredential,
    ) -> Result<CredentialRecord, PassvaultError> {
        let new = new.validated()?;
        let envelope = codec::encrypt(&new.raw_password, &self.key)?;

        let now = timestamp_now();
        let stored = StoredCredential {
            id: RecordId::generate(),
            owner_id: principal.id.clone(),
            title: new.title,
            username: new.username.unwrap_or_default(),
            service_url: new.service_url.unwrap_or_default(),
            notes: new.notes.unwrap_or_default(),
            envelope: envelope.into_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.storage.insert_credential(&stored).await?;

        debug!(record_id = %stored.id, owner_id = %principal.id, "credential record created");
        Ok(stored.into())
    }

    /// One of the principal's records.
    pub async fn get(
        &self,
        principal: &Principal,
        id: &RecordId,
    ) -> Result<CredentialRecord, PassvaultError> {
        self.storage
            .get_credential(&principal.id, id)
            .await?
            .map(CredentialRecord::from)
            .ok_or(PassvaultError::NotFound)
    }

    /// Apply `changes` to one of the principal's records in a single statement.
    ///
    /// `updated_at` is refreshed on every successful update. The secret is
    /// re-enveloped only when a new one is supplied.
    pub async fn update(
        &self,
        principal: &Principal,
        id: &RecordId,
        changes: CredentialChanges,
    ) -> Result<CredentialRecord, PassvaultError> {
        let changes = changes.validated()?;
        let envelope = changes
            .raw_password
            .as_ref()
            .map(|raw| codec::encrypt(raw, &self.key))
            .transpose()?;

        let patch = CredentialPatch {
            title: changes.title,
            username: changes.username,
            service_url: changes.service_url,
            notes: changes.notes,
            envelope: envelope.map(codec::Envelope::into_string),
            updated_at: timestamp_now(),
        };

        let updated = self
            .storage
            .update_credential(&principal.id, id, &patch)
            .await?
            .ok_or(PassvaultError::NotFound)?;

        debug!(
            record_id = %id,
            owner_id = %principal.id,
            secret_changed = patch.envelope.is_some(),
            "credential record updated"
        );
        Ok(updated.into())
    }

    /// Delete one of the principal's records.
    pub async fn delete(&self, principal: &Principal, id: &RecordId) -> Result<(), PassvaultError> {
        if self.storage.delete_credential(&principal.id, id).await? {
            debug!(record_id = %id, owner_id = %principal.id, "credential record deleted");
            Ok(())
        } else {
            Err(PassvaultError::NotFound)
        }
    }

    /// Resolve one of the principal's records and open its secret.
    pub async fn get_plaintext(
        &self,
        principal: &Principal,
        id: &RecordId,
    ) -> Result<SecretString, PassvaultError> {
        let record = self.get(principal, id).await?;
        self.reveal(&record)
    }

    /// Open a record's secret.
    ///
    /// Codec failures are logged with the record id and failure kind, then
    /// collapsed into [`PassvaultError::RetrievalFailed`].
    pub fn reveal(&self, record: &CredentialRecord) -> Result<SecretString, PassvaultError> {
        codec::decrypt(record.envelope(), &self.key).map_err(|err| {
            warn!(
                record_id = %record.id,
                error_kind = err.kind(),
                "credential secret could not be decrypted"
            );
            PassvaultError::RetrievalFailed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passvault_config::model::StorageConfig;
    use passvault_core::PrincipalId;
    use passvault_storage::SqliteStorage;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    struct Fixture {
        _dir: TempDir,
        repo: CredentialRepository,
        alice: Principal,
    }

    async fn setup() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("vault.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();

        let alice = Principal {
            id: PrincipalId::generate(),
            email: "alice@example.com".to_string(),
            handle: "alice".to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: timestamp_now(),
        };
        storage.insert_principal(&alice, "hash").await.unwrap();

        let key = Arc::new(ProcessKey::generate().unwrap());
        Fixture {
            _dir: dir,
            repo: CredentialRepository::new(Arc::new(storage), key),
            alice,
        }
    }

    fn new_credential(title: &str, secret: &str) -> NewCredential {
        NewCredential {
            title: title.to_string(),
            username: None,
            service_url: None,
            notes: None,
            raw_password: SecretString::from(secret.to_string()),
        }
    }

    fn with_envelope(record: &CredentialRecord, envelope: String) -> CredentialRecord {
        CredentialRecord::from(StoredCredential {
            id: record.id.clone(),
            owner_id: record.owner_id.clone(),
            title: record.title.clone(),
            username: record.username.clone(),
            service_url: record.service_url.clone(),
            notes: record.notes.clone(),
            envelope,
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        })
    }

    #[tokio::test]
    async fn reveal_opens_fresh_record() {
        let f = setup().await;
        let record = f
            .repo
            .create(&f.alice, new_credential("Correo", "cave200211"))
            .await
            .unwrap();
        assert_eq!(f.repo.reveal(&record).unwrap().expose_secret(), "cave200211");
    }

    #[tokio::test]
    #[traced_test]
    async fn corrupted_envelope_is_logged_without_plaintext() {
        let f = setup().await;
        let record = f
            .repo
            .create(&f.alice, new_credential("Correo", "cave200211"))
            .await
            .unwrap();

        // Starts with the version byte and is long enough, so it fails authentication.
        let broken = with_envelope(&record, "AQ".repeat(20));

        let err = f.repo.reveal(&broken).unwrap_err();
        assert!(matches!(err, PassvaultError::RetrievalFailed));
        assert!(logs_contain("credential secret could not be decrypted"));
        assert!(logs_contain("integrity"));
        assert!(!logs_contain("cave200211"));
    }

    #[tokio::test]
    #[traced_test]
    async fn malformed_envelope_is_logged_as_format() {
        let f = setup().await;
        let record = f
            .repo
            .create(&f.alice, new_credential("Correo", "cave200211"))
            .await
            .unwrap();

        let broken = with_envelope(&record, "short".to_string());

        assert!(matches!(
            f.repo.reveal(&broken),
            Err(PassvaultError::RetrievalFailed)
        ));
        assert!(logs_contain("format"));
    }
}
