// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use passvault_config::model::StorageConfig;
use passvault_core::{
    CredentialPatch, HealthStatus, PassvaultError, PluginAdapter, Principal,
    PrincipalCredentials, PrincipalId, RecordId, StorageAdapter, StoredCredential,
};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, PassvaultError> {
        self.db.get().ok_or_else(|| PassvaultError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, PassvaultError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PassvaultError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), PassvaultError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| PassvaultError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), PassvaultError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Principal operations ---

    async fn insert_principal(
        &self,
        principal: &Principal,
        password_hash: &str,
    ) -> Result<(), PassvaultError> {
        queries::principals::insert_principal(self.db()?, principal, password_hash).await
    }

    async fn get_principal(&self, id: &PrincipalId) -> Result<Option<Principal>, PassvaultError> {
        queries::principals::get_principal(self.db()?, id).await
    }

    async fn find_principal_by_email(
        &self,
        email: &str,
    ) -> Result<Option<PrincipalCredentials>, PassvaultError> {
        queries::principals::find_principal_by_email(self.db()?, email).await
    }

    async fn set_principal_active(
        &self,
        id: &PrincipalId,
        active: bool,
    ) -> Result<bool, PassvaultError> {
        queries::principals::set_principal_active(self.db()?, id, active).await
    }

    async fn delete_principal(&self, id: &PrincipalId) -> Result<bool, PassvaultError> {
        queries::principals::delete_principal(self.db()?, id).await
    }

    // --- Credential record operations ---

    async fn insert_credential(&self, record: &StoredCredential) -> Result<(), PassvaultError> {
        queries::credentials::insert_credential(self.db()?, record).await
    }

    async fn list_credentials(
        &self,
        owner: &PrincipalId,
    ) -> Result<Vec<StoredCredential>, PassvaultError> {
        queries::credentials::list_credentials(self.db()?, owner).await
    }

    async fn get_credential(
        &self,
        owner: &PrincipalId,
        id: &RecordId,
    ) -> Result<Option<StoredCredential>, PassvaultError> {
        queries::credentials::get_credential(self.db()?, owner, id).await
    }

    async fn update_credential(
        &self,
        owner: &PrincipalId,
        id: &RecordId,
        patch: &CredentialPatch,
    ) -> Result<Option<StoredCredential>, PassvaultError> {
        queries::credentials::update_credential(self.db()?, owner, id, patch).await
    }

    async fn delete_credential(
        &self,
        owner: &PrincipalId,
        id: &RecordId,
    ) -> Result<bool, PassvaultError> {
        queries::credentials::delete_credential(self.db()?, owner, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passvault_core::timestamp_now;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let result = storage.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let status = storage.health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        let result = storage.health_check().await;
        assert!(result.is_err(), "health_check should fail before initialize");
    }

    #[tokio::test]
    async fn full_record_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        let owner = Principal {
            id: PrincipalId::generate(),
            email: "owner@example.com".to_string(),
            handle: "owner".to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: timestamp_now(),
        };
        storage.insert_principal(&owner, "hash").await.unwrap();

        let now = timestamp_now();
        let record = StoredCredential {
            id: RecordId::generate(),
            owner_id: owner.id.clone(),
            title: "Correo".to_string(),
            username: String::new(),
            service_url: String::new(),
            notes: String::new(),
            envelope: "AQ".to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        storage.insert_credential(&record).await.unwrap();
        assert_eq!(storage.list_credentials(&owner.id).await.unwrap().len(), 1);

        let patch = CredentialPatch {
            title: Some("Correo personal".to_string()),
            updated_at: timestamp_now(),
            ..Default::default()
        };
        let updated = storage
            .update_credential(&owner.id, &record.id, &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Correo personal");

        assert!(storage.delete_credential(&owner.id, &record.id).await.unwrap());
        assert!(storage
            .get_credential(&owner.id, &record.id)
            .await
            .unwrap()
            .is_none());

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_without_initialize_is_noop() {
        let storage = SqliteStorage::new(make_config("/nonexistent/never-opened.db"));
        storage.shutdown().await.unwrap();
    }
}
