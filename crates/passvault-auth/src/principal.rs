// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-side principal provisioning.

use std::collections::BTreeMap;
use std::sync::Arc;

use passvault_core::{timestamp_now, PassvaultError, Principal, PrincipalId, StorageAdapter};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::password::hash_off_runtime;

pub const HANDLE_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 254;

/// Lower-case the domain part of an email address.
///
/// The local part is left alone; some mail servers treat it as
/// case-sensitive.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Input for `passvault user create`.
#[derive(Debug)]
pub struct NewPrincipal {
    pub email: String,
    pub handle: String,
    pub password: SecretString,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewPrincipal {
    fn validated(self) -> Result<Self, PassvaultError> {
        let email = normalize_email(&self.email);
        let handle = self.handle.trim().to_string();
        let mut fields = BTreeMap::new();

        match email.rsplit_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
                if email.chars().count() > EMAIL_MAX_CHARS {
                    fields.insert(
                        "email".to_string(),
                        format!("Ensure this field has no more than {EMAIL_MAX_CHARS} characters."),
                    );
                }
            }
            _ => {
                fields.insert("email".to_string(), "Enter a valid email address.".to_string());
            }
        }

        if handle.is_empty() {
            fields.insert("handle".to_string(), "This field may not be blank.".to_string());
        } else if handle.chars().count() > HANDLE_MAX_CHARS {
            fields.insert(
                "handle".to_string(),
                format!("Ensure this field has no more than {HANDLE_MAX_CHARS} characters."),
            );
        }

        if self.password.expose_secret().is_empty() {
            fields.insert("password".to_string(), "This field may not be blank.".to_string());
        }

        if !fields.is_empty() {
            return Err(PassvaultError::invalid_fields(fields));
        }
        Ok(Self {
            email,
            handle,
            ..self
        })
    }
}

/// Creates and deactivates principals.
#[derive(Clone)]
pub struct PrincipalDirectory {
    storage: Arc<dyn StorageAdapter>,
}

impl PrincipalDirectory {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Hash the password and store a new active principal.
    ///
    /// A taken email or handle is a [`PassvaultError::Conflict`].
    pub async fn create(&self, new: NewPrincipal) -> Result<Principal, PassvaultError> {
        let new = new.validated()?;
        let password_hash = hash_off_runtime(&new.password).await?;

        let principal = Principal {
            id: PrincipalId::generate(),
            email: new.email,
            handle: new.handle,
            is_active: true,
            is_staff: new.is_staff,
            is_superuser: new.is_superuser,
            created_at: timestamp_now(),
        };
        self.storage
            .insert_principal(&principal, &password_hash)
            .await?;

        info!(principal_id = %principal.id, handle = %principal.handle, "principal created");
        Ok(principal)
    }

    /// Flip the active flag off. The principal and its records stay.
    pub async fn deactivate(&self, email: &str) -> Result<Principal, PassvaultError> {
        let email = normalize_email(email);
        let found = self
            .storage
            .find_principal_by_email(&email)
            .await?
            .ok_or(PassvaultError::NotFound)?;

        let mut principal = found.principal;
        if !self.storage.set_principal_active(&principal.id, false).await? {
            return Err(PassvaultError::NotFound);
        }
        principal.is_active = false;

        info!(principal_id = %principal.id, "principal deactivated");
        Ok(principal)
    }

    /// Remove the principal for good. Its credential records go with it.
    pub async fn delete(&self, email: &str) -> Result<Principal, PassvaultError> {
        let email = normalize_email(email);
        let principal = self
            .storage
            .find_principal_by_email(&email)
            .await?
            .ok_or(PassvaultError::NotFound)?
            .principal;

        if !self.storage.delete_principal(&principal.id).await? {
            return Err(PassvaultError::NotFound);
        }

        info!(principal_id = %principal.id, "principal deleted");
        Ok(principal)
    }
}
