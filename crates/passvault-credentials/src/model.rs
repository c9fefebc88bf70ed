// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inputs and outputs of the credential repository.

use passvault_core::{PassvaultError, PrincipalId, RecordId, StoredCredential};
use passvault_vault::Envelope;
use secrecy::SecretString;

use crate::validation::{self, FieldErrors};

/// Input for creating a record. The owner is never part of it.
#[derive(Debug)]
pub struct NewCredential {
    pub title: String,
    pub username: Option<String>,
    pub service_url: Option<String>,
    pub notes: Option<String>,
    pub raw_password: SecretString,
}

impl NewCredential {
    /// Trim text fields and check every field rule, reporting all failures.
    pub fn validated(self) -> Result<Self, PassvaultError> {
        let normalized = Self {
            title: self.title.trim().to_string(),
            username: self.username.map(|u| u.trim().to_string()),
            service_url: self.service_url.map(|u| u.trim().to_string()),
            notes: self.notes,
            raw_password: self.raw_password,
        };

        let mut errors = FieldErrors::default();
        validation::check_title(&normalized.title, &mut errors);
        if let Some(username) = &normalized.username {
            validation::check_username(username, &mut errors);
        }
        if let Some(service_url) = &normalized.service_url {
            validation::check_service_url(service_url, &mut errors);
        }
        validation::check_raw_password(&normalized.raw_password, &mut errors);
        errors.into_result()?;

        Ok(normalized)
    }
}

/// Changes to an existing record. `None` leaves a field as it is.
///
/// A new secret is only enveloped when `raw_password` is supplied.
#[derive(Debug, Default)]
pub struct CredentialChanges {
    pub title: Option<String>,
    pub username: Option<String>,
    pub service_url: Option<String>,
    pub notes: Option<String>,
    pub raw_password: Option<SecretString>,
}

impl CredentialChanges {
    /// Trim supplied text fields and check them, reporting all failures.
    pub fn validated(self) -> Result<Self, PassvaultError> {
        let normalized = Self {
            title: self.title.map(|t| t.trim().to_string()),
            username: self.username.map(|u| u.trim().to_string()),
            service_url: self.service_url.map(|u| u.trim().to_string()),
            notes: self.notes,
            raw_password: self.raw_password,
        };

        let mut errors = FieldErrors::default();
        if let Some(title) = &normalized.title {
            validation::check_title(title, &mut errors);
        }
        if let Some(username) = &normalized.username {
            validation::check_username(username, &mut errors);
        }
        if let Some(service_url) = &normalized.service_url {
            validation::check_service_url(service_url, &mut errors);
        }
        if let Some(raw_password) = &normalized.raw_password {
            validation::check_raw_password(raw_password, &mut errors);
        }
        errors.into_result()?;

        Ok(normalized)
    }

    /// Like [`validated`](Self::validated), but a missing title is an error.
    ///
    /// Used for full replacement, where the client must send the whole record.
    pub fn validated_full(self) -> Result<Self, PassvaultError> {
        let title_missing = self.title.is_none();
        let result = self.validated();
        if !title_missing {
            return result;
        }

        // Report the other fields' problems alongside the missing title.
        let mut errors = FieldErrors::default();
        errors.add("title", validation::REQUIRED);
        if let Err(PassvaultError::Validation { fields, .. }) = result {
            for (field, detail) in fields {
                errors.add(&field, detail);
            }
        }
        Err(errors.into_error())
    }
}

/// A credential record as seen through the repository.
///
/// The secret stays enveloped; use
/// [`CredentialRepository::reveal`](crate::CredentialRepository::reveal) to
/// open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: RecordId,
    pub owner_id: PrincipalId,
    pub title: String,
    pub username: String,
    pub service_url: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
    envelope: Envelope,
}

impl CredentialRecord {
    /// The stored envelope. Never send this to clients.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl From<StoredCredential> for CredentialRecord {
    fn from(stored: StoredCredential) -> Self {
        Self {
            id: stored.id,
            owner_id: stored.owner_id,
            title: stored.title,
            username: stored.username,
            service_url: stored.service_url,
            notes: stored.notes,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            envelope: Envelope::from_stored(stored.envelope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn new_credential_trims_text_fields() {
        let new = NewCredential {
            title: "  Correo  ".to_string(),
            username: Some(" ana ".to_string()),
            service_url: Some(" https://mail.example.com ".to_string()),
            notes: Some(" keep spacing ".to_string()),
            raw_password: secret(" cave200211 "),
        }
        .validated()
        .unwrap();

        assert_eq!(new.title, "Correo");
        assert_eq!(new.username.as_deref(), Some("ana"));
        assert_eq!(new.service_url.as_deref(), Some("https://mail.example.com"));
        assert_eq!(new.notes.as_deref(), Some(" keep spacing "));
    }

    #[test]
    fn new_credential_reports_every_bad_field() {
        let err = NewCredential {
            title: "   ".to_string(),
            username: None,
            service_url: Some("not a url".to_string()),
            notes: None,
            raw_password: secret(""),
        }
        .validated()
        .unwrap_err();

        match err {
            PassvaultError::Validation { fields, .. } => {
                assert_eq!(
                    fields.keys().map(String::as_str).collect::<Vec<_>>(),
                    ["raw_password", "service_url", "title"]
                );
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn partial_changes_only_check_supplied_fields() {
        let changes = CredentialChanges {
            raw_password: Some(secret("new-secret")),
            ..Default::default()
        };
        assert!(changes.validated().is_ok());
    }

    #[test]
    fn blank_secret_in_changes_is_rejected() {
        let changes = CredentialChanges {
            raw_password: Some(secret("  ")),
            ..Default::default()
        };
        assert!(matches!(
            changes.validated(),
            Err(PassvaultError::Validation { .. })
        ));
    }

    #[test]
    fn full_changes_require_title() {
        let err = CredentialChanges {
            service_url: Some("ftp://example.com".to_string()),
            ..Default::default()
        }
        .validated_full()
        .unwrap_err();

        match err {
            PassvaultError::Validation { fields, .. } => {
                assert_eq!(fields["title"], "This field is required.");
                assert!(fields.contains_key("service_url"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
