// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by storage, repository, auth, and gateway crates.

use serde::{Deserialize, Serialize};

/// Timestamp format used for every persisted timestamp.
///
/// Microsecond precision keeps successive mutations strictly ordered, and the
/// fixed width makes lexicographic order match chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Current UTC time formatted with [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// `candidate` if it sorts after `previous`, otherwise one microsecond past
/// `previous`. Keeps a row's timestamps increasing when the clock steps back.
pub fn timestamp_after(candidate: &str, previous: &str) -> String {
    if candidate > previous {
        return candidate.to_string();
    }
    match chrono::DateTime::parse_from_rfc3339(previous) {
        Ok(prev) => (prev.with_timezone(&chrono::Utc) + chrono::Duration::microseconds(1))
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        Err(_) => candidate.to_string(),
    }
}

/// Unique identifier of a principal. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a credential record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated actor and the unit of ownership for credential records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    /// Globally unique, normalized email.
    pub email: String,
    /// Globally unique handle.
    pub handle: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: String,
}

/// A principal together with its stored password hash.
///
/// Only the token endpoint needs this; everything else works with
/// [`Principal`].
#[derive(Clone)]
pub struct PrincipalCredentials {
    pub principal: Principal,
    /// Argon2id PHC string.
    pub password_hash: String,
}

impl std::fmt::Debug for PrincipalCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalCredentials")
            .field("principal", &self.principal)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// A credential record as persisted. The secret is only ever an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub id: RecordId,
    pub owner_id: PrincipalId,
    pub title: String,
    /// Empty when not provided.
    pub username: String,
    /// Empty when not provided.
    pub service_url: String,
    /// Empty when not provided.
    pub notes: String,
    /// Opaque encoded envelope produced by the codec.
    pub envelope: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Column changes applied by a single owner-scoped update.
///
/// `None` leaves the column untouched. `updated_at` is always written.
#[derive(Debug, Clone, Default)]
pub struct CredentialPatch {
    pub title: Option<String>,
    pub username: Option<String>,
    pub service_url: Option<String>,
    pub notes: Option<String>,
    pub envelope: Option<String>,
    pub updated_at: String,
}

/// Health status reported by component health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Fully operational.
    Healthy,
    /// Operational but experiencing issues.
    Degraded(String),
    /// Not operational.
    Unhealthy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(PrincipalId::generate(), PrincipalId::generate());
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = RecordId("abc".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }

    #[test]
    fn timestamps_order_lexicographically() {
        let a = timestamp_now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = timestamp_now();
        assert!(a < b, "{a} should sort before {b}");
        assert!(a.ends_with('Z'));
    }

    #[test]
    fn later_candidate_timestamp_is_kept() {
        assert_eq!(
            timestamp_after("2026-03-01T10:00:00.000002Z", "2026-03-01T10:00:00.000001Z"),
            "2026-03-01T10:00:00.000002Z"
        );
    }

    #[test]
    fn earlier_or_equal_candidate_is_bumped_past_previous() {
        assert_eq!(
            timestamp_after("2026-03-01T09:59:59.000000Z", "2026-03-01T10:00:00.000000Z"),
            "2026-03-01T10:00:00.000001Z"
        );
        assert_eq!(
            timestamp_after("2026-03-01T23:59:59.999999Z", "2026-03-01T23:59:59.999999Z"),
            "2026-03-02T00:00:00.000000Z"
        );
    }

    #[test]
    fn principal_credentials_debug_redacts_hash() {
        let creds = PrincipalCredentials {
            principal: Principal {
                id: PrincipalId("p1".into()),
                email: "a@example.com".into(),
                handle: "a".into(),
                is_active: true,
                is_staff: false,
                is_superuser: false,
                created_at: timestamp_now(),
            },
            password_hash: "$argon2id$v=19$secret".into(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("argon2id"));
        assert!(debug.contains("[REDACTED]"));
    }
}
