// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Principal CRUD operations.

use passvault_core::{Principal, PrincipalCredentials, PrincipalId, PassvaultError};
use rusqlite::{params, ErrorCode, OptionalExtension, Row};

use crate::database::{map_tr_err, Database};

const PRINCIPAL_COLUMNS: &str =
    "id, email, handle, is_active, is_staff, is_superuser, created_at, password_hash";

fn principal_from_row(row: &Row<'_>) -> rusqlite::Result<Principal> {
    Ok(Principal {
        id: PrincipalId(row.get(0)?),
        email: row.get(1)?,
        handle: row.get(2)?,
        is_active: row.get(3)?,
        is_staff: row.get(4)?,
        is_superuser: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a principal with its password hash.
///
/// A duplicate email or handle is reported as [`PassvaultError::Conflict`].
pub async fn insert_principal(
    db: &Database,
    principal: &Principal,
    password_hash: &str,
) -> Result<(), PassvaultError> {
    let principal = principal.clone();
    let password_hash = password_hash.to_string();
    let inserted = db
        .connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO principals
                    (id, email, handle, password_hash, is_active, is_staff, is_superuser, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    principal.id.as_str(),
                    principal.email,
                    principal.handle,
                    password_hash,
                    principal.is_active,
                    principal.is_staff,
                    principal.is_superuser,
                    principal.created_at,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    if inserted {
        Ok(())
    } else {
        Err(PassvaultError::Conflict(
            "a principal with this email or handle already exists".to_string(),
        ))
    }
}

/// Get a principal by ID.
pub async fn get_principal(
    db: &Database,
    id: &PrincipalId,
) -> Result<Option<Principal>, PassvaultError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE id = ?1"),
                params![id.as_str()],
                principal_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Get a principal and its password hash by normalized email.
pub async fn find_principal_by_email(
    db: &Database,
    email: &str,
) -> Result<Option<PrincipalCredentials>, PassvaultError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE email = ?1"),
                params![email],
                |row| {
                    Ok(PrincipalCredentials {
                        principal: principal_from_row(row)?,
                        password_hash: row.get(7)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Set the active flag. Returns `false` when no principal matched.
pub async fn set_principal_active(
    db: &Database,
    id: &PrincipalId,
    active: bool,
) -> Result<bool, PassvaultError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE principals SET is_active = ?2 WHERE id = ?1",
                params![id.as_str(), active],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a principal. Its credential records are removed by the cascade.
pub async fn delete_principal(db: &Database, id: &PrincipalId) -> Result<bool, PassvaultError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute("DELETE FROM principals WHERE id = ?1", params![id.as_str()])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use passvault_core::timestamp_now;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn make_principal(email: &str, handle: &str) -> Principal {
        Principal {
            id: PrincipalId::generate(),
            email: email.to_string(),
            handle: handle.to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: timestamp_now(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_principal() {
        let db = setup_db().await;
        let alice = make_principal("alice@example.com", "alice");
        insert_principal(&db, &alice, "$argon2id$hash").await.unwrap();

        let loaded = get_principal(&db, &alice.id).await.unwrap().unwrap();
        assert_eq!(loaded, alice);
    }

    #[tokio::test]
    async fn find_by_email_returns_hash() {
        let db = setup_db().await;
        let alice = make_principal("alice@example.com", "alice");
        insert_principal(&db, &alice, "$argon2id$hash").await.unwrap();

        let creds = find_principal_by_email(&db, "alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.principal.id, alice.id);
        assert_eq!(creds.password_hash, "$argon2id$hash");

        assert!(find_principal_by_email(&db, "bob@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let db = setup_db().await;
        insert_principal(&db, &make_principal("a@example.com", "a"), "h")
            .await
            .unwrap();

        let err = insert_principal(&db, &make_principal("a@example.com", "other"), "h")
            .await
            .unwrap_err();
        assert!(matches!(err, PassvaultError::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_handle_is_conflict() {
        let db = setup_db().await;
        insert_principal(&db, &make_principal("a@example.com", "same"), "h")
            .await
            .unwrap();

        let err = insert_principal(&db, &make_principal("b@example.com", "same"), "h")
            .await
            .unwrap_err();
        assert!(matches!(err, PassvaultError::Conflict(_)));
    }

    #[tokio::test]
    async fn deactivate_flips_flag_without_deleting() {
        let db = setup_db().await;
        let alice = make_principal("alice@example.com", "alice");
        insert_principal(&db, &alice, "h").await.unwrap();

        assert!(set_principal_active(&db, &alice.id, false).await.unwrap());
        let loaded = get_principal(&db, &alice.id).await.unwrap().unwrap();
        assert!(!loaded.is_active);

        let missing = PrincipalId::generate();
        assert!(!set_principal_active(&db, &missing, false).await.unwrap());
    }
}
