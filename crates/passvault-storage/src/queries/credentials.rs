// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential record operations.
//!
//! Every statement that touches an existing row filters on both `id` and
//! `owner_id`, so a foreign record behaves exactly like a missing one.

use passvault_core::{
    timestamp_after, CredentialPatch, PassvaultError, PrincipalId, RecordId, StoredCredential,
};
use rusqlite::{params, OptionalExtension, Row};

use crate::database::{map_tr_err, Database};

const RECORD_COLUMNS: &str =
    "id, owner_id, title, username, service_url, notes, envelope, created_at, updated_at";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StoredCredential> {
    Ok(StoredCredential {
        id: RecordId(row.get(0)?),
        owner_id: PrincipalId(row.get(1)?),
        title: row.get(2)?,
        username: row.get(3)?,
        service_url: row.get(4)?,
        notes: row.get(5)?,
        envelope: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Insert a new credential record.
pub async fn insert_credential(
    db: &Database,
    record: &StoredCredential,
) -> Result<(), PassvaultError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO credential_records
                    (id, owner_id, title, username, service_url, notes, envelope, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.id.as_str(),
                    record.owner_id.as_str(),
                    record.title,
                    record.username,
                    record.service_url,
                    record.notes,
                    record.envelope,
                    record.created_at,
                    record.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List the owner's records in insertion order.
pub async fn list_credentials(
    db: &Database,
    owner: &PrincipalId,
) -> Result<Vec<StoredCredential>, PassvaultError> {
    let owner = owner.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM credential_records
                 WHERE owner_id = ?1 ORDER BY rowid ASC"
            ))?;
            let rows = stmt.query_map(params![owner.as_str()], record_from_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Get one record owned by `owner`.
pub async fn get_credential(
    db: &Database,
    owner: &PrincipalId,
    id: &RecordId,
) -> Result<Option<StoredCredential>, PassvaultError> {
    let owner = owner.clone();
    let id = id.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM credential_records
                     WHERE id = ?1 AND owner_id = ?2"
                ),
                params![id.as_str(), owner.as_str()],
                record_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a patch to the owner's record and return the new row.
///
/// `None` columns in the patch are left as they are. The stored `updated_at`
/// only moves forward: if the patch's timestamp does not sort after it, the
/// row gets the previous value plus one microsecond.
pub async fn update_credential(
    db: &Database,
    owner: &PrincipalId,
    id: &RecordId,
    patch: &CredentialPatch,
) -> Result<Option<StoredCredential>, PassvaultError> {
    let owner = owner.clone();
    let id = id.clone();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let previous: Option<String> = tx
                .query_row(
                    "SELECT updated_at FROM credential_records WHERE id = ?1 AND owner_id = ?2",
                    params![id.as_str(), owner.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(previous) = previous else {
                return Ok(None);
            };

            let updated = tx.query_row(
                &format!(
                    "UPDATE credential_records SET
                        title = COALESCE(?3, title),
                        username = COALESCE(?4, username),
                        service_url = COALESCE(?5, service_url),
                        notes = COALESCE(?6, notes),
                        envelope = COALESCE(?7, envelope),
                        updated_at = ?8
                     WHERE id = ?1 AND owner_id = ?2
                     RETURNING {RECORD_COLUMNS}"
                ),
                params![
                    id.as_str(),
                    owner.as_str(),
                    patch.title,
                    patch.username,
                    patch.service_url,
                    patch.notes,
                    patch.envelope,
                    timestamp_after(&patch.updated_at, &previous),
                ],
                record_from_row,
            )?;
            tx.commit()?;
            Ok(Some(updated))
        })
        .await
        .map_err(map_tr_err)
}

/// Delete the owner's record. Returns `false` when nothing matched.
pub async fn delete_credential(
    db: &Database,
    owner: &PrincipalId,
    id: &RecordId,
) -> Result<bool, PassvaultError> {
    let owner = owner.clone();
    let id = id.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM credential_records WHERE id = ?1 AND owner_id = ?2",
                params![id.as_str(), owner.as_str()],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
