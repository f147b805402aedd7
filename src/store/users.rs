//! `users` table

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::{StoreError, StoreResult};
use super::sqlite::{decode_utc, encode_utc};
use crate::domain::{ContactDetails, Identity, Preference, ProfileUpdate, UserProfile};

const COLUMNS: &str =
    "id, identity_id, name, email, phone, address, preference, created_at, updated_at";

struct UserRow {
    id: i64,
    identity_id: Option<String>,
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    preference: Option<String>,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            identity_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            address: row.get(5)?,
            preference: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl TryFrom<UserRow> for UserProfile {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        let preference = row
            .preference
            .as_deref()
            .map(|p| p.parse::<Preference>().map_err(|_| StoreError::invalid("preference", p)))
            .transpose()?;

        Ok(UserProfile {
            id: row.id,
            identity_id: row.identity_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            preference,
            created_at: decode_utc("created_at", &row.created_at)?,
            updated_at: decode_utc("updated_at", &row.updated_at)?,
        })
    }
}

pub(super) fn find_by_identity(
    conn: &Connection,
    identity_id: &str,
) -> StoreResult<Option<UserProfile>> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM users WHERE identity_id = ?1"),
            params![identity_id],
            UserRow::from_row,
        )
        .optional()?;

    row.map(UserProfile::try_from).transpose()
}

pub(super) fn get(conn: &Connection, id: i64) -> StoreResult<UserProfile> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            UserRow::from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found("User", id))?;

    row.try_into()
}

/// Existing row for `identity`, or a new one seeded from the provider profile
pub(super) fn ensure(conn: &Connection, identity: &Identity) -> StoreResult<UserProfile> {
    if let Some(user) = find_by_identity(conn, &identity.id)? {
        return Ok(user);
    }

    let now = encode_utc(Utc::now());
    conn.execute(
        "INSERT INTO users (identity_id, name, email, phone, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            identity.id,
            identity.display_name(),
            identity.email.as_deref().unwrap_or(""),
            identity.phone,
            now,
        ],
    )?;

    tracing::debug!(identity_id = %identity.id, "Created user profile");
    get(conn, conn.last_insert_rowid())
}

pub(super) fn update(conn: &Connection, id: i64, update: &ProfileUpdate) -> StoreResult<UserProfile> {
    let current = get(conn, id)?;

    let name = update.name.clone().unwrap_or(current.name);
    let email = update.email.clone().unwrap_or(current.email);
    let phone = update.phone.clone().or(current.phone);
    let address = update.address.clone().or(current.address);
    let preference = update.preference.or(current.preference);

    conn.execute(
        "UPDATE users
         SET name = ?1, email = ?2, phone = ?3, address = ?4, preference = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            name,
            email,
            phone,
            address,
            preference.map(|p| p.as_str()),
            encode_utc(Utc::now()),
            id,
        ],
    )?;

    get(conn, id)
}

/// Contact details from a visitor who is not signed in
pub(super) fn insert_guest(conn: &Connection, contact: &ContactDetails) -> StoreResult<UserProfile> {
    let now = encode_utc(Utc::now());
    conn.execute(
        "INSERT INTO users (identity_id, name, email, phone, address, preference, created_at, updated_at)
         VALUES (NULL, ?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            contact.name.trim(),
            contact.email.trim(),
            contact.phone.trim(),
            contact.address,
            contact.preference.map(|p| p.as_str()),
            now,
        ],
    )?;

    get(conn, conn.last_insert_rowid())
}
