//! SQLite-backed store
//!
//! A single connection guarded by an async mutex. Handlers await store calls
//! one after another, so the connection is never a contention point.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::{appointments, staff, users, AppointmentStore};
use crate::domain::{
    Appointment, ContactDetails, Identity, NewAppointment, ProfileUpdate, Staff, UserProfile,
};

const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_initial.sql"))];

/// Storage format for appointment wall-clock times; sorts lexicographically
const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database file and run pending migrations
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;
        run_migrations(&conn)?;

        tracing::info!(path = %path.display(), "Opened store");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// In-memory database, used by tests and `--ephemeral` runs
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Apply every migration newer than the recorded schema version
fn run_migrations(conn: &Connection) -> StoreResult<()> {
    let current = current_version(conn)?;

    for &(version, sql) in MIGRATIONS {
        if version > current {
            tracing::info!(version, "Running store migration");
            conn.execute_batch(sql).map_err(|e| StoreError::Migration {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// 0 when the schema has never been created
fn current_version(conn: &Connection) -> StoreResult<i64> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
        [],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(0);
    }

    let version = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(version.unwrap_or(0))
}

pub(super) fn encode_local(at: NaiveDateTime) -> String {
    at.format(LOCAL_FORMAT).to_string()
}

pub(super) fn decode_local(field: &'static str, value: &str) -> StoreResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, LOCAL_FORMAT).map_err(|_| StoreError::invalid(field, value))
}

pub(super) fn encode_utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

pub(super) fn decode_utc(field: &'static str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::invalid(field, value))
}

#[async_trait]
impl AppointmentStore for SqliteStore {
    async fn ping(&self) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    async fn find_user(&self, identity_id: &str) -> StoreResult<Option<UserProfile>> {
        let conn = self.conn.lock().await;
        users::find_by_identity(&conn, identity_id)
    }

    async fn ensure_user(&self, identity: &Identity) -> StoreResult<UserProfile> {
        let conn = self.conn.lock().await;
        users::ensure(&conn, identity)
    }

    async fn save_profile(
        &self,
        identity: &Identity,
        update: ProfileUpdate,
    ) -> StoreResult<UserProfile> {
        let conn = self.conn.lock().await;
        let user = users::ensure(&conn, identity)?;
        users::update(&conn, user.id, &update)
    }

    async fn insert_guest(&self, contact: &ContactDetails) -> StoreResult<UserProfile> {
        let conn = self.conn.lock().await;
        users::insert_guest(&conn, contact)
    }

    async fn list_staff(&self) -> StoreResult<Vec<Staff>> {
        let conn = self.conn.lock().await;
        staff::list(&conn)
    }

    async fn get_staff(&self, id: i64) -> StoreResult<Option<Staff>> {
        let conn = self.conn.lock().await;
        staff::get(&conn, id)
    }

    async fn seed_staff(&self, directory: &[Staff]) -> StoreResult<usize> {
        let mut conn = self.conn.lock().await;
        staff::seed(&mut conn, directory)
    }

    async fn add_appointment(
        &self,
        identity: &Identity,
        new: NewAppointment,
    ) -> StoreResult<Appointment> {
        let conn = self.conn.lock().await;
        let user = users::ensure(&conn, identity)?;
        let appointment = appointments::insert(&conn, user.id, &new)?;

        tracing::info!(
            appointment_id = %appointment.id,
            user_id = user.id,
            staff_id = appointment.staff_id,
            scheduled_at = %appointment.scheduled_at,
            "Booked appointment"
        );
        Ok(appointment)
    }

    async fn list_appointments(
        &self,
        identity: &Identity,
        include_cancelled: bool,
    ) -> StoreResult<Vec<Appointment>> {
        let conn = self.conn.lock().await;
        match users::find_by_identity(&conn, &identity.id)? {
            Some(user) => appointments::list_for_user(&conn, user.id, include_cancelled),
            None => Ok(Vec::new()),
        }
    }

    async fn get_appointment(&self, identity: &Identity, id: Uuid) -> StoreResult<Appointment> {
        let conn = self.conn.lock().await;
        let user = owner(&conn, identity, id)?;
        appointments::get_for_user(&conn, user.id, id)
    }

    async fn cancel_appointment(&self, identity: &Identity, id: Uuid) -> StoreResult<Appointment> {
        let conn = self.conn.lock().await;
        let user = owner(&conn, identity, id)?;
        let appointment = appointments::cancel(&conn, user.id, id)?;

        tracing::info!(appointment_id = %id, user_id = user.id, "Cancelled appointment");
        Ok(appointment)
    }

    async fn reschedule_appointment(
        &self,
        identity: &Identity,
        id: Uuid,
        scheduled_at: NaiveDateTime,
    ) -> StoreResult<Appointment> {
        let conn = self.conn.lock().await;
        let user = owner(&conn, identity, id)?;
        let appointment = appointments::reschedule(&conn, user.id, id, scheduled_at)?;

        tracing::info!(
            appointment_id = %id,
            user_id = user.id,
            scheduled_at = %scheduled_at,
            "Rescheduled appointment"
        );
        Ok(appointment)
    }

    async fn upcoming_appointment(
        &self,
        identity: &Identity,
        now: NaiveDateTime,
    ) -> StoreResult<Option<Appointment>> {
        let conn = self.conn.lock().await;
        match users::find_by_identity(&conn, &identity.id)? {
            Some(user) => appointments::next_after(&conn, user.id, now),
            None => Ok(None),
        }
    }
}

/// Profile row of the caller; an unknown caller cannot own `appointment_id`
fn owner(conn: &Connection, identity: &Identity, appointment_id: Uuid) -> StoreResult<UserProfile> {
    users::find_by_identity(conn, &identity.id)?
        .ok_or_else(|| StoreError::not_found("Appointment", appointment_id))
}
