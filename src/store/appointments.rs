//! `appointments` table

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::sqlite::{decode_local, decode_utc, encode_local, encode_utc};
use crate::domain::{Appointment, AppointmentStatus, NewAppointment};

const COLUMNS: &str = "id, user_id, staff_id, scheduled_at, status, notes, created_at, updated_at";

struct AppointmentRow {
    id: String,
    user_id: i64,
    staff_id: i64,
    scheduled_at: String,
    status: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl AppointmentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            staff_id: row.get(2)?,
            scheduled_at: row.get(3)?,
            status: row.get(4)?,
            notes: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = StoreError;

    fn try_from(row: AppointmentRow) -> StoreResult<Self> {
        Ok(Appointment {
            id: Uuid::parse_str(&row.id).map_err(|_| StoreError::invalid("id", &row.id))?,
            user_id: row.user_id,
            staff_id: row.staff_id,
            scheduled_at: decode_local("scheduled_at", &row.scheduled_at)?,
            status: row
                .status
                .parse::<AppointmentStatus>()
                .map_err(|_| StoreError::invalid("status", &row.status))?,
            notes: row.notes,
            created_at: decode_utc("created_at", &row.created_at)?,
            updated_at: decode_utc("updated_at", &row.updated_at)?,
        })
    }
}

fn collect(rows: Vec<AppointmentRow>) -> StoreResult<Vec<Appointment>> {
    rows.into_iter().map(Appointment::try_from).collect()
}

pub(super) fn insert(conn: &Connection, user_id: i64, new: &NewAppointment) -> StoreResult<Appointment> {
    let id = Uuid::new_v4();
    let now = encode_utc(Utc::now());

    conn.execute(
        "INSERT INTO appointments (id, user_id, staff_id, scheduled_at, status, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            id.to_string(),
            user_id,
            new.staff_id,
            encode_local(new.scheduled_at),
            AppointmentStatus::Booked.as_str(),
            new.notes,
            now,
        ],
    )?;

    get_for_user(conn, user_id, id)
}

pub(super) fn get_for_user(conn: &Connection, user_id: i64, id: Uuid) -> StoreResult<Appointment> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM appointments WHERE id = ?1 AND user_id = ?2"),
        params![id.to_string(), user_id],
        AppointmentRow::from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("Appointment", id))?
    .try_into()
}

pub(super) fn list_for_user(
    conn: &Connection,
    user_id: i64,
    include_cancelled: bool,
) -> StoreResult<Vec<Appointment>> {
    let sql = if include_cancelled {
        format!("SELECT {COLUMNS} FROM appointments WHERE user_id = ?1 ORDER BY scheduled_at ASC")
    } else {
        format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE user_id = ?1 AND status != 'cancelled'
             ORDER BY scheduled_at ASC"
        )
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![user_id], AppointmentRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    collect(rows)
}

/// Cancelling an already cancelled appointment leaves it as is
pub(super) fn cancel(conn: &Connection, user_id: i64, id: Uuid) -> StoreResult<Appointment> {
    let current = get_for_user(conn, user_id, id)?;
    if current.status == AppointmentStatus::Cancelled {
        return Ok(current);
    }

    set_status(conn, id, AppointmentStatus::Cancelled, current.scheduled_at)?;
    get_for_user(conn, user_id, id)
}

pub(super) fn reschedule(
    conn: &Connection,
    user_id: i64,
    id: Uuid,
    scheduled_at: NaiveDateTime,
) -> StoreResult<Appointment> {
    let current = get_for_user(conn, user_id, id)?;
    if current.status == AppointmentStatus::Cancelled {
        return Err(StoreError::Conflict(format!(
            "appointment {} is cancelled and cannot be rescheduled",
            id
        )));
    }

    set_status(conn, id, AppointmentStatus::Rescheduled, scheduled_at)?;
    get_for_user(conn, user_id, id)
}

fn set_status(
    conn: &Connection,
    id: Uuid,
    status: AppointmentStatus,
    scheduled_at: NaiveDateTime,
) -> StoreResult<()> {
    conn.execute(
        "UPDATE appointments SET status = ?1, scheduled_at = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            status.as_str(),
            encode_local(scheduled_at),
            encode_utc(Utc::now()),
            id.to_string(),
        ],
    )?;
    Ok(())
}

pub(super) fn next_after(
    conn: &Connection,
    user_id: i64,
    now: NaiveDateTime,
) -> StoreResult<Option<Appointment>> {
    conn.query_row(
        &format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE user_id = ?1 AND status != 'cancelled' AND scheduled_at > ?2
             ORDER BY scheduled_at ASC LIMIT 1"
        ),
        params![user_id, encode_local(now)],
        AppointmentRow::from_row,
    )
    .optional()?
    .map(Appointment::try_from)
    .transpose()
}
