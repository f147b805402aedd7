//! `staff` table

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::StoreResult;
use crate::domain::Staff;

fn from_row(row: &Row<'_>) -> rusqlite::Result<Staff> {
    Ok(Staff {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        rating: row.get(3)?,
        specialty: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        image_url: row.get(7)?,
    })
}

pub(super) fn list(conn: &Connection) -> StoreResult<Vec<Staff>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, role, rating, specialty, email, phone, image_url
         FROM staff ORDER BY name ASC",
    )?;
    let staff = stmt
        .query_map([], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(staff)
}

pub(super) fn get(conn: &Connection, id: i64) -> StoreResult<Option<Staff>> {
    let staff = conn
        .query_row(
            "SELECT id, name, role, rating, specialty, email, phone, image_url
             FROM staff WHERE id = ?1",
            params![id],
            from_row,
        )
        .optional()?;
    Ok(staff)
}

pub(super) fn seed(conn: &mut Connection, directory: &[Staff]) -> StoreResult<usize> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM staff", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO staff (id, name, role, rating, specialty, email, phone, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for member in directory {
            stmt.execute(params![
                member.id,
                member.name,
                member.role,
                member.rating,
                member.specialty,
                member.email,
                member.phone,
                member.image_url,
            ])?;
        }
    }
    tx.commit()?;

    tracing::info!(count = directory.len(), "Seeded staff directory");
    Ok(directory.len())
}
