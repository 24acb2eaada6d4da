//! CRUD operations for [`Room`] records.
//!
//! Rooms are keyed by the sorted participant pair, so "start chat" is an
//! upsert: the first contact creates the row, every later one merges into
//! it.  Fields absent from the upsert keep their stored value, matching the
//! merge-write the original client relied on.

use chrono::{DateTime, Utc};
use rusqlite::params;

use kirala_shared::{RoomId, ToyId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Room;
use crate::watch::Collection;

impl Database {
    /// Create the room or merge into the existing one.
    pub fn upsert_room(&self, room: &Room) -> Result<()> {
        self.conn().execute(
            "INSERT INTO rooms (id, participant_a, participant_b, toy_id, toy_name,
                                last_message, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                toy_id       = COALESCE(excluded.toy_id, toy_id),
                toy_name     = COALESCE(excluded.toy_name, toy_name),
                last_message = COALESCE(excluded.last_message, last_message),
                updated_at   = excluded.updated_at",
            params![
                room.id.as_str(),
                room.participant_a.as_str(),
                room.participant_b.as_str(),
                room.toy_id.map(|t| t.to_string()),
                room.toy_name,
                room.last_message,
                room.updated_at.to_rfc3339(),
            ],
        )?;

        self.notify(Collection::Rooms, Some(room.id.to_string()));
        Ok(())
    }

    /// Fetch a single room by id.
    pub fn get_room(&self, id: &RoomId) -> Result<Room> {
        self.conn()
            .query_row(
                "SELECT id, participant_a, participant_b, toy_id, toy_name, last_message,
                        updated_at
                 FROM rooms
                 WHERE id = ?1",
                params![id.as_str()],
                row_to_room,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Rooms the user participates in, most recently active first.
    pub fn list_rooms_for_user(&self, user: &UserId) -> Result<Vec<Room>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, participant_a, participant_b, toy_id, toy_name, last_message,
                    updated_at
             FROM rooms
             WHERE participant_a = ?1 OR participant_b = ?1
             ORDER BY updated_at DESC",
        )?;

        let rows = stmt.query_map(params![user.as_str()], row_to_room)?;

        let mut rooms = Vec::new();
        for row in rows {
            rooms.push(row?);
        }
        Ok(rooms)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Room`].
fn row_to_room(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
    let toy_id_str: Option<String> = row.get(3)?;
    let updated_str: String = row.get(6)?;

    let toy_id = toy_id_str
        .map(|s| uuid::Uuid::parse_str(&s))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?
        .map(ToyId);

    let updated_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&updated_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Room {
        id: RoomId(row.get(0)?),
        participant_a: UserId(row.get(1)?),
        participant_b: UserId(row.get(2)?),
        toy_id,
        toy_name: row.get(4)?,
        last_message: row.get(5)?,
        updated_at,
    })
}
