//! Per-user contact list, populated by friend-code lookups.

use chrono::{DateTime, Utc};
use rusqlite::params;

use kirala_shared::{FriendCode, UserId};

use crate::database::Database;
use crate::error::Result;
use crate::models::Friend;
use crate::watch::Collection;

impl Database {
    /// Record a contact.  Re-adding the same pair overwrites the
    /// denormalized fields.
    pub fn add_friend(&self, friend: &Friend) -> Result<()> {
        self.conn().execute(
            "INSERT INTO friends (owner_id, friend_id, display_name, photo_url, friend_code,
                                  added_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(owner_id, friend_id) DO UPDATE SET
                display_name = excluded.display_name,
                photo_url    = excluded.photo_url,
                friend_code  = excluded.friend_code",
            params![
                friend.owner_id.as_str(),
                friend.friend_id.as_str(),
                friend.display_name,
                friend.photo_url,
                friend.friend_code.as_str(),
                friend.added_at.to_rfc3339(),
            ],
        )?;

        self.notify(Collection::Friends, Some(friend.owner_id.to_string()));
        Ok(())
    }

    /// Whether `friend` is already in `owner`'s contact list.
    pub fn friend_exists(&self, owner: &UserId, friend: &UserId) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM friends WHERE owner_id = ?1 AND friend_id = ?2",
            params![owner.as_str(), friend.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// `owner`'s contacts, most recently added first.
    pub fn list_friends(&self, owner: &UserId) -> Result<Vec<Friend>> {
        let mut stmt = self.conn().prepare(
            "SELECT owner_id, friend_id, display_name, photo_url, friend_code, added_at
             FROM friends
             WHERE owner_id = ?1
             ORDER BY added_at DESC",
        )?;

        let rows = stmt.query_map(params![owner.as_str()], row_to_friend)?;

        let mut friends = Vec::new();
        for row in rows {
            friends.push(row?);
        }
        Ok(friends)
    }
}

fn row_to_friend(row: &rusqlite::Row<'_>) -> rusqlite::Result<Friend> {
    let code_str: String = row.get(4)?;
    let added_str: String = row.get(5)?;

    let friend_code = FriendCode::parse(&code_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let added_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&added_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Friend {
        owner_id: UserId(row.get(0)?),
        friend_id: UserId(row.get(1)?),
        display_name: row.get(2)?,
        photo_url: row.get(3)?,
        friend_code,
        added_at,
    })
}
