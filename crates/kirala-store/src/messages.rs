//! Message persistence and windowed reads.

use chrono::{DateTime, Utc};
use rusqlite::params;

use kirala_shared::{MessageId, RoomId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Message;
use crate::watch::Collection;

/// Last-message caption shown in room lists for image-only messages.
const IMAGE_CAPTION: &str = "📷 Fotoğraf";

impl Database {
    /// Append a message and refresh the room's last-message cache in the
    /// same transaction.
    pub fn append_message(&self, message: &Message) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;

        let caption = match message.text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => IMAGE_CAPTION,
        };

        // Refresh the cache first: zero affected rows means the room was
        // never opened, and the whole append is refused before the insert.
        let affected = tx.execute(
            "UPDATE rooms SET last_message = ?2, updated_at = ?3 WHERE id = ?1",
            params![
                message.room_id.as_str(),
                caption,
                message.created_at.to_rfc3339(),
            ],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        tx.execute(
            "INSERT INTO messages (id, room_id, sender_id, sender_name, sender_photo_url,
                                   text, image_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                message.id.to_string(),
                message.room_id.as_str(),
                message.sender_id.as_str(),
                message.sender_name,
                message.sender_photo_url,
                message.text,
                message.image_url,
                message.created_at.to_rfc3339(),
            ],
        )?;

        tx.commit()?;

        self.notify(Collection::Messages, Some(message.room_id.to_string()));
        self.notify(Collection::Rooms, Some(message.room_id.to_string()));
        Ok(())
    }

    /// A window of a room's history, oldest first.
    pub fn list_messages(&self, room: &RoomId, limit: u32, offset: u32) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, room_id, sender_id, sender_name, sender_photo_url, text, image_url,
                    created_at
             FROM messages
             WHERE room_id = ?1
             ORDER BY created_at ASC
             LIMIT ?2 OFFSET ?3",
        )?;

        let rows = stmt.query_map(params![room.as_str(), limit, offset], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let created_str: String = row.get(7)?;

    let id = uuid::Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Message {
        id: MessageId(id),
        room_id: RoomId(row.get(1)?),
        sender_id: UserId(row.get(2)?),
        sender_name: row.get(3)?,
        sender_photo_url: row.get(4)?,
        text: row.get(5)?,
        image_url: row.get(6)?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::Room;
    use crate::test_support::open_db;

    fn seed_room(db: &Database) -> RoomId {
        let a = UserId::from("uid-anna");
        let b = UserId::from("uid-berk");
        let id = RoomId::between(&a, &b);
        db.upsert_room(&Room {
            id: id.clone(),
            participant_a: a,
            participant_b: b,
            toy_id: None,
            toy_name: None,
            last_message: None,
            updated_at: Utc::now(),
        })
        .unwrap();
        id
    }

    fn text_message(room: &RoomId, n: u32, at: DateTime<Utc>) -> Message {
        Message {
            id: MessageId::new(),
            room_id: room.clone(),
            sender_id: UserId::from("uid-anna"),
            sender_name: "Anna".to_string(),
            sender_photo_url: None,
            text: Some(format!("mesaj {n}")),
            image_url: None,
            created_at: at,
        }
    }

    #[test]
    fn windowed_reads_are_oldest_first() {
        let (_dir, db) = open_db();
        let room = seed_room(&db);

        let base = Utc::now();
        for n in 0..5 {
            db.append_message(&text_message(&room, n, base + Duration::seconds(n as i64)))
                .unwrap();
        }

        let first_two = db.list_messages(&room, 2, 0).unwrap();
        assert_eq!(first_two.len(), 2);
        assert_eq!(first_two[0].text.as_deref(), Some("mesaj 0"));

        let next_two = db.list_messages(&room, 2, 2).unwrap();
        assert_eq!(next_two[0].text.as_deref(), Some("mesaj 2"));
        assert_eq!(next_two[1].text.as_deref(), Some("mesaj 3"));
    }

    #[test]
    fn append_updates_room_last_message() {
        let (_dir, db) = open_db();
        let room = seed_room(&db);

        db.append_message(&text_message(&room, 1, Utc::now())).unwrap();
        assert_eq!(
            db.get_room(&room).unwrap().last_message.as_deref(),
            Some("mesaj 1")
        );

        // Image-only messages cache a caption instead of empty text.
        let mut image = text_message(&room, 2, Utc::now());
        image.text = None;
        image.image_url = Some("kirala://chat_images/x/1_foto.jpg".to_string());
        db.append_message(&image).unwrap();
        assert_eq!(
            db.get_room(&room).unwrap().last_message.as_deref(),
            Some(IMAGE_CAPTION)
        );
    }

    #[test]
    fn message_for_unknown_room_is_refused() {
        let (_dir, db) = open_db();
        let ghost = RoomId::between(&UserId::from("a"), &UserId::from("b"));
        let err = db
            .append_message(&text_message(&ghost, 1, Utc::now()))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
