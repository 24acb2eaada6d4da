//! CRUD operations for [`Toy`] listings.
//!
//! Availability flips (rent / return) are NOT here; they live in the rental
//! transactions so the toy and its rental record always move together.

use chrono::{DateTime, Utc};
use rusqlite::params;

use kirala_shared::{AgeRange, ToyId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Toy;
use crate::watch::Collection;

/// Partial listing edit, owner-driven.  `None` fields keep their stored
/// value.
#[derive(Debug, Clone, Default)]
pub struct ToyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub age_range: Option<AgeRange>,
    pub price_per_day: Option<u32>,
    pub categories: Option<Vec<String>>,
    pub gender: Option<kirala_shared::Gender>,
    pub image_url: Option<String>,
}

const TOY_COLUMNS: &str = "id, owner_id, name, description, city, age_range, price_per_day,
                           categories, gender, image_url, is_available, rented_by, rented_at,
                           created_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new listing.
    pub fn create_toy(&self, toy: &Toy) -> Result<()> {
        self.conn().execute(
            "INSERT INTO toys (id, owner_id, name, description, city, age_range, price_per_day,
                               categories, gender, image_url, is_available, rented_by, rented_at,
                               created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                toy.id.to_string(),
                toy.owner_id.as_str(),
                toy.name,
                toy.description,
                toy.city,
                toy.age_range.to_string(),
                toy.price_per_day,
                serde_json::to_string(&toy.categories)?,
                toy.gender.map(|g| g.as_str()),
                toy.image_url,
                toy.is_available as i32,
                toy.rented_by.as_ref().map(|u| u.as_str()),
                toy.rented_at.map(|t| t.to_rfc3339()),
                toy.created_at.to_rfc3339(),
            ],
        )?;

        self.notify(Collection::Toys, Some(toy.id.to_string()));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single listing by id.
    pub fn get_toy(&self, id: ToyId) -> Result<Toy> {
        self.conn()
            .query_row(
                &format!("SELECT {TOY_COLUMNS} FROM toys WHERE id = ?1"),
                params![id.to_string()],
                row_to_toy,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// The full catalog snapshot, newest first.
    pub fn list_toys(&self) -> Result<Vec<Toy>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {TOY_COLUMNS} FROM toys ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map([], row_to_toy)?;

        let mut toys = Vec::new();
        for row in rows {
            toys.push(row?);
        }
        Ok(toys)
    }

    /// Listings owned by `owner`, newest first.
    pub fn list_toys_owned_by(&self, owner: &UserId) -> Result<Vec<Toy>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {TOY_COLUMNS} FROM toys WHERE owner_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![owner.as_str()], row_to_toy)?;

        let mut toys = Vec::new();
        for row in rows {
            toys.push(row?);
        }
        Ok(toys)
    }

    /// Toys currently rented by `renter`, most recent rental first.
    pub fn list_toys_rented_by(&self, renter: &UserId) -> Result<Vec<Toy>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {TOY_COLUMNS} FROM toys WHERE rented_by = ?1 ORDER BY rented_at DESC"
        ))?;

        let rows = stmt.query_map(params![renter.as_str()], row_to_toy)?;

        let mut toys = Vec::new();
        for row in rows {
            toys.push(row?);
        }
        Ok(toys)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Merge-write an owner edit.
    pub fn update_toy(&self, id: ToyId, update: &ToyUpdate) -> Result<()> {
        let categories_json = update
            .categories
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let affected = self.conn().execute(
            "UPDATE toys SET
                name          = COALESCE(?2, name),
                description   = COALESCE(?3, description),
                city          = COALESCE(?4, city),
                age_range     = COALESCE(?5, age_range),
                price_per_day = COALESCE(?6, price_per_day),
                categories    = COALESCE(?7, categories),
                gender        = COALESCE(?8, gender),
                image_url     = COALESCE(?9, image_url)
             WHERE id = ?1",
            params![
                id.to_string(),
                update.name,
                update.description,
                update.city,
                update.age_range.map(|r| r.to_string()),
                update.price_per_day,
                categories_json,
                update.gender.map(|g| g.as_str()),
                update.image_url,
            ],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        self.notify(Collection::Toys, Some(id.to_string()));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a listing unless it is currently rented out.  Returns `true`
    /// if a row was deleted, [`StoreError::ToyUnavailable`] if the toy
    /// exists but is rented.
    pub fn delete_toy(&self, id: ToyId) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM toys WHERE id = ?1 AND is_available = 1",
            params![id.to_string()],
        )?;

        if affected == 0 {
            // Distinguish "gone" from "rented out right now".
            let exists: bool = self
                .conn()
                .query_row(
                    "SELECT COUNT(*) FROM toys WHERE id = ?1",
                    params![id.to_string()],
                    |row| row.get::<_, i64>(0).map(|n| n > 0),
                )
                .unwrap_or(false);
            if exists {
                return Err(StoreError::ToyUnavailable);
            }
            return Ok(false);
        }

        self.notify(Collection::Toys, Some(id.to_string()));
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Toy`].  Column order must match
/// [`TOY_COLUMNS`].
pub(crate) fn row_to_toy(row: &rusqlite::Row<'_>) -> rusqlite::Result<Toy> {
    let id_str: String = row.get(0)?;
    let owner: String = row.get(1)?;
    let age_range_str: String = row.get(5)?;
    let categories_json: String = row.get(7)?;
    let gender_str: Option<String> = row.get(8)?;
    let is_available_int: i32 = row.get(10)?;
    let rented_by: Option<String> = row.get(11)?;
    let rented_at_str: Option<String> = row.get(12)?;
    let created_str: String = row.get(13)?;

    let id = uuid::Uuid::parse_str(&id_str).map_err(|e| conversion(0, e))?;

    let age_range: AgeRange = age_range_str.parse().map_err(|e| conversion(5, e))?;

    let categories: Vec<String> =
        serde_json::from_str(&categories_json).map_err(|e| conversion(7, e))?;

    let gender = gender_str
        .map(|g| g.parse())
        .transpose()
        .map_err(|e| conversion(8, e))?;

    let rented_at = rented_at_str
        .map(|ts| DateTime::parse_from_rfc3339(&ts).map(|dt| dt.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| conversion(12, e))?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion(13, e))?;

    Ok(Toy {
        id: ToyId(id),
        owner_id: UserId(owner),
        name: row.get(2)?,
        description: row.get(3)?,
        city: row.get(4)?,
        age_range,
        price_per_day: row.get(6)?,
        categories,
        gender,
        image_url: row.get(9)?,
        is_available: is_available_int != 0,
        rented_by: rented_by.map(UserId),
        rented_at,
        created_at,
    })
}

fn conversion<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{open_db, sample_toy};

    #[test]
    fn create_get_round_trip() {
        let (_dir, db) = open_db();
        let toy = sample_toy("uid-owner", "Ahşap Tren Seti", "İzmir");
        db.create_toy(&toy).unwrap();

        let stored = db.get_toy(toy.id).unwrap();
        assert_eq!(stored, toy);
    }

    #[test]
    fn list_is_newest_first() {
        let (_dir, db) = open_db();
        let mut older = sample_toy("uid-owner", "Eski", "İzmir");
        older.created_at = Utc::now() - chrono::Duration::hours(2);
        let newer = sample_toy("uid-owner", "Yeni", "İzmir");
        db.create_toy(&older).unwrap();
        db.create_toy(&newer).unwrap();

        let toys = db.list_toys().unwrap();
        assert_eq!(toys[0].name, "Yeni");
        assert_eq!(toys[1].name, "Eski");
    }

    #[test]
    fn partial_update_preserves_other_fields() {
        let (_dir, db) = open_db();
        let toy = sample_toy("uid-owner", "Lego Kutusu", "Ankara");
        db.create_toy(&toy).unwrap();

        db.update_toy(
            toy.id,
            &ToyUpdate {
                price_per_day: Some(75),
                ..Default::default()
            },
        )
        .unwrap();

        let stored = db.get_toy(toy.id).unwrap();
        assert_eq!(stored.price_per_day, 75);
        assert_eq!(stored.name, "Lego Kutusu");
        assert_eq!(stored.city, "Ankara");
    }

    #[test]
    fn delete_refuses_rented_toy() {
        let (_dir, db) = open_db();
        let mut toy = sample_toy("uid-owner", "Peluş Ayı", "İzmir");
        toy.is_available = false;
        toy.rented_by = Some(UserId::from("uid-renter"));
        db.create_toy(&toy).unwrap();

        let err = db.delete_toy(toy.id).unwrap_err();
        assert!(matches!(err, StoreError::ToyUnavailable));

        // Missing toys report false, not an error.
        assert!(!db.delete_toy(ToyId::new()).unwrap());
    }
}
