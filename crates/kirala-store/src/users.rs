//! CRUD operations for [`UserProfile`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;

use kirala_shared::{FriendCode, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::UserProfile;
use crate::watch::Collection;

/// Partial profile edit.  `None` fields keep their stored value, so a save
/// from one screen never clobbers fields it did not show (merge-write
/// semantics).
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub city: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<kirala_shared::Gender>,
    pub payout_iban: Option<String>,
}

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new profile.  Fails with [`StoreError::FriendCodeTaken`]
    /// when the randomly drawn code collides; the caller regenerates and
    /// retries.
    pub fn create_user_profile(&self, profile: &UserProfile) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, display_name, email, phone, photo_url, city, age,
                                    gender, payout_iban, friend_code, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    profile.id.as_str(),
                    profile.display_name,
                    profile.email,
                    profile.phone,
                    profile.photo_url,
                    profile.city,
                    profile.age,
                    profile.gender.map(|g| g.as_str()),
                    profile.payout_iban,
                    profile.friend_code.as_str(),
                    profile.created_at.to_rfc3339(),
                ],
            )
            .map_err(map_unique_friend_code)?;

        self.notify(Collection::Users, Some(profile.id.to_string()));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single profile by user id.
    pub fn get_user(&self, id: &UserId) -> Result<UserProfile> {
        self.conn()
            .query_row(
                "SELECT id, display_name, email, phone, photo_url, city, age,
                        gender, payout_iban, friend_code, created_at
                 FROM users
                 WHERE id = ?1",
                params![id.as_str()],
                row_to_profile,
            )
            .map_err(not_found)
    }

    /// Resolve a friend code to the profile carrying it.
    pub fn get_user_by_friend_code(&self, code: &FriendCode) -> Result<UserProfile> {
        self.conn()
            .query_row(
                "SELECT id, display_name, email, phone, photo_url, city, age,
                        gender, payout_iban, friend_code, created_at
                 FROM users
                 WHERE friend_code = ?1",
                params![code.as_str()],
                row_to_profile,
            )
            .map_err(not_found)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Merge-write a profile edit: only fields present in `update` touch the
    /// row.
    pub fn update_user_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE users SET
                display_name = COALESCE(?2, display_name),
                email        = COALESCE(?3, email),
                phone        = COALESCE(?4, phone),
                photo_url    = COALESCE(?5, photo_url),
                city         = COALESCE(?6, city),
                age          = COALESCE(?7, age),
                gender       = COALESCE(?8, gender),
                payout_iban  = COALESCE(?9, payout_iban)
             WHERE id = ?1",
            params![
                id.as_str(),
                update.display_name,
                update.email,
                update.phone,
                update.photo_url,
                update.city,
                update.age,
                update.gender.map(|g| g.as_str()),
                update.payout_iban,
            ],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        self.notify(Collection::Users, Some(id.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Sqlite(other),
    }
}

fn map_unique_friend_code(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, Some(msg))
            if err.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains("users.friend_code") =>
        {
            StoreError::FriendCodeTaken
        }
        _ => StoreError::Sqlite(e),
    }
}

/// Map a `rusqlite::Row` to a [`UserProfile`].
fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserProfile> {
    let id: String = row.get(0)?;
    let gender_str: Option<String> = row.get(7)?;
    let code_str: String = row.get(9)?;
    let created_str: String = row.get(10)?;

    let gender = gender_str
        .map(|g| g.parse())
        .transpose()
        .map_err(|e| conversion(7, e))?;

    let friend_code = FriendCode::parse(&code_str).map_err(|e| conversion(9, e))?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion(10, e))?;

    Ok(UserProfile {
        id: UserId(id),
        display_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        photo_url: row.get(4)?,
        city: row.get(5)?,
        age: row.get(6)?,
        gender,
        payout_iban: row.get(8)?,
        friend_code,
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
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn profile(id: &str, code: &str) -> UserProfile {
        UserProfile {
            id: UserId::from(id),
            display_name: Some("Ayşe".to_string()),
            email: Some(format!("{id}@example.com")),
            phone: None,
            photo_url: None,
            city: Some("İzmir".to_string()),
            age: Some(34),
            gender: None,
            payout_iban: None,
            friend_code: FriendCode::parse(code).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn create_and_lookup_by_friend_code() {
        let (_dir, db) = open_db();
        db.create_user_profile(&profile("uid-1", "123456")).unwrap();

        let found = db
            .get_user_by_friend_code(&FriendCode::parse("123456").unwrap())
            .unwrap();
        assert_eq!(found.id, UserId::from("uid-1"));
    }

    #[test]
    fn duplicate_friend_code_is_reported_as_taken() {
        let (_dir, db) = open_db();
        db.create_user_profile(&profile("uid-1", "123456")).unwrap();

        let err = db
            .create_user_profile(&profile("uid-2", "123456"))
            .unwrap_err();
        assert!(matches!(err, StoreError::FriendCodeTaken));

        // A fresh code goes through.
        let mut rng = StdRng::seed_from_u64(1);
        let mut retry = profile("uid-2", "123456");
        retry.friend_code = FriendCode::generate(&mut rng);
        db.create_user_profile(&retry).unwrap();
    }

    #[test]
    fn merge_write_keeps_omitted_fields() {
        let (_dir, db) = open_db();
        let id = UserId::from("uid-1");
        db.create_user_profile(&profile("uid-1", "123456")).unwrap();

        db.update_user_profile(
            &id,
            &ProfileUpdate {
                phone: Some("0555 111 22 33".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let stored = db.get_user(&id).unwrap();
        assert_eq!(stored.phone.as_deref(), Some("0555 111 22 33"));
        // City was omitted from the update and must survive.
        assert_eq!(stored.city.as_deref(), Some("İzmir"));
        assert_eq!(stored.display_name.as_deref(), Some("Ayşe"));
    }

    #[test]
    fn updating_missing_profile_is_not_found() {
        let (_dir, db) = open_db();
        let err = db
            .update_user_profile(&UserId::from("ghost"), &ProfileUpdate::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
