//! Single-row client-local settings document.
//!
//! The only durable client-side state outside the collections: a JSON blob
//! the application layer deserializes into its own settings struct.

use rusqlite::params;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Read the raw settings JSON, `None` when never written.
    pub fn get_settings_json(&self) -> Result<Option<String>> {
        let result = self
            .conn()
            .query_row("SELECT json FROM app_settings WHERE id = 1", [], |row| {
                row.get::<_, String>(0)
            });

        match result {
            Ok(json) => Ok(Some(json)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the settings JSON.
    pub fn put_settings_json(&self, json: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO app_settings (id, json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::open_db;

    #[test]
    fn settings_round_trip() {
        let (_dir, db) = open_db();
        assert_eq!(db.get_settings_json().unwrap(), None);

        db.put_settings_json(r#"{"onboardingSeen":true}"#).unwrap();
        assert_eq!(
            db.get_settings_json().unwrap().as_deref(),
            Some(r#"{"onboardingSeen":true}"#)
        );
    }
}
