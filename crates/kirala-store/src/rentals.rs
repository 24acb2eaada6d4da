//! Rental records and the transactions that move them through their
//! lifecycle.
//!
//! Renting is the one place the store touches two documents at once: the
//! rental insert and the toy's availability flip commit together, and the
//! toy update carries an `is_available = 1` predicate so a concurrent renter
//! loses cleanly instead of double-booking.

use chrono::{DateTime, Utc};
use rusqlite::params;

use kirala_shared::{PaymentMethod, RentalId, RentalStatus, ToyId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Rental;
use crate::watch::Collection;

/// Result of a status transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition was applied.
    Applied,
    /// The rental was already past the source state; nothing changed.
    Ignored(RentalStatus),
}

const RENTAL_COLUMNS: &str = "id, toy_id, toy_name, renter_id, owner_id, days, total_price,
                              payment_method, sender_name, sender_bank, card_last_four, status,
                              created_at, approved_at, returned_at";

impl Database {
    // ------------------------------------------------------------------
    // Initiate
    // ------------------------------------------------------------------

    /// Record a new rental and take the toy off the market, atomically.
    ///
    /// The toy flip is compare-and-swap guarded: if another renter got there
    /// first (or the owner withdrew the listing) the whole transaction rolls
    /// back with [`StoreError::ToyUnavailable`].
    pub fn rent_toy(&self, rental: &Rental) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;

        let flipped = tx.execute(
            "UPDATE toys SET is_available = 0, rented_by = ?2, rented_at = ?3
             WHERE id = ?1 AND is_available = 1",
            params![
                rental.toy_id.to_string(),
                rental.renter_id.as_str(),
                rental.created_at.to_rfc3339(),
            ],
        )?;

        if flipped == 0 {
            let exists: bool = tx
                .query_row(
                    "SELECT COUNT(*) FROM toys WHERE id = ?1",
                    params![rental.toy_id.to_string()],
                    |row| row.get::<_, i64>(0).map(|n| n > 0),
                )
                .unwrap_or(false);
            return Err(if exists {
                StoreError::ToyUnavailable
            } else {
                StoreError::NotFound
            });
        }

        tx.execute(
            "INSERT INTO rentals (id, toy_id, toy_name, renter_id, owner_id, days, total_price,
                                  payment_method, sender_name, sender_bank, card_last_four,
                                  status, created_at, approved_at, returned_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                rental.id.to_string(),
                rental.toy_id.to_string(),
                rental.toy_name,
                rental.renter_id.as_str(),
                rental.owner_id.as_str(),
                rental.days,
                rental.total_price as i64,
                rental.payment_method.as_str(),
                rental.sender_name,
                rental.sender_bank,
                rental.card_last_four,
                rental.status.as_str(),
                rental.created_at.to_rfc3339(),
                rental.approved_at.map(|t| t.to_rfc3339()),
                rental.returned_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        tx.commit()?;

        tracing::info!(
            rental = %rental.id,
            toy = %rental.toy_id,
            renter = %rental.renter_id,
            "toy rented, waiting for owner approval"
        );

        self.notify(Collection::Toys, Some(rental.toy_id.to_string()));
        self.notify(Collection::Rentals, Some(rental.id.to_string()));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Approve
    // ------------------------------------------------------------------

    /// `waiting_approval -> active`.  Re-clears the toy's availability as a
    /// belt-and-braces write; approving an already-active rental is a no-op
    /// reported through the outcome.
    pub fn approve_rental(
        &self,
        id: RentalId,
        approved_at: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        let tx = self.conn().unchecked_transaction()?;

        let affected = tx.execute(
            "UPDATE rentals SET status = ?2, approved_at = ?3
             WHERE id = ?1 AND status = ?4",
            params![
                id.to_string(),
                RentalStatus::Active.as_str(),
                approved_at.to_rfc3339(),
                RentalStatus::WaitingApproval.as_str(),
            ],
        )?;

        if affected == 0 {
            let status = rental_status(&tx, id)?;
            return Ok(TransitionOutcome::Ignored(status));
        }

        tx.execute(
            "UPDATE toys SET is_available = 0
             WHERE id = (SELECT toy_id FROM rentals WHERE id = ?1)",
            params![id.to_string()],
        )?;

        tx.commit()?;

        tracing::info!(rental = %id, "rental approved");

        self.notify(Collection::Rentals, Some(id.to_string()));
        Ok(TransitionOutcome::Applied)
    }

    // ------------------------------------------------------------------
    // Complete
    // ------------------------------------------------------------------

    /// `active -> completed`.  Restores the toy to the market and clears the
    /// renter fields in the same transaction.
    pub fn complete_rental(
        &self,
        id: RentalId,
        returned_at: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        let tx = self.conn().unchecked_transaction()?;

        let affected = tx.execute(
            "UPDATE rentals SET status = ?2, returned_at = ?3
             WHERE id = ?1 AND status = ?4",
            params![
                id.to_string(),
                RentalStatus::Completed.as_str(),
                returned_at.to_rfc3339(),
                RentalStatus::Active.as_str(),
            ],
        )?;

        if affected == 0 {
            let status = rental_status(&tx, id)?;
            return Ok(TransitionOutcome::Ignored(status));
        }

        tx.execute(
            "UPDATE toys SET is_available = 1, rented_by = NULL, rented_at = NULL
             WHERE id = (SELECT toy_id FROM rentals WHERE id = ?1)",
            params![id.to_string()],
        )?;

        tx.commit()?;

        tracing::info!(rental = %id, "rental completed, toy back on the market");

        self.notify(Collection::Rentals, Some(id.to_string()));
        self.notify(Collection::Toys, None);
        Ok(TransitionOutcome::Applied)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single rental by id.
    pub fn get_rental(&self, id: RentalId) -> Result<Rental> {
        self.conn()
            .query_row(
                &format!("SELECT {RENTAL_COLUMNS} FROM rentals WHERE id = ?1"),
                params![id.to_string()],
                row_to_rental,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Rentals the user initiated, newest first.
    pub fn list_rentals_for_renter(&self, renter: &UserId) -> Result<Vec<Rental>> {
        self.query_rentals(
            &format!(
                "SELECT {RENTAL_COLUMNS} FROM rentals WHERE renter_id = ?1
                 ORDER BY created_at DESC"
            ),
            params![renter.as_str()],
        )
    }

    /// Rentals against the user's listings, newest first.
    pub fn list_rentals_for_owner(&self, owner: &UserId) -> Result<Vec<Rental>> {
        self.query_rentals(
            &format!(
                "SELECT {RENTAL_COLUMNS} FROM rentals WHERE owner_id = ?1
                 ORDER BY created_at DESC"
            ),
            params![owner.as_str()],
        )
    }

    /// Incoming requests: rentals on the user's listings still waiting for
    /// their approval.
    pub fn list_pending_for_owner(&self, owner: &UserId) -> Result<Vec<Rental>> {
        self.query_rentals(
            &format!(
                "SELECT {RENTAL_COLUMNS} FROM rentals WHERE owner_id = ?1 AND status = ?2
                 ORDER BY created_at DESC"
            ),
            params![owner.as_str(), RentalStatus::WaitingApproval.as_str()],
        )
    }

    /// All currently active rentals (input to the expiry sweep).
    pub fn list_active_rentals(&self) -> Result<Vec<Rental>> {
        self.query_rentals(
            &format!(
                "SELECT {RENTAL_COLUMNS} FROM rentals WHERE status = ?1
                 ORDER BY created_at ASC"
            ),
            params![RentalStatus::Active.as_str()],
        )
    }

    fn query_rentals(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Rental>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(args, row_to_rental)?;

        let mut rentals = Vec::new();
        for row in rows {
            rentals.push(row?);
        }
        Ok(rentals)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rental_status(conn: &rusqlite::Connection, id: RentalId) -> Result<RentalStatus> {
    let status_str: String = conn
        .query_row(
            "SELECT status FROM rentals WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Sqlite(other),
        })?;

    status_str
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("rental status: {status_str}")))
}

/// Map a `rusqlite::Row` to a [`Rental`].  Column order must match
/// [`RENTAL_COLUMNS`].
fn row_to_rental(row: &rusqlite::Row<'_>) -> rusqlite::Result<Rental> {
    let id_str: String = row.get(0)?;
    let toy_id_str: String = row.get(1)?;
    let payment_str: String = row.get(7)?;
    let status_str: String = row.get(11)?;
    let created_str: String = row.get(12)?;
    let approved_str: Option<String> = row.get(13)?;
    let returned_str: Option<String> = row.get(14)?;

    let id = uuid::Uuid::parse_str(&id_str).map_err(|e| conversion(0, e))?;
    let toy_id = uuid::Uuid::parse_str(&toy_id_str).map_err(|e| conversion(1, e))?;

    let payment_method: PaymentMethod = payment_str.parse().map_err(|e| conversion(7, e))?;
    let status: RentalStatus = status_str.parse().map_err(|e| conversion(11, e))?;

    let created_at = parse_ts(&created_str).map_err(|e| conversion(12, e))?;
    let approved_at = approved_str
        .as_deref()
        .map(parse_ts)
        .transpose()
        .map_err(|e| conversion(13, e))?;
    let returned_at = returned_str
        .as_deref()
        .map(parse_ts)
        .transpose()
        .map_err(|e| conversion(14, e))?;

    let total_price: i64 = row.get(6)?;

    Ok(Rental {
        id: RentalId(id),
        toy_id: ToyId(toy_id),
        toy_name: row.get(2)?,
        renter_id: UserId(row.get(3)?),
        owner_id: UserId(row.get(4)?),
        days: row.get(5)?,
        total_price: total_price as u64,
        payment_method,
        sender_name: row.get(8)?,
        sender_bank: row.get(9)?,
        card_last_four: row.get(10)?,
        status,
        created_at,
        approved_at,
        returned_at,
    })
}

fn parse_ts(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
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

    fn rental_for(toy: &crate::models::Toy, renter: &str, days: u32) -> Rental {
        Rental {
            id: RentalId::new(),
            toy_id: toy.id,
            toy_name: toy.name.clone(),
            renter_id: UserId::from(renter),
            owner_id: toy.owner_id.clone(),
            days,
            total_price: toy.price_per_day as u64 * days as u64,
            payment_method: PaymentMethod::Eft,
            sender_name: Some("Mehmet Yılmaz".to_string()),
            sender_bank: Some("Ziraat".to_string()),
            card_last_four: None,
            status: RentalStatus::WaitingApproval,
            created_at: Utc::now(),
            approved_at: None,
            returned_at: None,
        }
    }

    #[test]
    fn rent_flips_toy_and_records_rental() {
        let (_dir, db) = open_db();
        let toy = sample_toy("uid-owner", "Ahşap Tren", "İzmir");
        db.create_toy(&toy).unwrap();

        let rental = rental_for(&toy, "uid-renter", 7);
        db.rent_toy(&rental).unwrap();

        let stored_toy = db.get_toy(toy.id).unwrap();
        assert!(!stored_toy.is_available);
        assert_eq!(stored_toy.rented_by, Some(UserId::from("uid-renter")));

        let stored_rental = db.get_rental(rental.id).unwrap();
        assert_eq!(stored_rental.status, RentalStatus::WaitingApproval);
        assert_eq!(stored_rental.total_price, 350);
    }

    #[test]
    fn second_renter_loses_the_race() {
        let (_dir, db) = open_db();
        let toy = sample_toy("uid-owner", "Ahşap Tren", "İzmir");
        db.create_toy(&toy).unwrap();

        db.rent_toy(&rental_for(&toy, "uid-first", 3)).unwrap();

        let err = db.rent_toy(&rental_for(&toy, "uid-second", 3)).unwrap_err();
        assert!(matches!(err, StoreError::ToyUnavailable));

        // The losing attempt must leave no rental row behind.
        assert_eq!(db.list_rentals_for_owner(&toy.owner_id).unwrap().len(), 1);
    }

    #[test]
    fn renting_missing_toy_is_not_found() {
        let (_dir, db) = open_db();
        let toy = sample_toy("uid-owner", "Hayalet", "İzmir");
        // never inserted
        let err = db.rent_toy(&rental_for(&toy, "uid-renter", 1)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn approval_is_idempotent() {
        let (_dir, db) = open_db();
        let toy = sample_toy("uid-owner", "Ahşap Tren", "İzmir");
        db.create_toy(&toy).unwrap();
        let rental = rental_for(&toy, "uid-renter", 7);
        db.rent_toy(&rental).unwrap();

        assert_eq!(
            db.approve_rental(rental.id, Utc::now()).unwrap(),
            TransitionOutcome::Applied
        );
        assert_eq!(
            db.approve_rental(rental.id, Utc::now()).unwrap(),
            TransitionOutcome::Ignored(RentalStatus::Active)
        );

        let stored = db.get_rental(rental.id).unwrap();
        assert_eq!(stored.status, RentalStatus::Active);
        assert!(stored.approved_at.is_some());
    }

    #[test]
    fn completion_restores_the_toy() {
        let (_dir, db) = open_db();
        let toy = sample_toy("uid-owner", "Ahşap Tren", "İzmir");
        db.create_toy(&toy).unwrap();
        let rental = rental_for(&toy, "uid-renter", 7);
        db.rent_toy(&rental).unwrap();
        db.approve_rental(rental.id, Utc::now()).unwrap();

        assert_eq!(
            db.complete_rental(rental.id, Utc::now()).unwrap(),
            TransitionOutcome::Applied
        );

        let stored_toy = db.get_toy(toy.id).unwrap();
        assert!(stored_toy.is_available);
        assert_eq!(stored_toy.rented_by, None);
        assert_eq!(stored_toy.rented_at, None);

        // Completing a waiting rental is refused as a no-op too.
        let toy2 = sample_toy("uid-owner", "Lego", "İzmir");
        db.create_toy(&toy2).unwrap();
        let rental2 = rental_for(&toy2, "uid-renter", 3);
        db.rent_toy(&rental2).unwrap();
        assert_eq!(
            db.complete_rental(rental2.id, Utc::now()).unwrap(),
            TransitionOutcome::Ignored(RentalStatus::WaitingApproval)
        );
    }

    #[test]
    fn pending_list_only_shows_waiting_rentals() {
        let (_dir, db) = open_db();
        let owner = UserId::from("uid-owner");
        let toy_a = sample_toy("uid-owner", "Tren", "İzmir");
        let toy_b = sample_toy("uid-owner", "Lego", "İzmir");
        db.create_toy(&toy_a).unwrap();
        db.create_toy(&toy_b).unwrap();

        let r1 = rental_for(&toy_a, "uid-x", 3);
        let r2 = rental_for(&toy_b, "uid-y", 5);
        db.rent_toy(&r1).unwrap();
        db.rent_toy(&r2).unwrap();
        db.approve_rental(r2.id, Utc::now()).unwrap();

        let pending = db.list_pending_for_owner(&owner).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, r1.id);
    }
}
