//! Domain model structs persisted in the local SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer.  Consistency between documents (e.g. a toy's
//! `rented_by` and its rental record) is advisory and maintained by the
//! store's transactional helpers, not by foreign-key enforcement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kirala_shared::{
    AgeRange, FriendCode, Gender, MessageId, PaymentMethod, RentalId, RentalStatus, RoomId, ToyId,
    UserId,
};

// ---------------------------------------------------------------------------
// User profile
// ---------------------------------------------------------------------------

/// A marketplace user.  The primary key is the opaque id issued by the
/// identity provider; the friend code is the human-shareable lookup handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    /// Home city; drives the catalog's same-city bucketing.
    pub city: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    /// IBAN rent payouts are wired to.  Attestation only, never charged.
    pub payout_iban: Option<String>,
    pub friend_code: FriendCode,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Toy (listing)
// ---------------------------------------------------------------------------

/// A toy listed for rental.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Toy {
    pub id: ToyId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub city: String,
    pub age_range: AgeRange,
    /// Price in TL per rental day.
    pub price_per_day: u32,
    /// Free-form category tags; empty is treated as the fallback category.
    pub categories: Vec<String>,
    pub gender: Option<Gender>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub rented_by: Option<UserId>,
    pub rented_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Rental
// ---------------------------------------------------------------------------

/// One rental of one toy, together with the payment attestation.
///
/// Append-only apart from the two status transitions
/// (`waiting_approval -> active -> completed`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rental {
    pub id: RentalId,
    pub toy_id: ToyId,
    pub toy_name: String,
    pub renter_id: UserId,
    pub owner_id: UserId,
    pub days: u32,
    /// `price_per_day * days`, computed at initiation.
    pub total_price: u64,
    pub payment_method: PaymentMethod,
    /// Name the renter claims the bank transfer was sent under.
    pub sender_name: Option<String>,
    pub sender_bank: Option<String>,
    pub card_last_four: Option<String>,
    pub status: RentalStatus,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A 1:1 chat room.  `participant_a` is the lexicographically lower user id
/// so the pair matches the derived [`RoomId`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub participant_a: UserId,
    pub participant_b: UserId,
    pub toy_id: Option<ToyId>,
    pub toy_name: Option<String>,
    pub last_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// The participant that is not `me`, if `me` is in the room at all.
    pub fn other_participant(&self, me: &UserId) -> Option<&UserId> {
        if &self.participant_a == me {
            Some(&self.participant_b)
        } else if &self.participant_b == me {
            Some(&self.participant_a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.  Carries text, an image URL, or both; the client
/// refuses fully empty messages, the schema does not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub sender_photo_url: Option<String>,
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Friend
// ---------------------------------------------------------------------------

/// A contact added through a friend-code lookup, denormalized for list
/// rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Friend {
    pub owner_id: UserId,
    pub friend_id: UserId,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub friend_code: FriendCode,
    pub added_at: DateTime<Utc>,
}
