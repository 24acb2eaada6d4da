//! # kirala-shared
//!
//! Pure domain types for the Oyna-Kirala toy rental marketplace: typed
//! identifiers, the rental status enumeration, age ranges, friend codes and
//! the domain constants every other crate agrees on.
//!
//! Nothing in this crate performs I/O; everything is unit-testable in
//! isolation.

pub mod constants;
pub mod error;
pub mod friend_code;
pub mod types;

pub use error::DomainError;
pub use friend_code::FriendCode;
pub use types::{
    AgeRange, Gender, MessageId, PaymentMethod, RentalId, RentalStatus, RoomId, ToyId, UserId,
};
