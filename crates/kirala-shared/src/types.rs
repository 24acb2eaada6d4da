use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AgeRangeError, DomainError};

// User identity = opaque id issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ToyId(pub Uuid);

impl ToyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ToyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ToyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RentalId(pub Uuid);

impl RentalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RentalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RentalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 1:1 chat room identifier, derived from its two participants.
///
/// The id is the sorted, `_`-joined pair of user ids, so the same pair of
/// users always lands in the same room no matter who starts the chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RoomId(pub String);

impl RoomId {
    /// Derive the room id for an unordered pair of users.
    pub fn between(a: &UserId, b: &UserId) -> Self {
        let mut pair = [a.as_str(), b.as_str()];
        pair.sort_unstable();
        Self(format!("{}_{}", pair[0], pair[1]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a rental record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    WaitingApproval,
    Active,
    Completed,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingApproval => "waiting_approval",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for RentalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting_approval" => Ok(Self::WaitingApproval),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the renter claims to have paid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Manual bank transfer, attested by sender name and bank.
    Eft,
    /// Simulated card payment; only the last four digits are kept.
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eft => "eft",
            Self::Card => "card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eft" => Ok(Self::Eft),
            "card" => Ok(Self::Card),
            other => Err(DomainError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boy,
    Girl,
    Unisex,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boy => "boy",
            Self::Girl => "girl",
            Self::Unisex => "unisex",
        }
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boy" => Ok(Self::Boy),
            "girl" => Ok(Self::Girl),
            "unisex" => Ok(Self::Unisex),
            other => Err(DomainError::UnknownGender(other.to_string())),
        }
    }
}

/// An inclusive age range, displayed as `"min-max"` (e.g. `"3-6"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u8,
    pub max: u8,
}

impl AgeRange {
    pub fn new(min: u8, max: u8) -> Result<Self, AgeRangeError> {
        if min > max {
            return Err(AgeRangeError::Inverted);
        }
        Ok(Self { min, max })
    }

    /// Two ranges intersect iff `self.min <= other.max && self.max >= other.min`.
    pub fn overlaps(&self, other: &AgeRange) -> bool {
        self.min <= other.max && self.max >= other.min
    }
}

impl FromStr for AgeRange {
    type Err = AgeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s.trim().split_once('-').ok_or(AgeRangeError::Format)?;
        let min: u8 = min.trim().parse().map_err(|_| AgeRangeError::Format)?;
        let max: u8 = max.trim().parse().map_err(|_| AgeRangeError::Format)?;
        Self::new(min, max)
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_is_commutative() {
        let a = UserId::from("uid-anna");
        let b = UserId::from("uid-berk");
        assert_eq!(RoomId::between(&a, &b), RoomId::between(&b, &a));
        assert_eq!(RoomId::between(&a, &b).as_str(), "uid-anna_uid-berk");
    }

    #[test]
    fn age_range_overlap_truth_table() {
        let filter = AgeRange::new(3, 6).unwrap();
        let toy = AgeRange::new(5, 8).unwrap();
        assert!(toy.overlaps(&filter));
        assert!(filter.overlaps(&toy));

        let older = AgeRange::new(9, 12).unwrap();
        assert!(!older.overlaps(&filter));

        // Touching endpoints count as overlap.
        let touching = AgeRange::new(6, 10).unwrap();
        assert!(touching.overlaps(&filter));
    }

    #[test]
    fn age_range_parses_and_round_trips() {
        let range: AgeRange = "3-6".parse().unwrap();
        assert_eq!(range, AgeRange::new(3, 6).unwrap());
        assert_eq!(range.to_string(), "3-6");

        assert_eq!(" 5 - 8 ".parse::<AgeRange>().unwrap().to_string(), "5-8");
        assert!("six".parse::<AgeRange>().is_err());
        assert_eq!("9-3".parse::<AgeRange>(), Err(AgeRangeError::Inverted));
    }

    #[test]
    fn rental_status_round_trips() {
        for status in [
            RentalStatus::WaitingApproval,
            RentalStatus::Active,
            RentalStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<RentalStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<RentalStatus>().is_err());
    }
}
