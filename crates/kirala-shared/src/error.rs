use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Age range error: {0}")]
    AgeRange(#[from] AgeRangeError),

    #[error("Friend code error: {0}")]
    FriendCode(#[from] FriendCodeError),

    #[error("Unknown rental status: {0}")]
    UnknownStatus(String),

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("Unknown gender: {0}")]
    UnknownGender(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AgeRangeError {
    #[error("Expected \"min-max\", e.g. \"3-6\"")]
    Format,

    #[error("Age range minimum exceeds maximum")]
    Inverted,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FriendCodeError {
    #[error("Friend code must be exactly 6 characters")]
    Length,

    #[error("Friend code must contain only digits")]
    NonDigit,

    #[error("Friend code cannot start with zero")]
    LeadingZero,
}
