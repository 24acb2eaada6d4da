use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database or blob directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A stored value no schema version ever wrote (e.g. an unknown
    /// rental status).
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// The compare-and-swap on `is_available` lost: somebody rented the toy
    /// first, or the owner withdrew it.
    #[error("Toy is no longer available")]
    ToyUnavailable,

    /// The randomly drawn friend code collided with an existing profile.
    #[error("Friend code already in use")]
    FriendCodeTaken,

    /// UUID parsing error.
    #[error("UUID error: {0}")]
    Uuid(#[from] uuid::Error),

    /// Timestamp parsing error.
    #[error("Timestamp parse error: {0}")]
    ChronoParse(#[from] chrono::ParseError),

    /// Settings / category JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An uploaded image exceeds the configured cap.
    #[error("Image too large: {size} bytes (cap {max})")]
    BlobTooLarge { size: usize, max: usize },

    /// A blob path escaped the storage root or was otherwise malformed.
    #[error("Invalid blob path")]
    InvalidBlobPath,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
