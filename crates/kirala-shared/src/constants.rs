/// Application name
pub const APP_NAME: &str = "Oyna-Kirala";

/// Shortest rental a renter can request, in days
pub const MIN_RENTAL_DAYS: u32 = 1;

/// Longest rental a renter can request, in days
pub const MAX_RENTAL_DAYS: u32 = 60;

/// Quick-pick duration presets offered at checkout
pub const RENTAL_DAY_PRESETS: [u32; 4] = [3, 7, 14, 30];

/// Maximum number of toys in the "İlgini Çekebilecekler" home bucket
pub const INTERESTED_BUCKET_CAP: usize = 4;

/// Inclusive friend-code range: 6 digits, never a leading zero
pub const FRIEND_CODE_MIN: u32 = 100_000;
pub const FRIEND_CODE_MAX: u32 = 999_999;

/// Category assigned to toys listed without one
pub const FALLBACK_CATEGORY: &str = "Diğer";

/// Categories offered by the listing editor
pub const TOY_CATEGORIES: [&str; 8] = [
    "Action Figures",
    "Animals",
    "Educational",
    "Dolls",
    "Electronic",
    "Creative",
    "Sports",
    "Other",
];

/// First message written into a room when a chat is started from a listing
pub const CHAT_OPENING_MESSAGE: &str = "İlan hakkında bilgi almak istiyorum.";

/// Default upload cap for toy, chat and profile images (10 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
