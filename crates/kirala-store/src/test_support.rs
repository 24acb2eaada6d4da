//! Shared fixtures for the store's unit tests.

use chrono::Utc;

use kirala_shared::{AgeRange, FriendCode, ToyId, UserId};

use crate::database::Database;
use crate::models::{Toy, UserProfile};

pub(crate) fn open_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("test.db")).unwrap();
    (dir, db)
}

pub(crate) fn sample_toy(owner: &str, name: &str, city: &str) -> Toy {
    Toy {
        id: ToyId::new(),
        owner_id: UserId::from(owner),
        name: name.to_string(),
        description: "Az kullanılmış, eksiksiz.".to_string(),
        city: city.to_string(),
        age_range: AgeRange::new(3, 6).unwrap(),
        price_per_day: 50,
        categories: vec!["Educational".to_string()],
        gender: None,
        image_url: None,
        is_available: true,
        rented_by: None,
        rented_at: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn sample_profile(id: &str, code: &str) -> UserProfile {
    UserProfile {
        id: UserId::from(id),
        display_name: Some(format!("user {id}")),
        email: Some(format!("{id}@example.com")),
        phone: None,
        photo_url: None,
        city: Some("İzmir".to_string()),
        age: None,
        gender: None,
        payout_iban: None,
        friend_code: FriendCode::parse(code).unwrap(),
        created_at: Utc::now(),
    }
}
