//! Profile initialization, merge-writes, friend codes, settings.

use kirala_client::catalog::CatalogView;
use kirala_client::friends::{self, FriendError};
use kirala_client::{profile, settings, CompletionPolicy};
use kirala_store::ProfileUpdate;

mod common;

#[tokio::test]
async fn first_load_creates_the_profile_with_a_friend_code() {
    let app = common::spawn_app(CompletionPolicy::ManualReturn).await;

    common::sign_up(&app, "ayse@example.com", "Ayşe");

    let created = profile::load_or_init_profile(&app.state).unwrap();
    assert_eq!(created.display_name.as_deref(), Some("Ayşe"));
    assert_eq!(created.email.as_deref(), Some("ayse@example.com"));

    let code = created.friend_code.as_str();
    assert_eq!(code.len(), 6);
    assert!(code.bytes().all(|b| b.is_ascii_digit()));
    assert_ne!(code.as_bytes()[0], b'0');

    // Second load reads, never re-creates.
    let loaded = profile::load_or_init_profile(&app.state).unwrap();
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.friend_code, created.friend_code);
}

#[tokio::test]
async fn profile_edits_merge_and_photos_overwrite() {
    let app = common::spawn_app(CompletionPolicy::ManualReturn).await;

    common::sign_up(&app, "ayse@example.com", "Ayşe");
    profile::load_or_init_profile(&app.state).unwrap();

    profile::save_profile(
        &app.state,
        ProfileUpdate {
            city: Some("İzmir".to_string()),
            phone: Some("0555 111 22 33".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let url = profile::upload_profile_photo(&app.state, b"portre").await.unwrap();
    assert!(url.starts_with("kirala://profile_images/"));

    // Overwrite keeps one file per user.
    let url_again = profile::upload_profile_photo(&app.state, b"yeni portre")
        .await
        .unwrap();
    assert_eq!(url, url_again);

    let stored = profile::load_or_init_profile(&app.state).unwrap();
    assert_eq!(stored.city.as_deref(), Some("İzmir"));
    assert_eq!(stored.photo_url.as_deref(), Some(url.as_str()));
    // The email was never part of an update and survives untouched.
    assert_eq!(stored.email.as_deref(), Some("ayse@example.com"));
}

#[tokio::test]
async fn friend_codes_resolve_to_contacts() {
    let app = common::spawn_app(CompletionPolicy::ManualReturn).await;

    common::sign_up(&app, "ayse@example.com", "Ayşe");
    let ayse = profile::load_or_init_profile(&app.state).unwrap();

    common::sign_up(&app, "berk@example.com", "Berk");
    let berk = profile::load_or_init_profile(&app.state).unwrap();

    // Berk adds Ayşe by her code.
    let friend = friends::add_friend_by_code(&app.state, &ayse.friend_code).unwrap();
    assert_eq!(friend.friend_id, ayse.id);
    assert_eq!(friend.display_name.as_deref(), Some("Ayşe"));

    // Re-adding and self-adding are refused.
    assert!(matches!(
        friends::add_friend_by_code(&app.state, &ayse.friend_code).unwrap_err(),
        FriendError::AlreadyAdded
    ));
    assert!(matches!(
        friends::add_friend_by_code(&app.state, &berk.friend_code).unwrap_err(),
        FriendError::SelfAdd
    ));

    // Unknown codes report not-found.
    let unknown = kirala_shared::FriendCode::parse("999999").unwrap();
    let result = friends::add_friend_by_code(&app.state, &unknown);
    if ayse.friend_code.as_str() != "999999" && berk.friend_code.as_str() != "999999" {
        assert!(matches!(result.unwrap_err(), FriendError::NotFound));
    }

    let contacts = friends::list_friends(&app.state).unwrap();
    assert_eq!(contacts.len(), 1);
}

#[tokio::test]
async fn onboarding_flag_round_trips() {
    let app = common::spawn_app(CompletionPolicy::ManualReturn).await;

    assert!(!settings::get_settings(&app.state).unwrap().onboarding_seen);

    settings::mark_onboarding_seen(&app.state).unwrap();
    assert!(settings::get_settings(&app.state).unwrap().onboarding_seen);
}

#[tokio::test]
async fn catalog_uses_the_viewer_city_from_the_profile() {
    let app = common::spawn_app(CompletionPolicy::ManualReturn).await;

    common::sign_up(&app, "sahip@example.com", "Sahip");
    common::list_toy(&app, "İzmir Treni", "İzmir", 50).await;
    common::list_toy(&app, "Ankara Topu", "Ankara", 20).await;

    common::sign_up(&app, "ayse@example.com", "Ayşe");
    profile::load_or_init_profile(&app.state).unwrap();
    profile::save_profile(
        &app.state,
        ProfileUpdate {
            city: Some("İzmir".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let buckets = CatalogView::default().snapshot(&app.state).unwrap();
    assert_eq!(buckets.interested.len(), 1);
    assert_eq!(buckets.interested[0].name, "İzmir Treni");
    assert_eq!(buckets.other_cities.len(), 1);
    assert_eq!(buckets.other_cities[0].name, "Ankara Topu");
}
