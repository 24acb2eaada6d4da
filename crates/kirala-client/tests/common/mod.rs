//! Shared harness for the client flow tests.

use std::sync::Arc;

use kirala_client::auth::local::LocalIdentityProvider;
use kirala_client::{auth, listing, AppConfig, AppState, CompletionPolicy, Session, SharedState};
use kirala_shared::AgeRange;
use kirala_store::Toy;

pub const PASSWORD: &str = "parola123";

pub struct TestApp {
    pub state: SharedState,
    pub provider: Arc<LocalIdentityProvider>,
    _dir: tempfile::TempDir,
}

pub async fn spawn_app(completion: CompletionPolicy) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");

    let config = AppConfig {
        data_dir: Some(dir.path().join("data")),
        blob_dir: dir.path().join("media"),
        max_image_bytes: 1024 * 1024,
        completion,
    };

    let provider = Arc::new(LocalIdentityProvider::new());
    let state = AppState::bootstrap(config, provider.clone())
        .await
        .expect("bootstrap");

    TestApp {
        state,
        provider,
        _dir: dir,
    }
}

/// Register and sign in a fresh user; leaves them as the active session.
pub fn sign_up(app: &TestApp, email: &str, display_name: &str) -> Session {
    auth::sign_up(&app.state, email, PASSWORD, Some(display_name)).expect("sign up")
}

/// Switch the active session to an existing user.
pub fn sign_in(app: &TestApp, email: &str) -> Session {
    auth::sign_in(&app.state, email, PASSWORD).expect("sign in")
}

/// List a toy as the currently signed-in user.
pub async fn list_toy(app: &TestApp, name: &str, city: &str, price: u32) -> Toy {
    listing::create_listing(
        &app.state,
        listing::NewListing {
            name: name.to_string(),
            description: "Az kullanılmış, eksiksiz.".to_string(),
            city: city.to_string(),
            age_range: AgeRange::new(3, 6).unwrap(),
            price_per_day: price,
            categories: vec!["Educational".to_string()],
            gender: None,
            image: None,
        },
    )
    .await
    .expect("create listing")
}
