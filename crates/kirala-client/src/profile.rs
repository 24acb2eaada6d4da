//! Profile manager: read-or-initialize, merge-writes, photo upload.

use chrono::Utc;
use thiserror::Error;

use kirala_shared::FriendCode;
use kirala_store::{ProfileUpdate, StoreError, UserProfile};

use crate::state::{lock, SharedState};

/// How many fresh codes to try before giving up on a pathologically full
/// code space.
const MAX_CODE_ATTEMPTS: usize = 10;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Sign in to view your profile")]
    NotSignedIn,

    #[error("Could not allocate a unique friend code")]
    CodeAllocation,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetch the signed-in user's profile, creating it on first load.
///
/// Creation seeds the document from the session identity and draws the
/// friend code, regenerating on the (rare) unique-index collision.
pub fn load_or_init_profile(state: &SharedState) -> Result<UserProfile, ProfileError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(ProfileError::NotSignedIn)?;

    match guard.database.get_user(&session.user_id) {
        Ok(profile) => Ok(profile),
        Err(StoreError::NotFound) => {
            let mut rng = rand::thread_rng();

            for _ in 0..MAX_CODE_ATTEMPTS {
                let profile = UserProfile {
                    id: session.user_id.clone(),
                    display_name: session.display_name.clone(),
                    email: session.email.clone(),
                    phone: session.phone.clone(),
                    photo_url: session.photo_url.clone(),
                    city: None,
                    age: None,
                    gender: None,
                    payout_iban: None,
                    friend_code: FriendCode::generate(&mut rng),
                    created_at: Utc::now(),
                };

                match guard.database.create_user_profile(&profile) {
                    Ok(()) => {
                        tracing::info!(user = %profile.id, code = %profile.friend_code, "profile created");
                        return Ok(profile);
                    }
                    Err(StoreError::FriendCodeTaken) => continue,
                    Err(e) => return Err(e.into()),
                }
            }

            Err(ProfileError::CodeAllocation)
        }
        Err(e) => Err(e.into()),
    }
}

/// Merge-write a profile edit; omitted fields keep their stored value.
pub fn save_profile(state: &SharedState, update: ProfileUpdate) -> Result<(), ProfileError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(ProfileError::NotSignedIn)?;

    guard.database.update_user_profile(&session.user_id, &update)?;
    Ok(())
}

/// Upload (or replace) the profile photo and record its URL.
pub async fn upload_profile_photo(state: &SharedState, bytes: &[u8]) -> Result<String, ProfileError> {
    let (session, media) = {
        let guard = lock(state);
        let session = guard.current_session().ok_or(ProfileError::NotSignedIn)?;
        (session, guard.media.clone())
    };

    let stored = media.store_profile_image(&session.user_id, bytes).await?;

    lock(state).database.update_user_profile(
        &session.user_id,
        &ProfileUpdate {
            photo_url: Some(stored.url.clone()),
            ..Default::default()
        },
    )?;

    Ok(stored.url)
}
