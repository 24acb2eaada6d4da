//! Friend-code lookups and the contact list.

use chrono::Utc;
use thiserror::Error;

use kirala_shared::FriendCode;
use kirala_store::{Friend, StoreError};

use crate::state::{lock, SharedState};

#[derive(Error, Debug)]
pub enum FriendError {
    #[error("Sign in to add friends")]
    NotSignedIn,

    #[error("No user carries this code")]
    NotFound,

    #[error("That is your own code")]
    SelfAdd,

    #[error("Already in your contacts")]
    AlreadyAdded,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolve a friend code and record the contact.
pub fn add_friend_by_code(state: &SharedState, code: &FriendCode) -> Result<Friend, FriendError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(FriendError::NotSignedIn)?;

    let target = guard
        .database
        .get_user_by_friend_code(code)
        .map_err(|e| match e {
            StoreError::NotFound => FriendError::NotFound,
            other => FriendError::Store(other),
        })?;

    if target.id == session.user_id {
        return Err(FriendError::SelfAdd);
    }
    if guard.database.friend_exists(&session.user_id, &target.id)? {
        return Err(FriendError::AlreadyAdded);
    }

    let friend = Friend {
        owner_id: session.user_id.clone(),
        friend_id: target.id,
        display_name: target.display_name,
        photo_url: target.photo_url,
        friend_code: target.friend_code,
        added_at: Utc::now(),
    };
    guard.database.add_friend(&friend)?;

    Ok(friend)
}

/// The signed-in user's contacts, most recently added first.
pub fn list_friends(state: &SharedState) -> Result<Vec<Friend>, FriendError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(FriendError::NotSignedIn)?;
    Ok(guard.database.list_friends(&session.user_id)?)
}
