//! 1:1 messaging about listings.
//!
//! Rooms are keyed by the sorted participant pair, so "Sohbet Et" from a
//! listing is idempotent: however many times either side taps it, there is
//! exactly one room between the two users.

use chrono::Utc;
use thiserror::Error;

use kirala_shared::constants::CHAT_OPENING_MESSAGE;
use kirala_shared::{MessageId, RoomId, ToyId, UserId};
use kirala_store::{Message, Room, StoreError, UserProfile};

use crate::session::Session;
use crate::state::{lock, SharedState};

/// Default window size for a room's history.
pub const DEFAULT_MESSAGE_WINDOW: u32 = 50;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Sign in to chat")]
    NotSignedIn,

    #[error("You cannot start a chat about your own listing")]
    OwnListing,

    #[error("Message has no content")]
    EmptyMessage,

    #[error("You are not part of this room")]
    NotParticipant,

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A row in the chat list, with the other participant joined in.
#[derive(Debug, Clone)]
pub struct RoomEntry {
    pub room: Room,
    pub other: Option<UserProfile>,
}

/// Open (or re-open) the room between the signed-in user and a listing's
/// owner, seeding the toy context and the greeting.
pub fn start_chat(state: &SharedState, toy_id: ToyId) -> Result<RoomId, ChatError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(ChatError::NotSignedIn)?;

    let toy = guard.database.get_toy(toy_id).map_err(map_lookup)?;
    if toy.owner_id == session.user_id {
        return Err(ChatError::OwnListing);
    }

    let room_id = RoomId::between(&session.user_id, &toy.owner_id);
    let mut pair = [session.user_id.clone(), toy.owner_id.clone()];
    pair.sort();
    let [participant_a, participant_b] = pair;

    guard.database.upsert_room(&Room {
        id: room_id.clone(),
        participant_a,
        participant_b,
        toy_id: Some(toy.id),
        toy_name: Some(toy.name),
        last_message: Some(CHAT_OPENING_MESSAGE.to_string()),
        updated_at: Utc::now(),
    })?;

    Ok(room_id)
}

/// Send a text message into a room.
pub fn send_text(state: &SharedState, room_id: &RoomId, text: &str) -> Result<Message, ChatError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let guard = lock(state);
    let session = guard.current_session().ok_or(ChatError::NotSignedIn)?;
    require_membership(&guard.database, room_id, &session.user_id)?;

    let message = build_message(&session, room_id, Some(text.to_string()), None);
    guard.database.append_message(&message)?;
    Ok(message)
}

/// Upload an image and send it as a message with empty text.
pub async fn send_image(
    state: &SharedState,
    room_id: &RoomId,
    file_name: &str,
    bytes: &[u8],
) -> Result<Message, ChatError> {
    let (session, media) = {
        let guard = lock(state);
        let session = guard.current_session().ok_or(ChatError::NotSignedIn)?;
        require_membership(&guard.database, room_id, &session.user_id)?;
        (session, guard.media.clone())
    };

    let sent_at = Utc::now();
    let stored = media
        .store_chat_image(room_id, sent_at, file_name, bytes)
        .await?;

    let mut message = build_message(&session, room_id, None, Some(stored.url));
    message.created_at = sent_at;

    lock(state).database.append_message(&message)?;
    Ok(message)
}

/// The signed-in user's rooms, most recently active first, with the other
/// participant's profile joined for display.
pub fn room_list(state: &SharedState) -> Result<Vec<RoomEntry>, ChatError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(ChatError::NotSignedIn)?;

    let rooms = guard.database.list_rooms_for_user(&session.user_id)?;

    let entries = rooms
        .into_iter()
        .map(|room| {
            let other = room
                .other_participant(&session.user_id)
                .and_then(|id| guard.database.get_user(id).ok());
            RoomEntry { room, other }
        })
        .collect();

    Ok(entries)
}

/// A window of a room's history, oldest first.
pub fn timeline(
    state: &SharedState,
    room_id: &RoomId,
    limit: u32,
    offset: u32,
) -> Result<Vec<Message>, ChatError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(ChatError::NotSignedIn)?;
    require_membership(&guard.database, room_id, &session.user_id)?;

    Ok(guard.database.list_messages(room_id, limit, offset)?)
}

fn build_message(
    session: &Session,
    room_id: &RoomId,
    text: Option<String>,
    image_url: Option<String>,
) -> Message {
    Message {
        id: MessageId::new(),
        room_id: room_id.clone(),
        sender_id: session.user_id.clone(),
        sender_name: session.visible_name(),
        sender_photo_url: session.photo_url.clone(),
        text,
        image_url,
        created_at: Utc::now(),
    }
}

fn require_membership(
    db: &kirala_store::Database,
    room_id: &RoomId,
    user: &UserId,
) -> Result<(), ChatError> {
    let room = db.get_room(room_id).map_err(map_lookup)?;
    if room.other_participant(user).is_none() {
        return Err(ChatError::NotParticipant);
    }
    Ok(())
}

fn map_lookup(e: StoreError) -> ChatError {
    match e {
        StoreError::NotFound => ChatError::NotFound,
        other => ChatError::Store(other),
    }
}
