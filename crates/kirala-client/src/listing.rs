//! Listing editor: create, edit and withdraw toys.

use chrono::Utc;
use thiserror::Error;

use kirala_shared::{AgeRange, Gender, ToyId};
use kirala_store::{StoreError, Toy, ToyUpdate};

use crate::state::{lock, SharedState};

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("Sign in to manage listings")]
    NotSignedIn,

    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Pick at least one category")]
    NoCategories,

    #[error("Daily price must be above zero")]
    InvalidPrice,

    #[error("Only the owner can edit this listing")]
    NotOwner,

    #[error("Listing is rented out right now")]
    ToyRented,

    #[error("Listing not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An image handed in by the form, already compressed by the UI side.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The create form.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub name: String,
    pub description: String,
    pub city: String,
    pub age_range: AgeRange,
    pub price_per_day: u32,
    pub categories: Vec<String>,
    pub gender: Option<Gender>,
    pub image: Option<ImageUpload>,
}

/// Validate the form, upload the photo if any, insert the listing.
pub async fn create_listing(state: &SharedState, form: NewListing) -> Result<Toy, ListingError> {
    validate(&form)?;

    let (session, media) = {
        let guard = lock(state);
        let session = guard.current_session().ok_or(ListingError::NotSignedIn)?;
        (session, guard.media.clone())
    };

    let created_at = Utc::now();

    // Upload outside the lock; the toy row is only written on success.
    let image_url = match &form.image {
        Some(upload) => Some(
            media
                .store_toy_image(&session.user_id, created_at, &upload.bytes)
                .await?
                .url,
        ),
        None => None,
    };

    let toy = Toy {
        id: ToyId::new(),
        owner_id: session.user_id,
        name: form.name,
        description: form.description,
        city: form.city,
        age_range: form.age_range,
        price_per_day: form.price_per_day,
        categories: form.categories,
        gender: form.gender,
        image_url,
        is_available: true,
        rented_by: None,
        rented_at: None,
        created_at,
    };

    lock(state).database.create_toy(&toy)?;

    tracing::info!(toy = %toy.id, owner = %toy.owner_id, "listing created");
    Ok(toy)
}

/// Owner-only partial edit, with an optional replacement photo.
pub async fn update_listing(
    state: &SharedState,
    toy_id: ToyId,
    mut update: ToyUpdate,
    new_image: Option<ImageUpload>,
) -> Result<(), ListingError> {
    let (session, media) = {
        let guard = lock(state);
        let session = guard.current_session().ok_or(ListingError::NotSignedIn)?;

        let toy = guard.database.get_toy(toy_id).map_err(map_lookup)?;
        if toy.owner_id != session.user_id {
            return Err(ListingError::NotOwner);
        }
        (session, guard.media.clone())
    };

    if let Some(categories) = &update.categories {
        if categories.is_empty() {
            return Err(ListingError::NoCategories);
        }
    }
    if update.price_per_day == Some(0) {
        return Err(ListingError::InvalidPrice);
    }

    if let Some(upload) = new_image {
        let stored = media
            .store_toy_image(&session.user_id, Utc::now(), &upload.bytes)
            .await?;
        update.image_url = Some(stored.url);
    }

    lock(state)
        .database
        .update_toy(toy_id, &update)
        .map_err(map_lookup)?;

    Ok(())
}

/// Owner-only withdraw; refused while the toy is rented out.
pub fn delete_listing(state: &SharedState, toy_id: ToyId) -> Result<(), ListingError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(ListingError::NotSignedIn)?;

    let toy = guard.database.get_toy(toy_id).map_err(map_lookup)?;
    if toy.owner_id != session.user_id {
        return Err(ListingError::NotOwner);
    }

    guard.database.delete_toy(toy_id).map_err(|e| match e {
        StoreError::ToyUnavailable => ListingError::ToyRented,
        other => ListingError::Store(other),
    })?;

    tracing::info!(toy = %toy_id, "listing deleted");
    Ok(())
}

/// The signed-in user's own listings, newest first.
pub fn my_listings(state: &SharedState) -> Result<Vec<Toy>, ListingError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(ListingError::NotSignedIn)?;
    Ok(guard.database.list_toys_owned_by(&session.user_id)?)
}

fn validate(form: &NewListing) -> Result<(), ListingError> {
    if form.name.trim().is_empty() {
        return Err(ListingError::MissingField("name"));
    }
    if form.description.trim().is_empty() {
        return Err(ListingError::MissingField("description"));
    }
    if form.city.trim().is_empty() {
        return Err(ListingError::MissingField("city"));
    }
    if form.categories.is_empty() {
        return Err(ListingError::NoCategories);
    }
    if form.price_per_day == 0 {
        return Err(ListingError::InvalidPrice);
    }
    Ok(())
}

fn map_lookup(e: StoreError) -> ListingError {
    match e {
        StoreError::NotFound => ListingError::NotFound,
        other => ListingError::Store(other),
    }
}
