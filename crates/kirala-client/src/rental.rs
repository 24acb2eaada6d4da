//! The rental lifecycle: initiate, approve, complete.
//!
//! `Available -> waiting_approval -> active -> completed`.  Initiation is
//! renter-driven, approval is owner-driven after eyeballing the bank
//! transfer, completion follows the configured
//! [`CompletionPolicy`](crate::config::CompletionPolicy).  All
//! owner/renter checks happen before any write; the double-booking race is
//! closed inside the store's rent transaction.

use chrono::{Duration, Utc};
use thiserror::Error;

use kirala_shared::constants::{MAX_RENTAL_DAYS, MIN_RENTAL_DAYS};
use kirala_shared::{PaymentMethod, RentalId, RentalStatus, ToyId};
use kirala_store::{Rental, StoreError, TransitionOutcome};

use crate::config::CompletionPolicy;
use crate::state::{lock, SharedState};

#[derive(Error, Debug)]
pub enum RentalError {
    #[error("Sign in to rent a toy")]
    NotSignedIn,

    #[error("You cannot rent your own toy")]
    OwnToy,

    #[error("Rental length must be {MIN_RENTAL_DAYS}-{MAX_RENTAL_DAYS} days, got {0}")]
    InvalidDays(u32),

    #[error("Toy is no longer available")]
    Unavailable,

    #[error("Only the toy's owner can approve a rental")]
    NotOwner,

    #[error("Only the renter or the owner can return a toy")]
    NotParticipant,

    #[error("Rental is already completed")]
    AlreadyCompleted,

    #[error("Rental is not active yet")]
    NotActive,

    #[error("Listing not found")]
    NotFound,

    #[error("Manual returns are disabled by the completion policy")]
    ManualReturnDisabled,

    #[error("Automatic expiry is disabled by the completion policy")]
    AutoExpiryDisabled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the renter filled in on the payment sheet.
///
/// The card variant exists for UX parity only: nothing is authorized, and
/// only the last four digits survive past this function call.
#[derive(Debug, Clone)]
pub enum PaymentDetails {
    BankTransfer {
        sender_name: String,
        sender_bank: String,
    },
    Card {
        holder: String,
        number: String,
        expiry: String,
        cvc: String,
    },
}

impl PaymentDetails {
    fn method(&self) -> PaymentMethod {
        match self {
            Self::BankTransfer { .. } => PaymentMethod::Eft,
            Self::Card { .. } => PaymentMethod::Card,
        }
    }

    fn card_last_four(&self) -> Option<String> {
        match self {
            Self::Card { number, .. } => {
                let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
                let tail = digits.len().saturating_sub(4);
                Some(digits[tail..].to_string())
            }
            Self::BankTransfer { .. } => None,
        }
    }
}

/// Checkout form: duration plus payment path.
#[derive(Debug, Clone)]
pub struct RentalRequest {
    pub toy_id: ToyId,
    pub days: u32,
    pub payment: PaymentDetails,
}

/// `Available -> waiting_approval`: create the rental record and take the
/// toy off the market in one store transaction.
pub fn initiate_rental(state: &SharedState, request: RentalRequest) -> Result<Rental, RentalError> {
    if !(MIN_RENTAL_DAYS..=MAX_RENTAL_DAYS).contains(&request.days) {
        return Err(RentalError::InvalidDays(request.days));
    }

    let guard = lock(state);
    let session = guard.current_session().ok_or(RentalError::NotSignedIn)?;

    let toy = guard.database.get_toy(request.toy_id).map_err(map_lookup)?;

    // Refused before any write: "Senin Oyuncağın".
    if toy.owner_id == session.user_id {
        return Err(RentalError::OwnToy);
    }

    let (sender_name, sender_bank) = match &request.payment {
        PaymentDetails::BankTransfer {
            sender_name,
            sender_bank,
        } => (Some(sender_name.clone()), Some(sender_bank.clone())),
        PaymentDetails::Card { holder, .. } => (Some(holder.clone()), None),
    };

    let rental = Rental {
        id: RentalId::new(),
        toy_id: toy.id,
        toy_name: toy.name.clone(),
        renter_id: session.user_id.clone(),
        owner_id: toy.owner_id.clone(),
        days: request.days,
        total_price: toy.price_per_day as u64 * request.days as u64,
        payment_method: request.payment.method(),
        sender_name,
        sender_bank,
        card_last_four: request.payment.card_last_four(),
        status: RentalStatus::WaitingApproval,
        created_at: Utc::now(),
        approved_at: None,
        returned_at: None,
    };

    guard.database.rent_toy(&rental).map_err(|e| match e {
        StoreError::ToyUnavailable => RentalError::Unavailable,
        StoreError::NotFound => RentalError::NotFound,
        other => RentalError::Store(other),
    })?;

    Ok(rental)
}

/// `waiting_approval -> active`, owner-only.  Approving an already-active
/// rental is a no-op.
pub fn approve_rental(state: &SharedState, rental_id: RentalId) -> Result<Rental, RentalError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(RentalError::NotSignedIn)?;

    let rental = guard.database.get_rental(rental_id).map_err(map_lookup)?;
    if rental.owner_id != session.user_id {
        return Err(RentalError::NotOwner);
    }

    match guard.database.approve_rental(rental_id, Utc::now())? {
        TransitionOutcome::Applied | TransitionOutcome::Ignored(RentalStatus::Active) => {}
        TransitionOutcome::Ignored(RentalStatus::Completed) => {
            return Err(RentalError::AlreadyCompleted)
        }
        // The guarded update cannot skip a waiting rental.
        TransitionOutcome::Ignored(RentalStatus::WaitingApproval) => {
            return Err(RentalError::NotActive)
        }
    }

    guard.database.get_rental(rental_id).map_err(map_lookup)
}

/// `active -> completed` through the explicit return action
/// ([`CompletionPolicy::ManualReturn`]).  Renter and owner can both return.
pub fn return_rental(state: &SharedState, rental_id: RentalId) -> Result<(), RentalError> {
    let guard = lock(state);

    if guard.config.completion != CompletionPolicy::ManualReturn {
        return Err(RentalError::ManualReturnDisabled);
    }

    let session = guard.current_session().ok_or(RentalError::NotSignedIn)?;
    let rental = guard.database.get_rental(rental_id).map_err(map_lookup)?;

    if rental.renter_id != session.user_id && rental.owner_id != session.user_id {
        return Err(RentalError::NotParticipant);
    }

    match guard.database.complete_rental(rental_id, Utc::now())? {
        TransitionOutcome::Applied | TransitionOutcome::Ignored(RentalStatus::Completed) => Ok(()),
        TransitionOutcome::Ignored(status) => {
            tracing::warn!(rental = %rental_id, %status, "return refused, rental not active");
            Err(RentalError::NotActive)
        }
    }
}

/// `active -> completed` for every rental whose paid duration has elapsed
/// ([`CompletionPolicy::AutoExpire`]).  Returns the completed ids; meant to
/// run from a periodic task.
pub fn sweep_expired_rentals(state: &SharedState) -> Result<Vec<RentalId>, RentalError> {
    let guard = lock(state);

    if guard.config.completion != CompletionPolicy::AutoExpire {
        return Err(RentalError::AutoExpiryDisabled);
    }

    let now = Utc::now();
    let mut completed = Vec::new();

    for rental in guard.database.list_active_rentals()? {
        // The paid window starts at approval; initiation time is the
        // fallback for records predating the approval step.
        let started = rental.approved_at.unwrap_or(rental.created_at);
        let expires = started + Duration::days(rental.days as i64);

        if expires <= now {
            if let TransitionOutcome::Applied =
                guard.database.complete_rental(rental.id, now)?
            {
                tracing::info!(rental = %rental.id, "rental expired");
                completed.push(rental.id);
            }
        }
    }

    Ok(completed)
}

/// The renter's own rentals, newest first ("Kiralamalarım").
pub fn my_rentals(state: &SharedState) -> Result<Vec<Rental>, RentalError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(RentalError::NotSignedIn)?;
    Ok(guard.database.list_rentals_for_renter(&session.user_id)?)
}

/// Requests waiting for the signed-in owner's approval.
pub fn incoming_requests(state: &SharedState) -> Result<Vec<Rental>, RentalError> {
    let guard = lock(state);
    let session = guard.current_session().ok_or(RentalError::NotSignedIn)?;
    Ok(guard.database.list_pending_for_owner(&session.user_id)?)
}

fn map_lookup(e: StoreError) -> RentalError {
    match e {
        StoreError::NotFound => RentalError::NotFound,
        other => RentalError::Store(other),
    }
}
