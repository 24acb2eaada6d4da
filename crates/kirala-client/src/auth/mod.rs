//! Authentication commands and the identity-provider contract.
//!
//! Sign-in, sign-up, OTP and federated flows all funnel through the
//! [`provider::IdentityProvider`] trait; the commands here drive the
//! provider and keep the [`SessionContext`](crate::session::SessionContext)
//! in sync with its answers.

pub mod local;
pub mod provider;

use thiserror::Error;

use crate::session::Session;
use crate::state::{lock, SharedState};

pub use provider::{FederatedProvider, IdentityProvider, OtpChallenge};

/// Identity-provider failures, mapped to stable variants so the UI can show
/// localized messages.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email is already registered")]
    EmailInUse,

    #[error("Password does not meet the minimum requirements")]
    WeakPassword,

    #[error("Verification code is invalid or expired")]
    InvalidVerificationCode,

    #[error("No account matches this identity")]
    UnknownUser,

    #[error("Identity provider failure: {0}")]
    Provider(String),
}

impl AuthError {
    /// The Turkish message shown to the user, matching the original UI
    /// copy.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "E-posta veya şifre hatalı.",
            Self::EmailInUse => "Bu e-posta adresi zaten kayıtlı.",
            Self::WeakPassword => "Şifre en az 6 karakter olmalı.",
            Self::InvalidVerificationCode => "Doğrulama kodu hatalı veya süresi dolmuş.",
            Self::UnknownUser => "Bu bilgilere ait bir hesap bulunamadı.",
            Self::Provider(_) => "Bir hata oluştu. Lütfen tekrar deneyin.",
        }
    }
}

/// Register a new email/password account and open a session for it.
pub fn sign_up(
    state: &SharedState,
    email: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<Session, AuthError> {
    let identity = lock(state).identity.clone();
    let session = identity.sign_up(email, password, display_name)?;

    lock(state).session.signed_in(session.clone());
    Ok(session)
}

/// Email/password sign-in.
pub fn sign_in(state: &SharedState, email: &str, password: &str) -> Result<Session, AuthError> {
    let identity = lock(state).identity.clone();
    let session = identity.sign_in(email, password)?;

    lock(state).session.signed_in(session.clone());
    Ok(session)
}

/// Start a phone verification; the provider delivers the code out of band.
pub fn request_otp(state: &SharedState, phone: &str) -> Result<OtpChallenge, AuthError> {
    let identity = lock(state).identity.clone();
    identity.request_otp(phone)
}

/// Finish a phone verification and open the session.
pub fn verify_otp(
    state: &SharedState,
    challenge: &OtpChallenge,
    code: &str,
) -> Result<Session, AuthError> {
    let identity = lock(state).identity.clone();
    let session = identity.verify_otp(challenge, code)?;

    lock(state).session.signed_in(session.clone());
    Ok(session)
}

/// Complete a federated (e.g. Google) sign-in with the redirect result.
pub fn sign_in_federated(
    state: &SharedState,
    provider: FederatedProvider,
    subject: &str,
    email: &str,
) -> Result<Session, AuthError> {
    let identity = lock(state).identity.clone();
    let session = identity.sign_in_federated(provider, subject, email)?;

    lock(state).session.signed_in(session.clone());
    Ok(session)
}

/// Browse without an account.
pub fn continue_as_guest(state: &SharedState) {
    lock(state).session.continued_as_guest();
}

/// Tear the session down.
pub fn sign_out(state: &SharedState) -> Result<(), AuthError> {
    let mut guard = lock(state);
    if let Some(session) = guard.current_session() {
        guard.identity.clone().sign_out(&session.user_id)?;
    }
    guard.session.signed_out();
    Ok(())
}
