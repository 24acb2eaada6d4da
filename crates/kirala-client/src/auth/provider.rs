//! The contract the hosted identity provider is consumed through.

use kirala_shared::UserId;

use crate::auth::AuthError;
use crate::session::Session;

/// Federated sign-in backends the login screen offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedProvider {
    Google,
}

/// Opaque handle tying an OTP verification to the request that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub phone: String,
    pub nonce: String,
}

/// Everything the application needs from the auth backend.
///
/// The hosted platform implements this over its network SDK; tests and
/// local development use [`local::LocalIdentityProvider`](super::local::LocalIdentityProvider).
pub trait IdentityProvider: Send + Sync {
    /// Create an email/password account.  Fails with
    /// [`AuthError::EmailInUse`] or [`AuthError::WeakPassword`].
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Session, AuthError>;

    /// Email/password sign-in.
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Send a verification code to `phone` (behind the provider's bot
    /// check) and return the challenge handle.
    fn request_otp(&self, phone: &str) -> Result<OtpChallenge, AuthError>;

    /// Exchange a delivered code for a session.
    fn verify_otp(&self, challenge: &OtpChallenge, code: &str) -> Result<Session, AuthError>;

    /// Complete a federated redirect sign-in.
    fn sign_in_federated(
        &self,
        provider: FederatedProvider,
        subject: &str,
        email: &str,
    ) -> Result<Session, AuthError>;

    /// Invalidate the provider-side session.
    fn sign_out(&self, user: &UserId) -> Result<(), AuthError>;
}
