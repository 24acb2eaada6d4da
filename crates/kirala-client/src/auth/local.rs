//! In-process identity provider for tests and local development.
//!
//! Behaves like the hosted provider at the contract level: bcrypt-hashed
//! passwords, single-use OTP codes, stable user ids per federated subject.
//! Nothing here survives a restart.

use std::collections::HashMap;
use std::sync::Mutex;

use bcrypt::{hash, verify, DEFAULT_COST};
use rand::Rng;
use uuid::Uuid;

use kirala_shared::UserId;

use crate::auth::provider::{FederatedProvider, IdentityProvider, OtpChallenge};
use crate::auth::AuthError;
use crate::session::Session;

/// Providers commonly require six characters; mirror that.
const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    user_id: UserId,
    password_hash: String,
    display_name: Option<String>,
}

#[derive(Default)]
pub struct LocalIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    /// phone -> (nonce, code); one outstanding challenge per phone.
    otp: Mutex<HashMap<String, (String, String)>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: the code the "SMS" would have carried.
    pub fn last_code_for(&self, phone: &str) -> Option<String> {
        self.otp
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(phone)
            .map(|(_, code)| code.clone())
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Session, AuthError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let mut accounts = self.accounts.lock().unwrap_or_else(|p| p.into_inner());
        if accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }

        let password_hash =
            hash(password, DEFAULT_COST).map_err(|e| AuthError::Provider(e.to_string()))?;

        let account = Account {
            user_id: fresh_user_id(),
            password_hash,
            display_name: display_name.map(str::to_string),
        };
        let session = Session {
            user_id: account.user_id.clone(),
            email: Some(email.to_string()),
            phone: None,
            display_name: account.display_name.clone(),
            photo_url: None,
        };
        accounts.insert(email.to_string(), account);

        tracing::info!(user = %session.user_id, "account registered");
        Ok(session)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let accounts = self.accounts.lock().unwrap_or_else(|p| p.into_inner());
        let account = accounts.get(email).ok_or(AuthError::InvalidCredentials)?;

        let ok = verify(password, &account.password_hash)
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Session {
            user_id: account.user_id.clone(),
            email: Some(email.to_string()),
            phone: None,
            display_name: account.display_name.clone(),
            photo_url: None,
        })
    }

    fn request_otp(&self, phone: &str) -> Result<OtpChallenge, AuthError> {
        let mut rng = rand::thread_rng();
        let code = format!("{:06}", rng.gen_range(0..1_000_000u32));
        let nonce = Uuid::new_v4().to_string();

        self.otp
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(phone.to_string(), (nonce.clone(), code));

        Ok(OtpChallenge {
            phone: phone.to_string(),
            nonce,
        })
    }

    fn verify_otp(&self, challenge: &OtpChallenge, code: &str) -> Result<Session, AuthError> {
        let mut otp = self.otp.lock().unwrap_or_else(|p| p.into_inner());

        match otp.get(&challenge.phone) {
            Some((nonce, expected)) if nonce == &challenge.nonce && expected == code => {
                // Codes are single-use.
                otp.remove(&challenge.phone);
                Ok(Session {
                    user_id: UserId(format!("otp-{}", challenge.phone)),
                    email: None,
                    phone: Some(challenge.phone.clone()),
                    display_name: None,
                    photo_url: None,
                })
            }
            _ => Err(AuthError::InvalidVerificationCode),
        }
    }

    fn sign_in_federated(
        &self,
        provider: FederatedProvider,
        subject: &str,
        email: &str,
    ) -> Result<Session, AuthError> {
        let prefix = match provider {
            FederatedProvider::Google => "google",
        };
        Ok(Session {
            user_id: UserId(format!("{prefix}-{subject}")),
            email: Some(email.to_string()),
            phone: None,
            display_name: None,
            photo_url: None,
        })
    }

    fn sign_out(&self, _user: &UserId) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Fresh opaque id in the shape the hosted provider hands out.
fn fresh_user_id() -> UserId {
    UserId(Uuid::new_v4().simple().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_then_sign_in() {
        let provider = LocalIdentityProvider::new();
        let created = provider
            .sign_up("ayse@example.com", "parola123", Some("Ayşe"))
            .unwrap();

        let session = provider.sign_in("ayse@example.com", "parola123").unwrap();
        assert_eq!(session.user_id, created.user_id);
        assert_eq!(session.display_name.as_deref(), Some("Ayşe"));

        assert_eq!(
            provider.sign_in("ayse@example.com", "yanlis"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn weak_password_and_duplicate_email_are_mapped() {
        let provider = LocalIdentityProvider::new();
        assert_eq!(
            provider.sign_up("a@example.com", "kisa", None),
            Err(AuthError::WeakPassword)
        );

        provider.sign_up("a@example.com", "parola123", None).unwrap();
        assert_eq!(
            provider.sign_up("a@example.com", "parola456", None),
            Err(AuthError::EmailInUse)
        );
    }

    #[test]
    fn otp_codes_are_single_use() {
        let provider = LocalIdentityProvider::new();
        let challenge = provider.request_otp("05551112233").unwrap();
        let code = provider.last_code_for("05551112233").unwrap();

        let session = provider.verify_otp(&challenge, &code).unwrap();
        assert_eq!(session.phone.as_deref(), Some("05551112233"));

        // Replay fails.
        assert_eq!(
            provider.verify_otp(&challenge, &code),
            Err(AuthError::InvalidVerificationCode)
        );
    }
}
