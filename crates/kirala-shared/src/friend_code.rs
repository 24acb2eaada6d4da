//! Human-shareable 6-digit friend codes.
//!
//! A friend code is how one user finds another without knowing their opaque
//! account id: a uniform random number in `100000..=999999`, so always six
//! ASCII digits with a nonzero leading digit.  Uniqueness is a storage
//! concern; the store keeps a unique index and callers regenerate on
//! conflict.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{FRIEND_CODE_MAX, FRIEND_CODE_MIN};
use crate::error::FriendCodeError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FriendCode(String);

impl FriendCode {
    /// Draw a fresh code from the full `100000..=999999` space.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        Self(rng.gen_range(FRIEND_CODE_MIN..=FRIEND_CODE_MAX).to_string())
    }

    /// Validate user input (e.g. from the "add friend" form).
    pub fn parse(input: &str) -> Result<Self, FriendCodeError> {
        let code = input.trim();
        if code.len() != 6 {
            return Err(FriendCodeError::Length);
        }
        if !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FriendCodeError::NonDigit);
        }
        if code.starts_with('0') {
            return Err(FriendCodeError::LeadingZero);
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FriendCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn generated_codes_are_six_nonzero_leading_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let code = FriendCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
            assert_ne!(code.as_str().as_bytes()[0], b'0');
        }
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(FriendCode::parse("123456").is_ok());
        assert!(FriendCode::parse(" 654321 ").is_ok());
        assert_eq!(FriendCode::parse("12345"), Err(FriendCodeError::Length));
        assert_eq!(FriendCode::parse("1234567"), Err(FriendCodeError::Length));
        assert_eq!(FriendCode::parse("12a456"), Err(FriendCodeError::NonDigit));
        assert_eq!(
            FriendCode::parse("012345"),
            Err(FriendCodeError::LeadingZero)
        );
    }
}
