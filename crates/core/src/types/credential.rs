//! Login credential policy.
//!
//! A credential is accepted when it is between [`NewCredential::MIN_LENGTH`]
//! and [`NewCredential::MAX_LENGTH`] characters long, both inclusive.
//! Length is counted in characters, not bytes.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Credential rejected by the length policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("credential must be between {min} and {max} characters")]
pub struct CredentialError {
    pub min: usize,
    pub max: usize,
}

/// A plaintext credential that has passed the length policy.
///
/// The value is held in a [`SecretString`] so it never shows up in `Debug`
/// output or logs; it only exists until it has been hashed.
pub struct NewCredential(SecretString);

impl NewCredential {
    pub const MIN_LENGTH: usize = 6;
    pub const MAX_LENGTH: usize = 20;

    /// Check `raw` against the length policy.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the length is outside `[6, 20]`.
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let len = raw.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(CredentialError {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(SecretString::from(raw.to_owned())))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NewCredential([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_boundaries() {
        assert!(NewCredential::parse(&"a".repeat(5)).is_err());
        assert!(NewCredential::parse(&"a".repeat(6)).is_ok());
        assert!(NewCredential::parse(&"a".repeat(20)).is_ok());
        assert!(NewCredential::parse(&"a".repeat(21)).is_err());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // six Hangul syllables are 18 bytes in UTF-8
        assert!(NewCredential::parse("비밀번호좋아").is_ok());
    }

    #[test]
    fn test_debug_is_redacted() {
        let Ok(credential) = NewCredential::parse("hunter22") else {
            panic!("expected a valid credential");
        };
        assert!(!format!("{credential:?}").contains("hunter22"));
    }
}
