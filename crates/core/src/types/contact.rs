//! Buyer contact fields: email address and phone number.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    #[error("email needs text on both sides of the @")]
    MissingPart,
}

/// An email address with a basic `local@domain` shape check.
///
/// ```
/// use maru_core::Email;
///
/// assert!(Email::parse("buyer@maru.shop").is_ok());
/// assert!(Email::parse("buyer.maru.shop").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse and trim an email address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first rule the input breaks.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let mut parts = s.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(EmailError::AtSymbol);
        };
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart);
        }

        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number must have between {min} and {max} digits")]
    Length { min: usize, max: usize },
}

/// A domestic phone number stored as digits only.
///
/// Separators such as `-`, spaces or parentheses are stripped on parse, so
/// `010-1234-5678` and `01012345678` are the same number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const MIN_DIGITS: usize = 9;
    pub const MAX_DIGITS: usize = 11;

    /// Parse a phone number, keeping only its digits.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::Length`] if the digit count is out of range.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneError::Length {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }
        Ok(Self(digits))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert_eq!(Email::parse("  "), Err(EmailError::Empty));
        assert_eq!(Email::parse("a@b@c"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("nobody"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("@maru.shop"), Err(EmailError::MissingPart));
        assert_eq!(Email::parse("buyer@"), Err(EmailError::MissingPart));
        assert!(matches!(
            Email::parse(&format!("{}@maru.shop", "a".repeat(250))),
            Err(EmailError::TooLong { .. })
        ));
        assert_eq!(Email::parse(" buyer@maru.shop ").unwrap().as_str(), "buyer@maru.shop");
    }

    #[test]
    fn test_email_deserialize_validates() {
        assert!(serde_json::from_str::<Email>("\"buyer@maru.shop\"").is_ok());
        assert!(serde_json::from_str::<Email>("\"buyer\"").is_err());
    }

    #[test]
    fn test_phone_strips_separators() {
        let phone = PhoneNumber::parse("010-1234-5678").unwrap();
        assert_eq!(phone.as_str(), "01012345678");
    }

    #[test]
    fn test_phone_length() {
        assert!(PhoneNumber::parse("02-123-456").is_err());
        assert!(PhoneNumber::parse("02-123-4567").is_ok());
        assert!(PhoneNumber::parse("010-1234-56789").is_err());
    }
}
