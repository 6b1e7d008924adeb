//! Carrier tracking numbers.
//!
//! Absence is `Option::None`. Legacy inputs used `"-"` (or an empty field)
//! to mean "not shipped yet"; [`TrackingNumber::parse`] maps those to `None`
//! so the placeholder never reaches storage or a carrier lookup.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder some clients send instead of leaving the field empty.
const NOT_SHIPPED_PLACEHOLDER: &str = "-";

/// A blank or placeholder value where a tracking number was required.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("tracking number cannot be blank or \"-\"")]
pub struct BlankTrackingNumber;

/// A carrier tracking code entered by an administrator.
///
/// Deserializing goes through [`TrackingNumber::parse`]: input is trimmed,
/// and a blank or `"-"` value is rejected rather than stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingNumber(String);

impl TrackingNumber {
    /// Normalise raw admin input into an optional tracking number.
    ///
    /// ```
    /// use maru_core::TrackingNumber;
    ///
    /// assert!(TrackingNumber::parse("").is_none());
    /// assert!(TrackingNumber::parse(" - ").is_none());
    /// assert_eq!(
    ///     TrackingNumber::parse(" 6892-1100-2231 ").unwrap().as_str(),
    ///     "6892-1100-2231"
    /// );
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == NOT_SHIPPED_PLACEHOLDER {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrackingNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrackingNumber {
    type Error = BlankTrackingNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(BlankTrackingNumber)
    }
}

impl From<TrackingNumber> for String {
    fn from(tracking: TrackingNumber) -> Self {
        tracking.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_means_absent() {
        assert_eq!(TrackingNumber::parse("-"), None);
        assert_eq!(TrackingNumber::parse("   "), None);
    }

    #[test]
    fn test_dash_inside_code_is_kept() {
        let tn = TrackingNumber::parse("CJ-1234").map(TrackingNumber::into_inner);
        assert_eq!(tn.as_deref(), Some("CJ-1234"));
    }

    #[test]
    fn test_deserialize_normalises_like_parse() {
        let tn: TrackingNumber = serde_json::from_str(r#"" 6892-1100-2231 ""#).unwrap();
        assert_eq!(tn.as_str(), "6892-1100-2231");

        for blank in [r#""-""#, r#""""#, r#"" - ""#] {
            assert!(serde_json::from_str::<TrackingNumber>(blank).is_err(), "{blank}");
        }

        let absent: Option<TrackingNumber> = serde_json::from_str("null").unwrap();
        assert_eq!(absent, None);
        assert!(serde_json::from_str::<Option<TrackingNumber>>(r#""-""#).is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let tn = TrackingNumber::parse("CJ-1234").unwrap();
        assert_eq!(serde_json::to_string(&tn).unwrap(), r#""CJ-1234""#);
    }
}
