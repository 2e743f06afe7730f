//! Country code validation
//!
//! The geolocation signal arrives as a request header set by the hosting
//! edge (default `cf-ipcountry`). It is untrusted input: it is matched
//! against a strict shape or replaced by the fallback before it can reach
//! URL construction. There is no process-wide memoized lookup; the
//! per-request signal is the only source.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Fallback country when the signal is absent or malformed.
pub const FALLBACK_COUNTRY: &str = "US";

static COUNTRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,3}$").expect("valid regex"));

/// A validated 2-3 uppercase-letter country token.
///
/// Constructing one is only possible through [`CountryCode::parse`], so a
/// value of this type is always safe to interpolate into a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate an inbound geolocation signal.
    ///
    /// Returns the input unchanged if it matches `^[A-Z]{2,3}$`, otherwise
    /// the literal fallback `"US"`.
    pub fn parse(signal: Option<&str>) -> Self {
        match signal {
            Some(code) if COUNTRY_RE.is_match(code) => Self(code.to_string()),
            _ => Self(FALLBACK_COUNTRY.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_codes_pass_through() {
        assert_eq!(CountryCode::parse(Some("FR")).as_str(), "FR");
        assert_eq!(CountryCode::parse(Some("FRA")).as_str(), "FRA");
        assert_eq!(CountryCode::parse(Some("GB")).as_str(), "GB");
    }

    #[test]
    fn test_invalid_codes_fall_back() {
        assert_eq!(CountryCode::parse(Some("fr")).as_str(), "US");
        assert_eq!(CountryCode::parse(Some("")).as_str(), "US");
        assert_eq!(CountryCode::parse(Some("FRAN")).as_str(), "US");
        assert_eq!(CountryCode::parse(Some("F1")).as_str(), "US");
        assert_eq!(CountryCode::parse(Some("../etc")).as_str(), "US");
        assert_eq!(CountryCode::parse(None).as_str(), "US");
    }
}
