//! Decoded QR payload grammar: `ITEM:<id>` or `LOC:<id>`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ITEM_PREFIX: &str = "ITEM:";
pub const LOCATION_PREFIX: &str = "LOC:";

/// A recognized scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPayload {
    Item(String),
    Location(String),
}

/// Payload that matches neither prefix, or carries no identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized QR format: {0}")]
pub struct UnrecognizedPayload(pub String);

impl FromStr for ScanPayload {
    type Err = UnrecognizedPayload;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();

        let parsed = if let Some(id) = trimmed.strip_prefix(ITEM_PREFIX) {
            Some(ScanPayload::Item(id.trim().to_string()))
        } else {
            trimmed
                .strip_prefix(LOCATION_PREFIX)
                .map(|id| ScanPayload::Location(id.trim().to_string()))
        };

        match parsed {
            Some(payload) if !payload.identifier().is_empty() => Ok(payload),
            _ => Err(UnrecognizedPayload(trimmed.to_string())),
        }
    }
}

impl ScanPayload {
    pub fn identifier(&self) -> &str {
        match self {
            ScanPayload::Item(id) | ScanPayload::Location(id) => id,
        }
    }

    /// Cheap check used to route raw input lines before parsing.
    pub fn has_known_prefix(raw: &str) -> bool {
        let trimmed = raw.trim_start();
        trimmed.starts_with(ITEM_PREFIX) || trimmed.starts_with(LOCATION_PREFIX)
    }
}

impl fmt::Display for ScanPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPayload::Item(id) => write!(f, "{}{}", ITEM_PREFIX, id),
            ScanPayload::Location(id) => write!(f, "{}{}", LOCATION_PREFIX, id),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        let payload: ScanPayload = "ITEM:item123".parse().unwrap();
        assert_eq!(payload, ScanPayload::Item("item123".to_string()));
    }

    #[test]
    fn test_parse_location_with_whitespace() {
        let payload: ScanPayload = "  LOC:B2\r\n".parse().unwrap();
        assert_eq!(payload, ScanPayload::Location("B2".to_string()));
        assert_eq!(payload.to_string(), "LOC:B2");
    }

    #[test]
    fn test_unknown_prefix() {
        let err = "FOO:bar".parse::<ScanPayload>().unwrap_err();
        assert_eq!(err, UnrecognizedPayload("FOO:bar".to_string()));
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert!("item:item1".parse::<ScanPayload>().is_err());
        assert!("loc:A1".parse::<ScanPayload>().is_err());
    }

    #[test]
    fn test_empty_identifier_rejected() {
        assert!("ITEM:".parse::<ScanPayload>().is_err());
        assert!("LOC:   ".parse::<ScanPayload>().is_err());
    }

    #[test]
    fn test_identifier_may_contain_colons() {
        let payload: ScanPayload = "LOC:zone:3".parse().unwrap();
        assert_eq!(payload.identifier(), "zone:3");
    }

    #[test]
    fn test_has_known_prefix() {
        assert!(ScanPayload::has_known_prefix("ITEM:x"));
        assert!(ScanPayload::has_known_prefix(" LOC:x"));
        assert!(!ScanPayload::has_known_prefix("status"));
    }
}
