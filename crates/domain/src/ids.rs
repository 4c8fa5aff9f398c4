//! Opaque, bounded identifiers for users and dismissible items.
//!
//! Both ids are caller-supplied strings (not generated), so they are validated
//! at construction: non-empty, at most [`MAX_ID_LENGTH`] characters, and limited
//! to ASCII letters, digits and `-`, `_`, `.`, `:`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum length for user and item identifiers
pub const MAX_ID_LENGTH: usize = 64;

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

fn validate_id(label: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("{label} cannot be empty")));
    }
    if value.len() > MAX_ID_LENGTH {
        return Err(DomainError::validation(format!(
            "{label} cannot exceed {MAX_ID_LENGTH} characters"
        )));
    }
    if let Some(bad) = value.chars().find(|c| !is_id_char(*c)) {
        return Err(DomainError::invalid_id(format!(
            "{label} contains invalid character {bad:?}"
        )));
    }
    Ok(())
}

macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns `DomainError::Validation` for empty or overlong values and
            /// `DomainError::InvalidId` for values with characters outside the allowed set.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                validate_id($label, &value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl std::str::FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ItemId, "Item id");
define_id!(UserId, "User id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_ids() {
        assert!(ItemId::new("welcome-banner").is_ok());
        assert!(ItemId::new("onboarding:step_2.tooltip").is_ok());
        assert!(UserId::new("user-123").is_ok());
    }

    #[test]
    fn rejects_empty_id() {
        assert!(matches!(ItemId::new(""), Err(DomainError::Validation(_))));
    }

    #[test]
    fn rejects_overlong_id() {
        let long = "a".repeat(MAX_ID_LENGTH + 1);
        assert!(matches!(UserId::new(long), Err(DomainError::Validation(_))));
        assert!(UserId::new("a".repeat(MAX_ID_LENGTH)).is_ok());
    }

    #[test]
    fn rejects_disallowed_characters() {
        assert!(matches!(
            ItemId::new("has space"),
            Err(DomainError::InvalidId(_))
        ));
        assert!(matches!(ItemId::new("a/b"), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<ItemId, _> = serde_json::from_str("\"banner\"");
        assert!(ok.is_ok());
        let bad: Result<ItemId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
