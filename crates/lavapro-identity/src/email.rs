//! Email Value Object
//!
//! Trimmed, lower-cased address. Equality is therefore case-insensitive.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Email value object with validation
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new validated email
    pub fn new(value: impl Into<String>) -> Result<Self, EmailError> {
        let value = value.into().trim().to_lowercase();

        if value.is_empty() {
            return Err(EmailError::Empty);
        }

        if !Self::is_valid_format(&value) {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(value))
    }

    /// Normalize without validating (lookups against stored data)
    pub fn normalized(value: &str) -> String {
        value.trim().to_lowercase()
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a stored address
    pub fn matches(&self, stored: &str) -> bool {
        Self::normalized(stored) == self.0
    }

    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        // a single '@' with something on each side; single-label hosts pass
        !local.is_empty() && !domain.is_empty() && !domain.contains('@')
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("email is required")]
    Empty,
    #[error("invalid email format")]
    InvalidFormat,
}
