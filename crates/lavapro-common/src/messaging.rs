//! WhatsApp-style deep links
//!
//! The messaging collaborator only needs a digits-only destination and a text
//! body; opening the link is left to the caller.

use serde::Serialize;

use crate::error::MessagingError;

/// Base of every deep link
pub const WHATSAPP_BASE_URL: &str = "https://wa.me/";

/// Strip everything but ASCII digits from a contact handle
pub fn digits_only(handle: &str) -> String {
    handle.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Destination plus message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepLink {
    destination: String,
    body: String,
}

impl DeepLink {
    /// Build a link to `handle`, normalized to digits
    pub fn new(handle: &str, body: impl Into<String>) -> Result<Self, MessagingError> {
        let destination = digits_only(handle);
        if destination.is_empty() {
            return Err(MessagingError::NoDigits(handle.to_string()));
        }
        Ok(Self {
            destination,
            body: body.into(),
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// `https://wa.me/<digits>?text=<url-encoded body>`
    pub fn url(&self) -> String {
        format!(
            "{}{}?text={}",
            WHATSAPP_BASE_URL,
            self.destination,
            urlencoding::encode(&self.body)
        )
    }
}

impl std::fmt::Display for DeepLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url())
    }
}
