//! Lava Rapido Pro Common - shared building blocks for the business core
//!
//! This crate provides the collaborators every other crate is written against:
//! - Wall clock and accounting period boundaries
//! - Persistence port (whole-value key/value store) and its adapters
//! - Configuration
//! - Messaging deep links
//!
//! # Layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        LAVAPRO CORE                           │
//! │                                                               │
//! │   ┌────────────┐     ┌──────────────┐     ┌───────────────┐   │
//! │   │  identity  │────►│    tenant    │     │    support    │   │
//! │   │ + gate     │     │  data store  │     │  ticket desk  │   │
//! │   └─────┬──────┘     └──────┬───────┘     └───────┬───────┘   │
//! │         │                   │                     │           │
//! │   ┌─────▼───────────────────▼─────────────────────▼───────┐   │
//! │   │  common: Clock | KeyValueStore | Config | DeepLink    │   │
//! │   └───────────────────────────────────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod messaging;
pub mod storage;

pub use clock::{Clock, ManualClock, Period, SystemClock};
pub use config::{LavaproConfig, OperatorSeed, PlanPrices};
pub use error::{MessagingError, StorageError, StorageResult};
pub use messaging::DeepLink;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, TenantCollection};

use serde::{Deserialize, Serialize};

/// Identifier shared by every persisted entity
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trim and reject empty required text
pub fn required(field: &'static str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
        assert_eq!(EntityId::from_string("abc").as_str(), "abc");
    }

    #[test]
    fn test_entity_id_serializes_as_plain_string() {
        let id = EntityId::from_string("2024-06-10T15:00:00.000Z");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"2024-06-10T15:00:00.000Z\"");
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Ana ").unwrap(), "Ana");
        assert_eq!(required("name", "   ").unwrap_err(), "name is required");
    }
}
