//! Lava Rapido Pro Tenant Data
//!
//! Clients, the service and offer catalogs, and the service records of one
//! business, plus the revenue and follow-up queries built on them.
//!
//! ```text
//!   TenantContext ──► TenantDataStore ──► clients:<id>  services:<id>
//!                          │              offers:<id>   records:<id>
//!                          ▼
//!                 reports (revenue, stale clients, client detail, CSV)
//!                 messages (offer text + deep link)
//! ```
//!
//! Service records are frozen financial snapshots: subtotal, discount and
//! total are computed once from the catalog at creation and never recomputed.

pub mod messages;
pub mod model;
pub mod money;
pub mod reports;
pub mod store;

pub use messages::{compose_offer_message, offer_link};
pub use model::{Client, ClientInput, Offer, Service, ServiceRecord};
pub use money::Money;
pub use reports::{ClientDetail, RecordView, RevenueSummary, UNKNOWN_SERVICE};
pub use store::{NewServiceRecord, TenantDataStore};

use lavapro_common::{EntityId, StorageError};
use lavapro_identity::EntitlementError;
use thiserror::Error;

/// Tenant data errors
#[derive(Debug, Error)]
pub enum TenantError {
    /// Missing or out-of-range input; nothing was stored
    #[error("validation error: {0}")]
    Validation(String),

    /// A service record needs at least one service
    #[error("no services selected")]
    NoServicesSelected,

    /// Client does not exist in this tenant
    #[error("client not found: {0}")]
    ClientNotFound(EntityId),

    /// Account may not use the product right now
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),

    /// Report could not be rendered
    #[error("export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for tenant data operations
pub type Result<T> = std::result::Result<T, TenantError>;
