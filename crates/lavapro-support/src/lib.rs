//! Lava Rapido Pro Support
//!
//! Support threads between tenants and the operator, with a three-state
//! status (`Aberto`, `Respondido`, `Finalizado`) controlled by the operator.

pub mod desk;
pub mod ticket;

pub use desk::TicketDesk;
pub use ticket::{Author, Reply, Ticket, TicketStatus};

use lavapro_common::{EntityId, StorageError};
use lavapro_identity::EntitlementError;

/// Support error types
#[derive(Debug, thiserror::Error)]
pub enum SupportError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("ticket not found: {0}")]
    TicketNotFound(EntityId),

    #[error(transparent)]
    Entitlement(#[from] EntitlementError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, SupportError>;
