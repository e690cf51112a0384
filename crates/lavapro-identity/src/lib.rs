//! Lava Rapido Pro Identity & Entitlements
//!
//! Owns the account list, decides whether an account may use the product at a
//! given instant, and issues the [`TenantContext`] every tenant-data operation
//! requires.
//!
//! ```text
//!  register / authenticate          operator surface
//!            │                     set status | extend | list
//!            ▼                               │
//!   ┌─────────────────┐   Account + now   ┌──▼──────────────┐
//!   │  IdentityStore  │──────────────────►│   entitlement   │
//!   └─────────────────┘                   │  evaluate/admit │
//!                                         └───────┬─────────┘
//!                                                 │ TenantContext
//!                                                 ▼
//!                                         tenant data store
//! ```

pub mod email;
pub mod entitlement;
pub mod model;
pub mod operator;
pub mod store;

pub use email::{Email, EmailError};
pub use entitlement::{
    admit, evaluate, AccessDecision, Entitlement, EntitlementError, OperatorContext, TenantContext,
};
pub use model::{Account, NewAccount, Role, Session, SubscriptionStatus};
pub use operator::{plan_request_link, plan_request_message, StandingFilter};
pub use store::IdentityStore;

use lavapro_common::StorageError;
use thiserror::Error;

/// Identity error types
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Missing or malformed input; nothing was changed
    #[error("validation error: {0}")]
    Validation(String),

    /// Another account already uses this email (case-insensitive)
    #[error("email already registered")]
    EmailTaken,

    /// Unknown email or wrong secret
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account with this id
    #[error("account not found: {0}")]
    NotFound(lavapro_common::EntityId),

    /// Operation reserved to the operator role
    #[error("operator role required")]
    Forbidden,

    /// Account may not use the product right now
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),

    /// Persistence collaborator failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<EmailError> for IdentityError {
    fn from(e: EmailError) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Result type for identity operations
pub type Result<T> = std::result::Result<T, IdentityError>;
