//! Account Data Model
//!
//! Field names on the wire match the product's stored account list
//! (`phone`, `password`, `installationDate`, `subscriptionEndDate`, role
//! values `admin`/`user`), so existing data loads unchanged.

use chrono::{DateTime, Utc};
use lavapro_common::{EntityId, PlanPrices};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Administrates every tenant; never gated
    #[serde(rename = "admin")]
    Operator,
    /// Business owner using the product
    #[serde(rename = "user")]
    Tenant,
}

/// Subscription plan currently assigned to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Monthly,
    Quarterly,
    Yearly,
}

impl SubscriptionStatus {
    /// Name shown to customers
    pub fn plan_name(&self) -> &'static str {
        match self {
            Self::Trial => "Teste",
            Self::Monthly => "Mensal",
            Self::Quarterly => "Trimestral",
            Self::Yearly => "Anual",
        }
    }

    /// Per-month price; trials are free
    pub fn price_per_month(&self, prices: &PlanPrices) -> Option<Decimal> {
        match self {
            Self::Trial => None,
            Self::Monthly => Some(prices.monthly),
            Self::Quarterly => Some(prices.quarterly),
            Self::Yearly => Some(prices.yearly),
        }
    }
}

/// Account definition
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable unique id
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Messaging handle
    #[serde(rename = "phone")]
    pub contact: String,
    /// Unique, compared case-insensitively
    pub email: String,
    #[serde(rename = "password")]
    pub(crate) secret: String,
    /// Operator or tenant
    pub role: Role,
    /// Assigned plan; independent of the end date
    pub subscription_status: SubscriptionStatus,
    /// Registration instant
    #[serde(rename = "installationDate")]
    pub installed_at: DateTime<Utc>,
    /// Access ends strictly after this instant
    #[serde(rename = "subscriptionEndDate")]
    pub subscription_ends_at: DateTime<Utc>,
}

impl Account {
    pub fn is_operator(&self) -> bool {
        self.role == Role::Operator
    }

    pub(crate) fn secret_matches(&self, secret: &str) -> bool {
        self.secret == secret
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("contact", &self.contact)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("subscription_status", &self.subscription_status)
            .field("installed_at", &self.installed_at)
            .field("subscription_ends_at", &self.subscription_ends_at)
            .finish_non_exhaustive()
    }
}

/// Registration request
#[derive(Clone)]
pub struct NewAccount {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub secret: String,
}

impl NewAccount {
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        email: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            email: email.into(),
            secret: secret.into(),
        }
    }
}

/// Signed-in account, passed explicitly to every operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    account_id: EntityId,
    role: Role,
    email: String,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `account`
    pub fn start(account: &Account, now: DateTime<Utc>) -> Self {
        Self {
            account_id: account.id.clone(),
            role: account.role,
            email: account.email.clone(),
            started_at: now,
        }
    }

    pub fn account_id(&self) -> &EntityId {
        &self.account_id
    }

    /// Role at sign-in; authority checks re-read the stored account
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
