//! Operator surface: tenant standing filter, dashboard metrics and the plan
//! request link a locked-out tenant sends to the operator.

use chrono::{DateTime, Utc};
use lavapro_common::{DeepLink, MessagingError, PlanPrices};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{Account, Role, SubscriptionStatus};

/// Filter applied to the operator's tenant list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandingFilter {
    #[default]
    All,
    /// Trial status and not yet expired
    Trial,
    /// End date already passed
    Expired,
    /// End date not yet passed, any status
    Active,
}

impl StandingFilter {
    /// Whether `account` belongs in this view at `now`
    pub fn matches(&self, account: &Account, now: DateTime<Utc>) -> bool {
        let expired = now > account.subscription_ends_at;
        match self {
            Self::All => true,
            Self::Trial => account.subscription_status == SubscriptionStatus::Trial && !expired,
            Self::Expired => expired,
            Self::Active => !expired,
        }
    }
}

/// Tenant-role accounts matching `filter`
pub(crate) fn tenants_matching<'a>(
    accounts: &'a [Account],
    filter: StandingFilter,
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a Account> {
    accounts
        .iter()
        .filter(|a| a.role == Role::Tenant)
        .filter(move |a| filter.matches(a, now))
}

/// Sum of per-month prices over paying tenants
pub(crate) fn recurring_revenue(accounts: &[Account], prices: &PlanPrices) -> Decimal {
    accounts
        .iter()
        .filter(|a| a.role == Role::Tenant)
        .filter_map(|a| a.subscription_status.price_per_month(prices))
        .sum()
}

/// Message a tenant sends to ask for `plan`
pub fn plan_request_message(plan: SubscriptionStatus, account: &Account) -> String {
    format!(
        "Olá! Tenho interesse em contratar o plano {} do Lava Rápido Pro. Meu email de cadastro é: {}",
        plan.plan_name(),
        account.email
    )
}

/// Deep link to the operator carrying the plan request
pub fn plan_request_link(
    plan: SubscriptionStatus,
    account: &Account,
    operator_contact: &str,
) -> Result<DeepLink, MessagingError> {
    DeepLink::new(operator_contact, plan_request_message(plan, account))
}
