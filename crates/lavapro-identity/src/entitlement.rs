//! Entitlement evaluation and the access gate
//!
//! `evaluate` is a pure function of an account and an instant. `admit` is the
//! only way to obtain a [`TenantContext`]; the context remembers when access
//! ends and is re-checked against `now` on every tenant-data operation.

use chrono::{DateTime, Utc};
use lavapro_common::clock::SECONDS_PER_DAY;
use lavapro_common::EntityId;
use serde::Serialize;
use thiserror::Error;

use crate::model::{Account, Role, SubscriptionStatus};

const MILLIS_PER_DAY: i64 = SECONDS_PER_DAY * 1000;

/// Derived access state of one account at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entitlement {
    /// `now` is strictly after the subscription end
    pub expired: bool,
    /// Status is trial, whatever the end date says
    pub is_trial: bool,
    /// Whole days left, rounded up, never negative
    pub days_remaining: i64,
}

impl Entitlement {
    /// Non-blocking reminder shown to trial tenants
    pub fn shows_trial_reminder(&self) -> bool {
        self.is_trial && !self.expired && self.days_remaining > 0
    }
}

/// Evaluate `account` at `now`
pub fn evaluate(account: &Account, now: DateTime<Utc>) -> Entitlement {
    let left_ms = (account.subscription_ends_at - now).num_milliseconds();
    let days_remaining = if left_ms <= 0 {
        0
    } else {
        (left_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    };

    Entitlement {
        expired: now > account.subscription_ends_at,
        is_trial: account.subscription_status == SubscriptionStatus::Trial,
        days_remaining,
    }
}

/// Gate decision for a protected access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Operators are never gated
    Unrestricted,
    /// Tenant within its paid or trial window
    Allowed(Entitlement),
    /// Tenant whose window has ended
    Blocked(Entitlement),
}

impl AccessDecision {
    /// Decide access for `account` at `now`
    pub fn for_account(account: &Account, now: DateTime<Utc>) -> Self {
        if account.role == Role::Operator {
            return Self::Unrestricted;
        }
        let entitlement = evaluate(account, now);
        if entitlement.expired {
            Self::Blocked(entitlement)
        } else {
            Self::Allowed(entitlement)
        }
    }

    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Blocked(_))
    }
}

/// Access was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    #[error("subscription of account {account_id} ended at {ended_at}")]
    Expired {
        account_id: EntityId,
        ended_at: DateTime<Utc>,
    },
}

/// Proof that an account passed the gate
///
/// Every tenant-data operation takes one of these and calls
/// [`TenantContext::check`] with its own `now`, so a context kept past the
/// subscription end stops working. Fields are private and the only
/// constructor is [`admit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    account_id: EntityId,
    email: String,
    role: Role,
    admitted_at: DateTime<Utc>,
    /// `None` for operators, who are never gated
    access_ends_at: Option<DateTime<Utc>>,
}

impl TenantContext {
    pub fn account_id(&self) -> &EntityId {
        &self.account_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn admitted_at(&self) -> DateTime<Utc> {
        self.admitted_at
    }

    /// Re-run the gate at `now`
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), EntitlementError> {
        match self.access_ends_at {
            Some(ended_at) if now > ended_at => Err(EntitlementError::Expired {
                account_id: self.account_id.clone(),
                ended_at,
            }),
            _ => Ok(()),
        }
    }
}

/// Run the gate and hand out a tenant context
pub fn admit(account: &Account, now: DateTime<Utc>) -> Result<TenantContext, EntitlementError> {
    let access_ends_at = match AccessDecision::for_account(account, now) {
        AccessDecision::Blocked(_) => {
            return Err(EntitlementError::Expired {
                account_id: account.id.clone(),
                ended_at: account.subscription_ends_at,
            })
        }
        AccessDecision::Unrestricted => None,
        AccessDecision::Allowed(_) => Some(account.subscription_ends_at),
    };
    Ok(TenantContext {
        account_id: account.id.clone(),
        email: account.email.clone(),
        role: account.role,
        admitted_at: now,
        access_ends_at,
    })
}

/// Proof that the caller is the operator, issued by
/// [`IdentityStore::authorize_operator`](crate::IdentityStore::authorize_operator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorContext {
    account_id: EntityId,
}

impl OperatorContext {
    pub(crate) fn new(account_id: EntityId) -> Self {
        Self { account_id }
    }

    pub fn account_id(&self) -> &EntityId {
        &self.account_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn account(role: Role, status: SubscriptionStatus, ends_at: DateTime<Utc>) -> Account {
        Account {
            id: EntityId::from_string("acc-1"),
            name: "Ana".into(),
            contact: "5511999998888".into(),
            email: "ana@x.com".into(),
            secret: "pw".into(),
            role,
            subscription_status: status,
            installed_at: ends_at - Duration::days(5),
            subscription_ends_at: ends_at,
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, h, 0, 0).unwrap()
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let acc = account(Role::Tenant, SubscriptionStatus::Trial, at(12) + Duration::days(2));
        let e = evaluate(&acc, at(11));
        assert!(!e.expired);
        assert_eq!(e.days_remaining, 3);
        assert!(e.shows_trial_reminder());
    }

    #[test]
    fn test_exactly_at_end_is_not_expired() {
        let acc = account(Role::Tenant, SubscriptionStatus::Monthly, at(12));
        let e = evaluate(&acc, at(12));
        assert!(!e.expired);
        assert_eq!(e.days_remaining, 0);
        assert!(!e.shows_trial_reminder());

        let later = evaluate(&acc, at(12) + Duration::milliseconds(1));
        assert!(later.expired);
        assert_eq!(later.days_remaining, 0);
    }

    #[test]
    fn test_paid_plan_has_no_reminder() {
        let acc = account(Role::Tenant, SubscriptionStatus::Yearly, at(12) + Duration::days(30));
        assert!(!evaluate(&acc, at(0)).shows_trial_reminder());
    }

    #[test]
    fn test_operator_never_gated() {
        let acc = account(Role::Operator, SubscriptionStatus::Trial, at(0));
        assert_eq!(AccessDecision::for_account(&acc, at(23)), AccessDecision::Unrestricted);
        assert!(admit(&acc, at(23)).is_ok());
    }

    #[test]
    fn test_expired_tenant_blocked() {
        let acc = account(Role::Tenant, SubscriptionStatus::Monthly, at(0));
        let err = admit(&acc, at(1)).unwrap_err();
        assert_eq!(
            err,
            EntitlementError::Expired {
                account_id: acc.id.clone(),
                ended_at: at(0)
            }
        );
    }

    #[test]
    fn test_admitted_context_carries_account() {
        let acc = account(Role::Tenant, SubscriptionStatus::Trial, at(20));
        let ctx = admit(&acc, at(1)).unwrap();
        assert_eq!(ctx.account_id().as_str(), "acc-1");
        assert_eq!(ctx.role(), Role::Tenant);
        assert_eq!(ctx.admitted_at(), at(1));
        assert_eq!(ctx.email(), "ana@x.com");
    }

    #[test]
    fn test_context_stops_working_after_end() {
        let acc = account(Role::Tenant, SubscriptionStatus::Monthly, at(12));
        let ctx = admit(&acc, at(1)).unwrap();
        assert!(ctx.check(at(12)).is_ok());
        assert_eq!(
            ctx.check(at(12) + Duration::days(60)),
            Err(EntitlementError::Expired {
                account_id: acc.id.clone(),
                ended_at: at(12)
            })
        );
    }

    #[test]
    fn test_operator_context_never_expires() {
        let acc = account(Role::Operator, SubscriptionStatus::Trial, at(0));
        let ctx = admit(&acc, at(1)).unwrap();
        assert!(ctx.check(at(0) + Duration::days(365)).is_ok());
    }

    proptest! {
        #[test]
        fn prop_expired_iff_now_after_end(offset_secs in -1_000_000i64..1_000_000, paid in any::<bool>()) {
            let status = if paid { SubscriptionStatus::Quarterly } else { SubscriptionStatus::Trial };
            let acc = account(Role::Tenant, status, at(12));
            let now = at(12) + Duration::seconds(offset_secs);
            let e = evaluate(&acc, now);
            prop_assert_eq!(e.expired, now > acc.subscription_ends_at);
            prop_assert!(e.days_remaining >= 0);
        }
    }
}
