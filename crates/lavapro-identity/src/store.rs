//! Identity Store
//!
//! Holds the account list in memory and writes the whole list through the
//! persistence port on every change. A mutation is applied to a copy, saved,
//! and only then swapped in, so a failed save leaves the store untouched.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use lavapro_common::clock::days;
use lavapro_common::storage::{load_collection, save_collection, ACCOUNTS_KEY};
use lavapro_common::{required, EntityId, KeyValueStore, LavaproConfig, OperatorSeed, PlanPrices};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::email::Email;
use crate::entitlement::{self, OperatorContext, TenantContext};
use crate::model::{Account, NewAccount, Role, Session, SubscriptionStatus};
use crate::operator::{self, StandingFilter};
use crate::{IdentityError, Result};

/// Account registry
pub struct IdentityStore {
    store: Arc<dyn KeyValueStore>,
    accounts: RwLock<Vec<Account>>,
    trial_period: Duration,
}

impl IdentityStore {
    /// Load the account list from `store`
    pub fn open(store: Arc<dyn KeyValueStore>, config: &LavaproConfig) -> Result<Self> {
        let accounts: Vec<Account> = load_collection(store.as_ref(), ACCOUNTS_KEY)?;
        debug!(count = accounts.len(), "accounts loaded");
        Ok(Self {
            store,
            accounts: RwLock::new(accounts),
            trial_period: days(i64::from(config.trial_period_days)),
        })
    }

    /// Create a tenant account on a fresh trial
    pub fn register(&self, request: NewAccount, now: DateTime<Utc>) -> Result<Account> {
        let name = required("name", &request.name).map_err(IdentityError::Validation)?;
        let contact = required("contact", &request.contact).map_err(IdentityError::Validation)?;
        let email = Email::new(request.email)?;
        if request.secret.is_empty() {
            return Err(IdentityError::Validation("secret is required".into()));
        }

        let account = Account {
            id: EntityId::new(),
            name,
            contact,
            email: email.as_str().to_string(),
            secret: request.secret,
            role: Role::Tenant,
            subscription_status: SubscriptionStatus::Trial,
            installed_at: now,
            subscription_ends_at: now + self.trial_period,
        };

        self.insert(&email, account.clone())?;
        info!(account_id = %account.id, ends_at = %account.subscription_ends_at, "account registered");
        Ok(account)
    }

    /// Check credentials; email is matched case-insensitively, the secret exactly
    pub fn authenticate(&self, email: &str, secret: &str) -> Result<Account> {
        let email = Email::normalized(email);
        let accounts = self.accounts.read();
        match accounts.iter().find(|a| Email::normalized(&a.email) == email) {
            Some(account) if account.secret_matches(secret) => {
                debug!(account_id = %account.id, "authenticated");
                Ok(account.clone())
            }
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    /// Authenticate and start a session
    pub fn sign_in(&self, email: &str, secret: &str, now: DateTime<Utc>) -> Result<Session> {
        let account = self.authenticate(email, secret)?;
        Ok(Session::start(&account, now))
    }

    /// Get account by id
    pub fn get(&self, id: &EntityId) -> Result<Account> {
        self.accounts
            .read()
            .iter()
            .find(|a| &a.id == id)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(id.clone()))
    }

    /// Fresh copy of the signed-in account
    pub fn current(&self, session: &Session) -> Result<Account> {
        self.get(session.account_id())
    }

    /// Gate a protected access for the signed-in account
    pub fn admit(&self, session: &Session, now: DateTime<Utc>) -> Result<TenantContext> {
        let account = self.current(session)?;
        entitlement::admit(&account, now).map_err(|e| {
            warn!(account_id = %account.id, "access refused, subscription ended");
            IdentityError::from(e)
        })
    }

    /// Change the plan; the end date is left as is
    pub fn set_subscription_status(
        &self,
        actor: &Session,
        id: &EntityId,
        status: SubscriptionStatus,
    ) -> Result<Account> {
        self.authorize_operator(actor)?;
        let updated = self.modify(id, |account| account.subscription_status = status)?;
        info!(account_id = %id, status = ?status, "subscription status changed");
        Ok(updated)
    }

    /// Push the end date out by `days`
    ///
    /// Non-positive `days` change nothing and return `Ok(None)`.
    pub fn extend_subscription(
        &self,
        actor: &Session,
        id: &EntityId,
        days_to_add: i64,
    ) -> Result<Option<DateTime<Utc>>> {
        self.authorize_operator(actor)?;
        if days_to_add <= 0 {
            warn!(account_id = %id, days = days_to_add, "ignoring non-positive extension");
            return Ok(None);
        }

        let updated = self.modify(id, |account| {
            account.subscription_ends_at += days(days_to_add);
        })?;
        info!(account_id = %id, days = days_to_add, ends_at = %updated.subscription_ends_at, "subscription extended");
        Ok(Some(updated.subscription_ends_at))
    }

    /// All accounts, optionally restricted to one role
    pub fn list_accounts(&self, actor: &Session, role: Option<Role>) -> Result<Vec<Account>> {
        self.authorize_operator(actor)?;
        Ok(self
            .accounts
            .read()
            .iter()
            .filter(|a| role.map_or(true, |r| a.role == r))
            .cloned()
            .collect())
    }

    /// Tenant accounts in the requested standing
    pub fn tenants_by_standing(
        &self,
        actor: &Session,
        filter: StandingFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Account>> {
        self.authorize_operator(actor)?;
        let accounts = self.accounts.read();
        Ok(operator::tenants_matching(&accounts, filter, now).cloned().collect())
    }

    /// Number of tenant accounts
    pub fn tenant_count(&self, actor: &Session) -> Result<usize> {
        self.authorize_operator(actor)?;
        Ok(self.accounts.read().iter().filter(|a| a.role == Role::Tenant).count())
    }

    /// Sum of per-month prices over paying tenants
    pub fn monthly_recurring_revenue(&self, actor: &Session, prices: &PlanPrices) -> Result<Decimal> {
        self.authorize_operator(actor)?;
        Ok(operator::recurring_revenue(&self.accounts.read(), prices))
    }

    /// Create the operator account unless its email is already registered
    pub fn ensure_operator(&self, seed: &OperatorSeed, now: DateTime<Utc>) -> Result<Account> {
        let email = Email::new(seed.email.as_str())?;
        if let Some(existing) = self.find_by_email(&email) {
            return Ok(existing);
        }

        let account = Account {
            id: EntityId::new(),
            name: required("name", &seed.name).map_err(IdentityError::Validation)?,
            contact: seed.contact.trim().to_string(),
            email: email.as_str().to_string(),
            secret: seed.secret.clone(),
            role: Role::Operator,
            subscription_status: SubscriptionStatus::Trial,
            installed_at: now,
            subscription_ends_at: now + self.trial_period,
        };
        self.insert(&email, account.clone())?;
        info!(account_id = %account.id, "operator account created");
        Ok(account)
    }

    /// Confirm against the stored account that `actor` is the operator
    ///
    /// The role is re-read, so a session started before a role change cannot
    /// carry the old authority.
    pub fn authorize_operator(&self, actor: &Session) -> Result<OperatorContext> {
        let account = self.current(actor)?;
        if account.role != Role::Operator {
            warn!(account_id = %account.id, "operator action refused");
            return Err(IdentityError::Forbidden);
        }
        Ok(OperatorContext::new(account.id))
    }

    fn find_by_email(&self, email: &Email) -> Option<Account> {
        self.accounts.read().iter().find(|a| email.matches(&a.email)).cloned()
    }


    fn insert(&self, email: &Email, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write();
        if accounts.iter().any(|a| email.matches(&a.email)) {
            return Err(IdentityError::EmailTaken);
        }
        let mut next = accounts.clone();
        next.push(account);
        self.commit(&mut accounts, next)
    }

    fn modify(&self, id: &EntityId, change: impl FnOnce(&mut Account)) -> Result<Account> {
        let mut accounts = self.accounts.write();
        let mut next = accounts.clone();
        let account = next
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| IdentityError::NotFound(id.clone()))?;
        change(account);
        let updated = account.clone();
        self.commit(&mut accounts, next)?;
        Ok(updated)
    }

    fn commit(&self, current: &mut Vec<Account>, next: Vec<Account>) -> Result<()> {
        save_collection(self.store.as_ref(), ACCOUNTS_KEY, &next)?;
        *current = next;
        Ok(())
    }
}
