//! Ticket desk
//!
//! One global ticket list. Tenants reach it through a [`TenantContext`] that
//! is re-checked at every call and see only their own tickets. The operator
//! reaches it through an [`OperatorContext`], sees every ticket and owns the
//! status.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lavapro_common::storage::{load_collection, save_collection, TICKETS_KEY};
use lavapro_common::{EntityId, KeyValueStore};
use lavapro_identity::{OperatorContext, TenantContext};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::ticket::{Ticket, TicketStatus};
use crate::{Result, SupportError};

pub struct TicketDesk {
    store: Arc<dyn KeyValueStore>,
    tickets: RwLock<Vec<Ticket>>,
}

impl TicketDesk {
    pub fn open(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let tickets: Vec<Ticket> = load_collection(store.as_ref(), TICKETS_KEY)?;
        debug!(count = tickets.len(), "tickets loaded");
        Ok(Self {
            store,
            tickets: RwLock::new(tickets),
        })
    }

    /// Tenant opens a ticket
    pub fn open_ticket(
        &self,
        ctx: &TenantContext,
        title: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Ticket> {
        ctx.check(now)?;
        let ticket = Ticket::open(ctx.account_id().clone(), ctx.email(), title, description, now)?;

        let mut tickets = self.tickets.write();
        let mut next = tickets.clone();
        next.push(ticket.clone());
        self.commit(&mut tickets, next)?;

        info!(ticket_id = %ticket.id(), account_id = %ctx.account_id(), "ticket opened");
        Ok(ticket)
    }

    /// Operator answer; the ticket becomes `Replied`
    pub fn operator_reply(
        &self,
        operator: &OperatorContext,
        id: &EntityId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Ticket> {
        let ticket = self.modify(id, |t| t.operator_reply(text, now))?;
        info!(ticket_id = %id, operator_id = %operator.account_id(), "operator replied");
        Ok(ticket)
    }

    /// Tenant follow-up on an own ticket; status unchanged
    pub fn tenant_reply(&self, ctx: &TenantContext, id: &EntityId, text: &str, now: DateTime<Utc>) -> Result<Ticket> {
        ctx.check(now)?;
        let ticket = self.modify(id, |t| {
            if t.user_id() != ctx.account_id() {
                return Err(SupportError::TicketNotFound(id.clone()));
            }
            t.tenant_reply(text, now)
        })?;
        info!(ticket_id = %id, "tenant replied");
        Ok(ticket)
    }

    /// Operator override to any status
    pub fn set_status(&self, operator: &OperatorContext, id: &EntityId, status: TicketStatus) -> Result<Ticket> {
        let ticket = self.modify(id, |t| {
            t.set_status(status);
            Ok(())
        })?;
        info!(ticket_id = %id, operator_id = %operator.account_id(), status = ?status, "ticket status set");
        Ok(ticket)
    }

    /// Every ticket, newest first
    pub fn list_all(&self, _operator: &OperatorContext) -> Vec<Ticket> {
        newest_first(self.tickets.read().iter().cloned().collect())
    }

    /// The caller's own tickets, newest first
    pub fn list_for_account(&self, ctx: &TenantContext, now: DateTime<Utc>) -> Result<Vec<Ticket>> {
        ctx.check(now)?;
        let own = self
            .tickets
            .read()
            .iter()
            .filter(|t| t.user_id() == ctx.account_id())
            .cloned()
            .collect();
        Ok(newest_first(own))
    }

    fn modify(&self, id: &EntityId, change: impl FnOnce(&mut Ticket) -> Result<()>) -> Result<Ticket> {
        let mut tickets = self.tickets.write();
        let mut next = tickets.clone();
        let ticket = next
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| SupportError::TicketNotFound(id.clone()))?;
        change(ticket)?;
        let updated = ticket.clone();
        self.commit(&mut tickets, next)?;
        Ok(updated)
    }

    fn commit(&self, current: &mut Vec<Ticket>, next: Vec<Ticket>) -> Result<()> {
        save_collection(self.store.as_ref(), TICKETS_KEY, &next)?;
        *current = next;
        Ok(())
    }
}

fn newest_first(mut tickets: Vec<Ticket>) -> Vec<Ticket> {
    tickets.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    tickets
}
