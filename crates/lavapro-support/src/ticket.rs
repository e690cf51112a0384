//! Ticket Aggregate
//!
//! Deliberately loose workflow: the operator may set any status at any time,
//! an operator reply always moves the ticket to `Replied`, and tenant replies
//! never change the status. Replies are accepted after closure.

use chrono::{DateTime, Utc};
use lavapro_common::{required, EntityId};
use serde::{Deserialize, Serialize};

use crate::{Result, SupportError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    #[default]
    #[serde(rename = "Aberto")]
    Open,
    #[serde(rename = "Respondido")]
    Replied,
    #[serde(rename = "Finalizado")]
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [Self::Open, Self::Replied, Self::Closed];
}

/// Who wrote a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    #[serde(rename = "admin")]
    Operator,
    #[serde(rename = "user")]
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    id: EntityId,
    user_id: EntityId,
    user_email: String,
    title: String,
    description: String,
    status: TicketStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    replies: Vec<Reply>,
}

impl Ticket {
    /// New ticket, always `Open`
    pub fn open(
        user_id: EntityId,
        user_email: impl Into<String>,
        title: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            id: EntityId::new(),
            user_id,
            user_email: user_email.into(),
            title: required("title", title).map_err(SupportError::Validation)?,
            description: required("description", description).map_err(SupportError::Validation)?,
            status: TicketStatus::Open,
            created_at: now,
            replies: Vec::new(),
        })
    }

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn user_id(&self) -> &EntityId { &self.user_id }
    pub fn user_email(&self) -> &str { &self.user_email }
    pub fn title(&self) -> &str { &self.title }
    pub fn description(&self) -> &str { &self.description }
    pub fn status(&self) -> TicketStatus { self.status }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn replies(&self) -> &[Reply] { &self.replies }

    /// Operator answer; moves the ticket to `Replied` from any status
    pub fn operator_reply(&mut self, text: &str, now: DateTime<Utc>) -> Result<()> {
        self.push_reply(Author::Operator, text, now)?;
        self.status = TicketStatus::Replied;
        Ok(())
    }

    /// Tenant follow-up; status is left alone
    pub fn tenant_reply(&mut self, text: &str, now: DateTime<Utc>) -> Result<()> {
        self.push_reply(Author::User, text, now)
    }

    /// Manual override, no transition is refused
    pub fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
    }

    fn push_reply(&mut self, author: Author, text: &str, now: DateTime<Utc>) -> Result<()> {
        let text = required("reply", text).map_err(SupportError::Validation)?;
        self.replies.push(Reply {
            author,
            text,
            created_at: now,
        });
        Ok(())
    }
}
