use crate::domain::account::AccountId;
use crate::error::{Result, RewardsError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TicketId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Resolved,
    Closed,
}

/// A user-initiated message thread. Open -> Resolved (with a reply) or
/// Open -> Closed (without one); both terminal. No ledger interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: TicketId,
    pub account_id: AccountId,
    pub message: String,
    pub status: TicketStatus,
    pub admin_reply: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SupportTicket {
    pub fn open(id: TicketId, account_id: AccountId, message: impl Into<String>) -> Self {
        Self {
            id,
            account_id,
            message: message.into(),
            status: TicketStatus::Open,
            admin_reply: None,
            created_at: Utc::now(),
        }
    }

    pub fn reply(&mut self, text: &str) -> Result<()> {
        if self.status != TicketStatus::Open {
            return Err(RewardsError::NotPending);
        }
        self.admin_reply = Some(text.to_string());
        self.status = TicketStatus::Resolved;
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        if self.status != TicketStatus::Open {
            return Err(RewardsError::NotPending);
        }
        self.status = TicketStatus::Closed;
        Ok(())
    }
}
