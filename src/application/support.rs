use crate::domain::account::AccountId;
use crate::domain::ports::TicketStoreRef;
use crate::domain::support::{SupportTicket, TicketId};
use crate::error::{Result, RewardsError};

/// Message/reply threads between users and the administrator. No ledger
/// interaction.
pub struct SupportTicketing {
    tickets: TicketStoreRef,
}

impl SupportTicketing {
    pub fn new(tickets: TicketStoreRef) -> Self {
        Self { tickets }
    }

    pub async fn open(&self, account: AccountId, message: String) -> Result<SupportTicket> {
        if message.trim().is_empty() {
            return Err(RewardsError::Validation(
                "support message must not be empty".to_string(),
            ));
        }
        let ticket = self.tickets.insert(account, message).await?;
        tracing::info!(account, ticket = ticket.id, "support ticket opened");
        Ok(ticket)
    }

    async fn load(&self, id: TicketId) -> Result<SupportTicket> {
        self.tickets
            .get(id)
            .await?
            .ok_or_else(|| RewardsError::not_found("support ticket", id))
    }

    pub async fn reply(&self, id: TicketId, text: &str) -> Result<SupportTicket> {
        let mut ticket = self.load(id).await?;
        ticket.reply(text)?;
        self.tickets.save(ticket.clone()).await?;
        tracing::info!(ticket = id, "support ticket resolved");
        Ok(ticket)
    }

    pub async fn close(&self, id: TicketId) -> Result<SupportTicket> {
        let mut ticket = self.load(id).await?;
        ticket.close()?;
        self.tickets.save(ticket.clone()).await?;
        tracing::info!(ticket = id, "support ticket closed");
        Ok(ticket)
    }

    pub async fn open_tickets(&self) -> Result<Vec<SupportTicket>> {
        self.tickets.open().await
    }
}
