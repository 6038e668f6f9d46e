use crate::domain::account::AccountId;
use crate::domain::ports::{Notification, Notifier};
use crate::error::{Result, RewardsError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Logs every outbound notification. The default delivery adapter for the
/// CLI, where there is no real transport to hand the message to.
#[derive(Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, account: AccountId, notification: Notification) -> Result<()> {
        tracing::info!(account, ?notification, "outbound notification");
        Ok(())
    }
}

/// Captures every send for later inspection.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(AccountId, Notification)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(AccountId, Notification)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, account: AccountId, notification: Notification) -> Result<()> {
        self.sent.lock().await.push((account, notification));
        Ok(())
    }
}

/// Fails every send, standing in for a recipient that blocked the bot.
#[derive(Default, Clone)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, account: AccountId, _notification: Notification) -> Result<()> {
        Err(RewardsError::Internal(Box::new(std::io::Error::other(
            format!("delivery to {account} refused"),
        ))))
    }
}
