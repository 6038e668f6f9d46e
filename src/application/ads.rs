use crate::domain::account::{AccountId, Amount};
use crate::domain::ad::{AdDuration, AdRequest, AdRequestId, NewAdRequest};
use crate::domain::ports::{AccountStoreRef, AdRequestStoreRef};
use crate::domain::task::{ChannelRef, NewTask, Task};
use crate::error::{Result, RewardsError};

/// Paid promotion request state machine. Submission debits the price up
/// front; approval spawns a subscription task for the promoted channel;
/// rejection keeps the money and the admin's comment.
pub struct AdRequestWorkflow {
    ads: AdRequestStoreRef,
    accounts: AccountStoreRef,
    task_reward: u64,
}

impl AdRequestWorkflow {
    pub fn new(ads: AdRequestStoreRef, accounts: AccountStoreRef, task_reward: u64) -> Self {
        Self {
            ads,
            accounts,
            task_reward,
        }
    }

    /// Debits the price and creates the pending request in one commit.
    pub async fn submit(
        &self,
        requester_id: AccountId,
        channel_name: String,
        channel_handle: String,
        duration: AdDuration,
        description: String,
    ) -> Result<AdRequest> {
        let mut account = self
            .accounts
            .get(requester_id)
            .await?
            .ok_or_else(|| RewardsError::not_found("account", requester_id))?;
        account.debit(Amount::new(duration.price())?)?;

        let request = self
            .ads
            .create(
                NewAdRequest {
                    requester_id,
                    channel_name,
                    channel_handle,
                    duration,
                    description,
                },
                account,
            )
            .await?;

        tracing::info!(
            account = requester_id,
            request = request.id,
            price = request.price,
            duration = request.duration.label(),
            "ad request submitted"
        );
        Ok(request)
    }

    async fn load(&self, id: AdRequestId) -> Result<AdRequest> {
        self.ads
            .get(id)
            .await?
            .ok_or_else(|| RewardsError::not_found("ad request", id))
    }

    /// Spawns the promotion task and marks the request approved in one
    /// commit.
    pub async fn approve(&self, id: AdRequestId) -> Result<(AdRequest, Task)> {
        let mut request = self.load(id).await?;
        request.approve()?;

        let task = NewTask {
            channel: ChannelRef {
                link: format!("https://t.me/{}", request.channel_handle),
                handle: request.channel_handle.clone(),
            },
            reward: Amount::new(self.task_reward)?,
            description: request.description.clone(),
        };
        let task = self.ads.save_approved(request.clone(), task).await?;

        tracing::info!(request = id, task = task.id, "ad request approved");
        Ok((request, task))
    }

    pub async fn reject(&self, id: AdRequestId, comment: &str) -> Result<AdRequest> {
        let mut request = self.load(id).await?;
        request.reject(comment)?;
        self.ads.save(request.clone()).await?;
        tracing::info!(request = id, "ad request rejected");
        Ok(request)
    }

    pub async fn pending(&self) -> Result<Vec<AdRequest>> {
        self.ads.pending().await
    }

    pub async fn for_requester(&self, account: AccountId) -> Result<Vec<AdRequest>> {
        self.ads.for_requester(account).await
    }
}
