use crate::domain::account::{AccountId, Amount, Balance};
use crate::domain::ports::{AccountStoreRef, TaskStoreRef};
use crate::domain::task::{ChannelRef, Completion, NewTask, Task, TaskId};
use crate::error::{Result, RewardsError};

/// Task catalog plus per-account completion records.
///
/// `record_completion` is the money-touching operation: the completed row
/// and the credited account go to the store as one commit, and a repeat
/// call short-circuits with `AlreadyCompleted` before any mutation. The
/// orchestrator runs the external membership check before calling it;
/// this service does not verify membership itself.
pub struct TaskRegistry {
    tasks: TaskStoreRef,
    accounts: AccountStoreRef,
}

impl TaskRegistry {
    pub fn new(tasks: TaskStoreRef, accounts: AccountStoreRef) -> Self {
        Self { tasks, accounts }
    }

    pub async fn create(
        &self,
        channel: ChannelRef,
        reward: u64,
        description: String,
    ) -> Result<Task> {
        let reward = Amount::new(reward)?;
        let task = self
            .tasks
            .insert(NewTask {
                channel,
                reward,
                description,
            })
            .await?;
        tracing::info!(task = task.id, reward = reward.value(), "task created");
        Ok(task)
    }

    pub async fn get(&self, id: TaskId) -> Result<Task> {
        self.tasks
            .get(id)
            .await?
            .ok_or_else(|| RewardsError::not_found("task", id))
    }

    pub async fn list_active(&self) -> Result<Vec<Task>> {
        self.tasks.active().await
    }

    pub async fn pending_for(&self, account: AccountId) -> Result<Vec<Task>> {
        self.tasks.pending_for(account).await
    }

    pub async fn completed_for(&self, account: AccountId) -> Result<Vec<Completion>> {
        self.tasks.completed_for(account).await
    }

    /// A user opening a task's detail lazily creates the pending
    /// completion row.
    pub async fn view(&self, account: AccountId, task_id: TaskId) -> Result<Task> {
        let task = self.get(task_id).await?;
        if self.tasks.completion(account, task_id).await?.is_none() {
            self.tasks
                .upsert_completion(Completion::pending(account, task_id))
                .await?;
        }
        Ok(task)
    }

    /// Marks the completion and credits the reward in one commit.
    pub async fn record_completion(
        &self,
        account_id: AccountId,
        task_id: TaskId,
    ) -> Result<(Task, Balance)> {
        let task = self.get(task_id).await?;

        let mut completion = match self.tasks.completion(account_id, task_id).await? {
            Some(existing) if existing.is_completed() => {
                return Err(RewardsError::AlreadyCompleted);
            }
            Some(existing) => existing,
            None => Completion::pending(account_id, task_id),
        };

        let mut account = self
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| RewardsError::not_found("account", account_id))?;

        completion.complete();
        account.credit(task.reward)?;
        let balance = account.balance;
        self.tasks.commit_completion(completion, account).await?;

        tracing::info!(
            account = account_id,
            task = task_id,
            reward = task.reward.value(),
            "task completion credited"
        );
        Ok((task, balance))
    }

    pub async fn deactivate(&self, id: TaskId) -> Result<()> {
        self.tasks.deactivate(id).await?;
        tracing::info!(task = id, "task deactivated");
        Ok(())
    }
}
