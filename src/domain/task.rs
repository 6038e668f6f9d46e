use crate::domain::account::{AccountId, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = u64;

/// The promoted channel: an invite link plus the bare handle used for the
/// membership check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub link: String,
    pub handle: String,
}

/// A sponsor-defined action with a fixed reward. The reward is immutable
/// once the task exists; deactivation hides it from new participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub channel: ChannelRef,
    pub reward: Amount,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A task as submitted for creation, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub channel: ChannelRef,
    pub reward: Amount,
    pub description: String,
}

impl NewTask {
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            channel: self.channel,
            reward: self.reward,
            description: self.description,
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Pending,
    Completed,
}

/// Progress of one account on one task. The (account_id, task_id) key is
/// unique; that uniqueness is the guard against double rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub account_id: AccountId,
    pub task_id: TaskId,
    pub status: CompletionStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Completion {
    pub fn pending(account_id: AccountId, task_id: TaskId) -> Self {
        Self {
            account_id,
            task_id,
            status: CompletionStatus::Pending,
            completed_at: None,
        }
    }

    pub fn complete(&mut self) {
        self.status = CompletionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn is_completed(&self) -> bool {
        self.status == CompletionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_transition() {
        let mut completion = Completion::pending(7, 3);
        assert!(!completion.is_completed());
        assert!(completion.completed_at.is_none());

        completion.complete();
        assert!(completion.is_completed());
        assert!(completion.completed_at.is_some());
    }
}
