use crate::domain::account::{Account, AccountId, Balance};
use crate::domain::ad::{AdDuration, AdRequest, AdRequestId};
use crate::domain::support::{SupportTicket, TicketId};
use crate::domain::task::{Task, TaskId};
use crate::domain::withdrawal::{WithdrawalId, WithdrawalRequest};

/// An inbound command, already parsed by a transport. The orchestrator
/// dispatches each command to exactly one workflow operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// First contact; may carry a referral token tied to an inviter.
    Start {
        username: Option<String>,
        referrer: Option<AccountId>,
    },
    Balance,
    Profile,
    ListTasks,
    /// Opening a task detail lazily creates the pending completion row.
    ViewTask { task: TaskId },
    /// "I subscribed, check and reward me."
    CompletionCheck { task: TaskId },
    Withdraw { card: String },
    WithdrawalPaid { request: WithdrawalId },
    WithdrawalRejected { request: WithdrawalId },
    SubmitAd {
        channel_name: String,
        channel_handle: String,
        duration: AdDuration,
        description: String,
    },
    AdApprove { request: AdRequestId },
    AdReject { request: AdRequestId, comment: String },
    SupportOpen { message: String },
    SupportReply { ticket: TicketId, text: String },
    SupportClose { ticket: TicketId },
    CreateTask {
        link: String,
        handle: String,
        reward: u64,
        description: String,
    },
    DeactivateTask { task: TaskId },
    /// Administrator top-up of a user balance.
    Grant { account: AccountId, amount: u64 },
    Stats,
}

impl Command {
    /// Privileged commands are checked against the configured
    /// administrator identity before dispatch.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::WithdrawalPaid { .. }
                | Self::WithdrawalRejected { .. }
                | Self::AdApprove { .. }
                | Self::AdReject { .. }
                | Self::SupportReply { .. }
                | Self::SupportClose { .. }
                | Self::CreateTask { .. }
                | Self::DeactivateTask { .. }
                | Self::Grant { .. }
                | Self::Stats
        )
    }
}

/// Aggregate counters for the administrator overview.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsReport {
    pub total_accounts: u64,
    pub total_balance: u64,
    pub active_tasks: u64,
    pub pending_withdrawals: u64,
    pub pending_ads: u64,
    pub open_tickets: u64,
}

/// The result of a successfully handled command, as a plain value: the
/// transport decides how to render it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Registered {
        account: Account,
        referral_credited: bool,
    },
    Balance(Balance),
    Profile {
        account: Account,
        completed_tasks: u64,
        pending_tasks: u64,
        rewarded_referrals: u64,
        ad_requests: u64,
    },
    Tasks(Vec<Task>),
    TaskDetail(Task),
    TaskCompleted {
        task: Task,
        new_balance: Balance,
    },
    /// The membership check said (or failed to say) the caller is not
    /// subscribed; nothing was recorded.
    NotSubscribed { channel_handle: String },
    WithdrawalCreated(WithdrawalRequest),
    WithdrawalResolved(WithdrawalRequest),
    AdSubmitted(AdRequest),
    AdDecided(AdRequest),
    TicketOpened(SupportTicket),
    TicketResolved(SupportTicket),
    TicketClosed(SupportTicket),
    TaskCreated(Task),
    TaskDeactivated { task: TaskId },
    Granted {
        account: AccountId,
        new_balance: Balance,
    },
    Stats(StatsReport),
}
