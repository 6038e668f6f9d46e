use crate::domain::account::{Account, AccountId};
use crate::domain::ad::{AdRequest, AdRequestId, NewAdRequest};
use crate::domain::referral::Referral;
use crate::domain::support::{SupportTicket, TicketId};
use crate::domain::task::{Completion, NewTask, Task, TaskId};
use crate::domain::withdrawal::{NewWithdrawal, WithdrawalId, WithdrawalRequest};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Every method is a single atomic operation against the backing store.
/// Methods that take two entities persist both in one commit; the engine
/// relies on that for its debit-and-create and credit-and-record pairs.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts on first contact, returns the stored row either way.
    async fn create_if_absent(&self, account: Account) -> Result<Account>;
    async fn get(&self, id: AccountId) -> Result<Option<Account>>;
    async fn save(&self, account: Account) -> Result<()>;
    async fn all(&self) -> Result<Vec<Account>>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: NewTask) -> Result<Task>;
    async fn get(&self, id: TaskId) -> Result<Option<Task>>;
    /// Active tasks, newest first.
    async fn active(&self) -> Result<Vec<Task>>;
    async fn deactivate(&self, id: TaskId) -> Result<()>;
    async fn completion(&self, account: AccountId, task: TaskId) -> Result<Option<Completion>>;
    /// Lazy pending row created when a user first views a task.
    async fn upsert_completion(&self, completion: Completion) -> Result<()>;
    /// Persists the completed row and the credited account in one commit.
    async fn commit_completion(&self, completion: Completion, account: Account) -> Result<()>;
    /// Active tasks with no completion row for the account, newest first.
    async fn pending_for(&self, account: AccountId) -> Result<Vec<Task>>;
    async fn completed_for(&self, account: AccountId) -> Result<Vec<Completion>>;
}

#[async_trait]
pub trait WithdrawalStore: Send + Sync {
    /// Persists the new pending request and the debited account in one
    /// commit, assigning the request id.
    async fn create(&self, new: NewWithdrawal, debited: Account) -> Result<WithdrawalRequest>;
    async fn get(&self, id: WithdrawalId) -> Result<Option<WithdrawalRequest>>;
    async fn save(&self, request: WithdrawalRequest) -> Result<()>;
    async fn pending(&self) -> Result<Vec<WithdrawalRequest>>;
}

#[async_trait]
pub trait AdRequestStore: Send + Sync {
    /// Persists the new pending request and the debited account in one
    /// commit, assigning the request id.
    async fn create(&self, new: NewAdRequest, debited: Account) -> Result<AdRequest>;
    async fn get(&self, id: AdRequestId) -> Result<Option<AdRequest>>;
    async fn save(&self, request: AdRequest) -> Result<()>;
    /// Persists the approved request and the spawned task in one commit.
    async fn save_approved(&self, request: AdRequest, task: NewTask) -> Result<Task>;
    async fn pending(&self) -> Result<Vec<AdRequest>>;
    async fn for_requester(&self, account: AccountId) -> Result<Vec<AdRequest>>;
}

#[async_trait]
pub trait ReferralStore: Send + Sync {
    async fn get(&self, referred: AccountId) -> Result<Option<Referral>>;
    /// Persists the referral row and the credited inviter in one commit.
    async fn commit(&self, referral: Referral, credited_inviter: Account) -> Result<()>;
    async fn rewarded_count(&self, inviter: AccountId) -> Result<u64>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn insert(&self, account: AccountId, message: String) -> Result<SupportTicket>;
    async fn get(&self, id: TicketId) -> Result<Option<SupportTicket>>;
    async fn save(&self, ticket: SupportTicket) -> Result<()>;
    async fn open(&self) -> Result<Vec<SupportTicket>>;
}

/// Point-to-point outbound message for a specific account.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    ReferralBonus {
        amount: u64,
    },
    AdDecision {
        request_id: AdRequestId,
        approved: bool,
        comment: Option<String>,
    },
    SupportReply {
        ticket_id: TicketId,
        reply: String,
    },
}

/// Delivery collaborator. Failures are caught at the send site and logged;
/// they never unwind a committed transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, account: AccountId, notification: Notification) -> Result<()>;
}

/// External subscription check. Errors degrade to not-subscribed.
#[async_trait]
pub trait MembershipChecker: Send + Sync {
    async fn is_subscribed(&self, channel_handle: &str, account: AccountId) -> Result<bool>;
}

pub type AccountStoreRef = Arc<dyn AccountStore>;
pub type TaskStoreRef = Arc<dyn TaskStore>;
pub type WithdrawalStoreRef = Arc<dyn WithdrawalStore>;
pub type AdRequestStoreRef = Arc<dyn AdRequestStore>;
pub type ReferralStoreRef = Arc<dyn ReferralStore>;
pub type TicketStoreRef = Arc<dyn TicketStore>;
pub type NotifierRef = Arc<dyn Notifier>;
pub type MembershipCheckerRef = Arc<dyn MembershipChecker>;

/// The full set of store ports an engine is wired with.
#[derive(Clone)]
pub struct Stores {
    pub accounts: AccountStoreRef,
    pub tasks: TaskStoreRef,
    pub withdrawals: WithdrawalStoreRef,
    pub ads: AdRequestStoreRef,
    pub referrals: ReferralStoreRef,
    pub tickets: TicketStoreRef,
}

impl Stores {
    /// Wires every port to one shared backend, e.g. `MemoryStore` or
    /// `RocksDbStore`.
    pub fn from_backend<S>(backend: S) -> Self
    where
        S: AccountStore
            + TaskStore
            + WithdrawalStore
            + AdRequestStore
            + ReferralStore
            + TicketStore
            + Clone
            + 'static,
    {
        Self {
            accounts: Arc::new(backend.clone()),
            tasks: Arc::new(backend.clone()),
            withdrawals: Arc::new(backend.clone()),
            ads: Arc::new(backend.clone()),
            referrals: Arc::new(backend.clone()),
            tickets: Arc::new(backend),
        }
    }
}
