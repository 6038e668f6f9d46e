use crate::domain::account::{Account, AccountId};
use crate::domain::ad::{AdRequest, AdRequestId, NewAdRequest};
use crate::domain::ports::{
    AccountStore, AdRequestStore, ReferralStore, TaskStore, TicketStore, WithdrawalStore,
};
use crate::domain::referral::Referral;
use crate::domain::support::{SupportTicket, TicketId};
use crate::domain::task::{Completion, NewTask, Task, TaskId};
use crate::domain::withdrawal::{NewWithdrawal, WithdrawalId, WithdrawalRequest};
use crate::error::{Result, RewardsError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    accounts: HashMap<AccountId, Account>,
    tasks: BTreeMap<TaskId, Task>,
    completions: HashMap<(AccountId, TaskId), Completion>,
    withdrawals: BTreeMap<WithdrawalId, WithdrawalRequest>,
    ads: BTreeMap<AdRequestId, AdRequest>,
    referrals: HashMap<AccountId, Referral>,
    tickets: BTreeMap<TicketId, SupportTicket>,
    next_id: u64,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn active_tasks_newest_first(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().filter(|t| t.active).cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tasks
    }
}

/// A thread-safe in-memory store implementing every store port.
///
/// All entities live behind one `RwLock`, so the paired commits
/// (debit-and-create, credit-and-record) are atomic under the single
/// write lock. `Clone` shares the underlying state.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_if_absent(&self, account: Account) -> Result<Account> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .accounts
            .entry(account.id)
            .or_insert(account)
            .clone())
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.get(&id).cloned())
    }

    async fn save(&self, account: Account) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.accounts.insert(account.id, account);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.values().cloned().collect())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: NewTask) -> Result<Task> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let task = task.into_task(id);
        inner.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.get(&id).cloned())
    }

    async fn active(&self) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;
        Ok(inner.active_tasks_newest_first())
    }

    async fn deactivate(&self, id: TaskId) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&id) {
            Some(task) => {
                task.active = false;
                Ok(())
            }
            None => Err(RewardsError::not_found("task", id)),
        }
    }

    async fn completion(&self, account: AccountId, task: TaskId) -> Result<Option<Completion>> {
        let inner = self.inner.read().await;
        Ok(inner.completions.get(&(account, task)).cloned())
    }

    async fn upsert_completion(&self, completion: Completion) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .completions
            .insert((completion.account_id, completion.task_id), completion);
        Ok(())
    }

    async fn commit_completion(&self, completion: Completion, account: Account) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .completions
            .insert((completion.account_id, completion.task_id), completion);
        inner.accounts.insert(account.id, account);
        Ok(())
    }

    async fn pending_for(&self, account: AccountId) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;
        Ok(inner
            .active_tasks_newest_first()
            .into_iter()
            .filter(|task| !inner.completions.contains_key(&(account, task.id)))
            .collect())
    }

    async fn completed_for(&self, account: AccountId) -> Result<Vec<Completion>> {
        let inner = self.inner.read().await;
        Ok(inner
            .completions
            .values()
            .filter(|c| c.account_id == account && c.is_completed())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WithdrawalStore for MemoryStore {
    async fn create(&self, new: NewWithdrawal, debited: Account) -> Result<WithdrawalRequest> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let request = new.into_request(id);
        inner.withdrawals.insert(id, request.clone());
        inner.accounts.insert(debited.id, debited);
        Ok(request)
    }

    async fn get(&self, id: WithdrawalId) -> Result<Option<WithdrawalRequest>> {
        let inner = self.inner.read().await;
        Ok(inner.withdrawals.get(&id).cloned())
    }

    async fn save(&self, request: WithdrawalRequest) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.withdrawals.insert(request.id, request);
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<WithdrawalRequest>> {
        let inner = self.inner.read().await;
        Ok(inner
            .withdrawals
            .values()
            .filter(|r| r.status == crate::domain::withdrawal::WithdrawalStatus::Pending)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AdRequestStore for MemoryStore {
    async fn create(&self, new: NewAdRequest, debited: Account) -> Result<AdRequest> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let request = new.into_request(id);
        inner.ads.insert(id, request.clone());
        inner.accounts.insert(debited.id, debited);
        Ok(request)
    }

    async fn get(&self, id: AdRequestId) -> Result<Option<AdRequest>> {
        let inner = self.inner.read().await;
        Ok(inner.ads.get(&id).cloned())
    }

    async fn save(&self, request: AdRequest) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.ads.insert(request.id, request);
        Ok(())
    }

    async fn save_approved(&self, request: AdRequest, task: NewTask) -> Result<Task> {
        let mut inner = self.inner.write().await;
        let task_id = inner.next_id();
        let task = task.into_task(task_id);
        inner.tasks.insert(task_id, task.clone());
        inner.ads.insert(request.id, request);
        Ok(task)
    }

    async fn pending(&self) -> Result<Vec<AdRequest>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ads
            .values()
            .filter(|r| r.status == crate::domain::ad::AdStatus::Pending)
            .cloned()
            .collect())
    }

    async fn for_requester(&self, account: AccountId) -> Result<Vec<AdRequest>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ads
            .values()
            .filter(|r| r.requester_id == account)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReferralStore for MemoryStore {
    async fn get(&self, referred: AccountId) -> Result<Option<Referral>> {
        let inner = self.inner.read().await;
        Ok(inner.referrals.get(&referred).cloned())
    }

    async fn commit(&self, referral: Referral, credited_inviter: Account) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.referrals.insert(referral.referred_id, referral);
        inner.accounts.insert(credited_inviter.id, credited_inviter);
        Ok(())
    }

    async fn rewarded_count(&self, inviter: AccountId) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .referrals
            .values()
            .filter(|r| r.inviter_id == inviter && r.reward_given)
            .count() as u64)
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert(&self, account: AccountId, message: String) -> Result<SupportTicket> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let ticket = SupportTicket::open(id, account, message);
        inner.tickets.insert(id, ticket.clone());
        Ok(ticket)
    }

    async fn get(&self, id: TicketId) -> Result<Option<SupportTicket>> {
        let inner = self.inner.read().await;
        Ok(inner.tickets.get(&id).cloned())
    }

    async fn save(&self, ticket: SupportTicket) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.tickets.insert(ticket.id, ticket);
        Ok(())
    }

    async fn open(&self) -> Result<Vec<SupportTicket>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tickets
            .values()
            .filter(|t| t.status == crate::domain::support::TicketStatus::Open)
            .cloned()
            .collect())
    }
}
