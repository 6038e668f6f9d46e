use crate::domain::account::{Account, AccountId};
use crate::domain::ad::{AdRequest, AdRequestId, AdStatus, NewAdRequest};
use crate::domain::ports::{
    AccountStore, AdRequestStore, ReferralStore, TaskStore, TicketStore, WithdrawalStore,
};
use crate::domain::referral::Referral;
use crate::domain::support::{SupportTicket, TicketId, TicketStatus};
use crate::domain::task::{Completion, NewTask, Task, TaskId};
use crate::domain::withdrawal::{NewWithdrawal, WithdrawalId, WithdrawalRequest, WithdrawalStatus};
use crate::error::{Result, RewardsError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub const CF_ACCOUNTS: &str = "accounts";
pub const CF_TASKS: &str = "tasks";
pub const CF_COMPLETIONS: &str = "completions";
pub const CF_WITHDRAWALS: &str = "withdrawals";
pub const CF_ADS: &str = "ads";
pub const CF_REFERRALS: &str = "referrals";
pub const CF_TICKETS: &str = "tickets";
const CF_META: &str = "meta";
const SEQUENCE_KEY: &[u8] = b"next_id";

const ALL_CFS: [&str; 8] = [
    CF_ACCOUNTS,
    CF_TASKS,
    CF_COMPLETIONS,
    CF_WITHDRAWALS,
    CF_ADS,
    CF_REFERRALS,
    CF_TICKETS,
    CF_META,
];

/// A persistent store backed by RocksDB, one column family per entity.
///
/// Paired commits (debit-and-create, credit-and-record, approve-and-spawn)
/// are applied as a single `WriteBatch`, so either both rows land or
/// neither does. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    sequence: Arc<AtomicU64>,
}

fn account_key(id: AccountId) -> [u8; 8] {
    id.to_be_bytes()
}

fn completion_key(account: AccountId, task: TaskId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&account.to_be_bytes());
    key[8..].copy_from_slice(&task.to_be_bytes());
    key
}

impl RocksDbStore {
    /// Opens or creates the database, ensuring all column families exist
    /// and restoring the id sequence.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        let store = Self {
            db: Arc::new(db),
            sequence: Arc::new(AtomicU64::new(0)),
        };
        let next: u64 = store.read(CF_META, SEQUENCE_KEY)?.unwrap_or(0);
        store.sequence.store(next, Ordering::SeqCst);
        Ok(store)
    }

    fn handle(&self, name: &'static str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            RewardsError::Internal(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn write<T: Serialize>(&self, cf: &'static str, key: &[u8], value: &T) -> Result<()> {
        let handle = self.handle(cf)?;
        self.db.put_cf(handle, key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, cf: &'static str, key: &[u8]) -> Result<Option<T>> {
        let handle = self.handle(cf)?;
        match self.db.get_cf(handle, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf: &'static str) -> Result<Vec<T>> {
        let handle = self.handle(cf)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(handle, rocksdb::IteratorMode::Start) {
            let (_key, bytes) = item?;
            values.push(serde_json::from_slice(&bytes)?);
        }
        Ok(values)
    }

    fn batch_put<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf: &'static str,
        key: &[u8],
        value: &T,
    ) -> Result<()> {
        let handle = self.handle(cf)?;
        batch.put_cf(handle, key, serde_json::to_vec(value)?);
        Ok(())
    }

    /// Allocates an id and records the advanced sequence in the batch, so
    /// a reopened database never reissues it.
    fn batch_next_id(&self, batch: &mut WriteBatch) -> Result<u64> {
        let id = self.next_id();
        self.batch_put(batch, CF_META, SEQUENCE_KEY, &id)?;
        Ok(id)
    }

    fn active_tasks_newest_first(&self) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .scan::<Task>(CF_TASKS)?
            .into_iter()
            .filter(|t| t.active)
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }
}

#[async_trait]
impl AccountStore for RocksDbStore {
    async fn create_if_absent(&self, account: Account) -> Result<Account> {
        if let Some(existing) = self.read(CF_ACCOUNTS, &account_key(account.id))? {
            return Ok(existing);
        }
        self.write(CF_ACCOUNTS, &account_key(account.id), &account)?;
        Ok(account)
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        self.read(CF_ACCOUNTS, &account_key(id))
    }

    async fn save(&self, account: Account) -> Result<()> {
        self.write(CF_ACCOUNTS, &account_key(account.id), &account)
    }

    async fn all(&self) -> Result<Vec<Account>> {
        self.scan(CF_ACCOUNTS)
    }
}

#[async_trait]
impl TaskStore for RocksDbStore {
    async fn insert(&self, task: NewTask) -> Result<Task> {
        let mut batch = WriteBatch::default();
        let id = self.batch_next_id(&mut batch)?;
        let task = task.into_task(id);
        self.batch_put(&mut batch, CF_TASKS, &id.to_be_bytes(), &task)?;
        self.db.write(batch)?;
        Ok(task)
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> {
        self.read(CF_TASKS, &id.to_be_bytes())
    }

    async fn active(&self) -> Result<Vec<Task>> {
        self.active_tasks_newest_first()
    }

    async fn deactivate(&self, id: TaskId) -> Result<()> {
        match self.read::<Task>(CF_TASKS, &id.to_be_bytes())? {
            Some(mut task) => {
                task.active = false;
                self.write(CF_TASKS, &id.to_be_bytes(), &task)
            }
            None => Err(RewardsError::not_found("task", id)),
        }
    }

    async fn completion(&self, account: AccountId, task: TaskId) -> Result<Option<Completion>> {
        self.read(CF_COMPLETIONS, &completion_key(account, task))
    }

    async fn upsert_completion(&self, completion: Completion) -> Result<()> {
        self.write(
            CF_COMPLETIONS,
            &completion_key(completion.account_id, completion.task_id),
            &completion,
        )
    }

    async fn commit_completion(&self, completion: Completion, account: Account) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.batch_put(
            &mut batch,
            CF_COMPLETIONS,
            &completion_key(completion.account_id, completion.task_id),
            &completion,
        )?;
        self.batch_put(&mut batch, CF_ACCOUNTS, &account_key(account.id), &account)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn pending_for(&self, account: AccountId) -> Result<Vec<Task>> {
        let mut pending = Vec::new();
        for task in self.active_tasks_newest_first()? {
            if self
                .read::<Completion>(CF_COMPLETIONS, &completion_key(account, task.id))?
                .is_none()
            {
                pending.push(task);
            }
        }
        Ok(pending)
    }

    async fn completed_for(&self, account: AccountId) -> Result<Vec<Completion>> {
        Ok(self
            .scan::<Completion>(CF_COMPLETIONS)?
            .into_iter()
            .filter(|c| c.account_id == account && c.is_completed())
            .collect())
    }
}

#[async_trait]
impl WithdrawalStore for RocksDbStore {
    async fn create(&self, new: NewWithdrawal, debited: Account) -> Result<WithdrawalRequest> {
        let mut batch = WriteBatch::default();
        let id = self.batch_next_id(&mut batch)?;
        let request = new.into_request(id);
        self.batch_put(&mut batch, CF_WITHDRAWALS, &id.to_be_bytes(), &request)?;
        self.batch_put(&mut batch, CF_ACCOUNTS, &account_key(debited.id), &debited)?;
        self.db.write(batch)?;
        Ok(request)
    }

    async fn get(&self, id: WithdrawalId) -> Result<Option<WithdrawalRequest>> {
        self.read(CF_WITHDRAWALS, &id.to_be_bytes())
    }

    async fn save(&self, request: WithdrawalRequest) -> Result<()> {
        self.write(CF_WITHDRAWALS, &request.id.to_be_bytes(), &request)
    }

    async fn pending(&self) -> Result<Vec<WithdrawalRequest>> {
        Ok(self
            .scan::<WithdrawalRequest>(CF_WITHDRAWALS)?
            .into_iter()
            .filter(|r| r.status == WithdrawalStatus::Pending)
            .collect())
    }
}

#[async_trait]
impl AdRequestStore for RocksDbStore {
    async fn create(&self, new: NewAdRequest, debited: Account) -> Result<AdRequest> {
        let mut batch = WriteBatch::default();
        let id = self.batch_next_id(&mut batch)?;
        let request = new.into_request(id);
        self.batch_put(&mut batch, CF_ADS, &id.to_be_bytes(), &request)?;
        self.batch_put(&mut batch, CF_ACCOUNTS, &account_key(debited.id), &debited)?;
        self.db.write(batch)?;
        Ok(request)
    }

    async fn get(&self, id: AdRequestId) -> Result<Option<AdRequest>> {
        self.read(CF_ADS, &id.to_be_bytes())
    }

    async fn save(&self, request: AdRequest) -> Result<()> {
        self.write(CF_ADS, &request.id.to_be_bytes(), &request)
    }

    async fn save_approved(&self, request: AdRequest, task: NewTask) -> Result<Task> {
        let mut batch = WriteBatch::default();
        let task_id = self.batch_next_id(&mut batch)?;
        let task = task.into_task(task_id);
        self.batch_put(&mut batch, CF_TASKS, &task_id.to_be_bytes(), &task)?;
        self.batch_put(&mut batch, CF_ADS, &request.id.to_be_bytes(), &request)?;
        self.db.write(batch)?;
        Ok(task)
    }

    async fn pending(&self) -> Result<Vec<AdRequest>> {
        Ok(self
            .scan::<AdRequest>(CF_ADS)?
            .into_iter()
            .filter(|r| r.status == AdStatus::Pending)
            .collect())
    }

    async fn for_requester(&self, account: AccountId) -> Result<Vec<AdRequest>> {
        Ok(self
            .scan::<AdRequest>(CF_ADS)?
            .into_iter()
            .filter(|r| r.requester_id == account)
            .collect())
    }
}

#[async_trait]
impl ReferralStore for RocksDbStore {
    async fn get(&self, referred: AccountId) -> Result<Option<Referral>> {
        self.read(CF_REFERRALS, &account_key(referred))
    }

    async fn commit(&self, referral: Referral, credited_inviter: Account) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.batch_put(
            &mut batch,
            CF_REFERRALS,
            &account_key(referral.referred_id),
            &referral,
        )?;
        self.batch_put(
            &mut batch,
            CF_ACCOUNTS,
            &account_key(credited_inviter.id),
            &credited_inviter,
        )?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn rewarded_count(&self, inviter: AccountId) -> Result<u64> {
        Ok(self
            .scan::<Referral>(CF_REFERRALS)?
            .into_iter()
            .filter(|r| r.inviter_id == inviter && r.reward_given)
            .count() as u64)
    }
}

#[async_trait]
impl TicketStore for RocksDbStore {
    async fn insert(&self, account: AccountId, message: String) -> Result<SupportTicket> {
        let mut batch = WriteBatch::default();
        let id = self.batch_next_id(&mut batch)?;
        let ticket = SupportTicket::open(id, account, message);
        self.batch_put(&mut batch, CF_TICKETS, &id.to_be_bytes(), &ticket)?;
        self.db.write(batch)?;
        Ok(ticket)
    }

    async fn get(&self, id: TicketId) -> Result<Option<SupportTicket>> {
        self.read(CF_TICKETS, &id.to_be_bytes())
    }

    async fn save(&self, ticket: SupportTicket) -> Result<()> {
        self.write(CF_TICKETS, &ticket.id.to_be_bytes(), &ticket)
    }

    async fn open(&self) -> Result<Vec<SupportTicket>> {
        Ok(self
            .scan::<SupportTicket>(CF_TICKETS)?
            .into_iter()
            .filter(|t| t.status == TicketStatus::Open)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Amount;
    use crate::domain::task::ChannelRef;
    use tempfile::tempdir;

    fn new_task(reward: u64) -> NewTask {
        NewTask {
            channel: ChannelRef {
                link: "https://example.org/ch".to_string(),
                handle: "ch".to_string(),
            },
            reward: Amount::new(reward).unwrap(),
            description: "subscribe".to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).expect("failed to open RocksDB");
        for name in ALL_CFS {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_account_round_trip() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        let mut account = Account::new(-42, "carol");
        account.credit(Amount::new(700).unwrap()).unwrap();
        AccountStore::save(&store, account.clone()).await.unwrap();

        let retrieved = AccountStore::get(&store, -42).await.unwrap().unwrap();
        assert_eq!(retrieved, account);
        assert!(AccountStore::get(&store, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sequence_survives_reopen() {
        let dir = tempdir().unwrap();
        let first_id = {
            let store = RocksDbStore::open(dir.path()).unwrap();
            TaskStore::insert(&store, new_task(100)).await.unwrap().id
        };
        let store = RocksDbStore::open(dir.path()).unwrap();
        let second_id = TaskStore::insert(&store, new_task(100)).await.unwrap().id;
        assert!(second_id > first_id);
    }

    #[tokio::test]
    async fn test_paired_commit_writes_both_rows() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();
        let task = TaskStore::insert(&store, new_task(500)).await.unwrap();

        let mut account = Account::new(7, "bob");
        account.credit(Amount::new(500).unwrap()).unwrap();
        let mut completion = Completion::pending(7, task.id);
        completion.complete();

        store
            .commit_completion(completion.clone(), account.clone())
            .await
            .unwrap();

        assert_eq!(
            AccountStore::get(&store, 7).await.unwrap().unwrap(),
            account
        );
        assert_eq!(
            store.completion(7, task.id).await.unwrap().unwrap(),
            completion
        );
        assert!(store.pending_for(7).await.unwrap().is_empty());
    }
}
