use crate::domain::account::{Account, AccountId, Amount, Balance};
use crate::domain::ports::AccountStoreRef;
use crate::error::{Result, RewardsError};

/// Owns balance reads and standalone credit/debit mutations.
///
/// Workflows that must pair a balance change with another row (withdrawal
/// creation, completion rewards, referral bonuses) do not go through this
/// service; they mutate the `Account` value and hand both rows to the
/// store's paired commit. Callers are responsible for holding the
/// per-account lock across a mutation.
pub struct Ledger {
    accounts: AccountStoreRef,
}

impl Ledger {
    pub fn new(accounts: AccountStoreRef) -> Self {
        Self { accounts }
    }

    async fn load(&self, id: AccountId) -> Result<Account> {
        self.accounts
            .get(id)
            .await?
            .ok_or_else(|| RewardsError::not_found("account", id))
    }

    pub async fn credit(&self, id: AccountId, amount: Amount) -> Result<Balance> {
        let mut account = self.load(id).await?;
        account.credit(amount)?;
        let balance = account.balance;
        self.accounts.save(account).await?;
        tracing::info!(account = id, amount = amount.value(), "balance credited");
        Ok(balance)
    }

    pub async fn debit(&self, id: AccountId, amount: Amount) -> Result<Balance> {
        let mut account = self.load(id).await?;
        account.debit(amount)?;
        let balance = account.balance;
        self.accounts.save(account).await?;
        tracing::info!(account = id, amount = amount.value(), "balance debited");
        Ok(balance)
    }

    pub async fn balance(&self, id: AccountId) -> Result<Balance> {
        Ok(self.load(id).await?.balance)
    }
}
