use crate::config::EngineConfig;
use crate::domain::account::{AccountId, Amount};
use crate::domain::ports::{AccountStoreRef, WithdrawalStoreRef};
use crate::domain::withdrawal::{
    CardNumber, NewWithdrawal, WithdrawalId, WithdrawalQuote, WithdrawalRequest, WithdrawalStatus,
};
use crate::error::{Result, RewardsError};

/// Request-to-payout state machine. A request debits the whole balance at
/// creation; rejection does not refund it.
pub struct WithdrawalWorkflow {
    withdrawals: WithdrawalStoreRef,
    accounts: AccountStoreRef,
    min_withdraw: u64,
    no_commission_limit: u64,
    card_prefix: String,
}

impl WithdrawalWorkflow {
    pub fn new(
        withdrawals: WithdrawalStoreRef,
        accounts: AccountStoreRef,
        config: &EngineConfig,
    ) -> Self {
        Self {
            withdrawals,
            accounts,
            min_withdraw: config.min_withdraw,
            no_commission_limit: config.no_commission_limit,
            card_prefix: config.card_prefix.clone(),
        }
    }

    /// Debits the full balance and creates the pending request in one
    /// commit; any validation failure leaves the balance untouched.
    pub async fn request(&self, account_id: AccountId, card: &str) -> Result<WithdrawalRequest> {
        let card = CardNumber::parse(card, &self.card_prefix)?;
        let mut account = self
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| RewardsError::not_found("account", account_id))?;
        let quote = WithdrawalQuote::compute(
            account.balance.value(),
            self.min_withdraw,
            self.no_commission_limit,
        )?;

        account.debit(Amount::new(quote.balance)?)?;
        let request = self
            .withdrawals
            .create(
                NewWithdrawal {
                    account_id,
                    card,
                    quote,
                },
                account,
            )
            .await?;

        tracing::info!(
            account = account_id,
            request = request.id,
            amount = request.amount,
            commission = request.commission,
            "withdrawal requested"
        );
        Ok(request)
    }

    /// Pending -> Paid | Rejected. Both terminal; no refund either way.
    pub async fn resolve(
        &self,
        id: WithdrawalId,
        status: WithdrawalStatus,
    ) -> Result<WithdrawalRequest> {
        let mut request = self
            .withdrawals
            .get(id)
            .await?
            .ok_or_else(|| RewardsError::not_found("withdrawal request", id))?;
        request.resolve(status)?;
        self.withdrawals.save(request.clone()).await?;
        tracing::info!(request = id, ?status, "withdrawal resolved");
        Ok(request)
    }

    pub async fn pending(&self) -> Result<Vec<WithdrawalRequest>> {
        self.withdrawals.pending().await
    }
}
