use crate::domain::account::AccountId;
use crate::error::{Result, RewardsError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type WithdrawalId = u64;

/// Commission taken from balances at or below the no-commission limit, percent.
pub const COMMISSION_PERCENT: u64 = 10;

/// A validated destination card: 16 numeric digits with a required prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardNumber(String);

impl CardNumber {
    pub fn parse(input: &str, required_prefix: &str) -> Result<Self> {
        let digits = input.trim();
        if digits.len() == 16
            && digits.chars().all(|c| c.is_ascii_digit())
            && digits.starts_with(required_prefix)
        {
            Ok(Self(digits.to_string()))
        } else {
            Err(RewardsError::InvalidCard {
                expected_prefix: required_prefix.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Payout arithmetic for a given balance: the whole balance is debited,
/// commission is floor(10%) up to the no-commission limit and zero above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalQuote {
    pub balance: u64,
    pub commission: u64,
    pub amount: u64,
}

impl WithdrawalQuote {
    pub fn compute(balance: u64, min_withdraw: u64, no_commission_limit: u64) -> Result<Self> {
        if balance < min_withdraw {
            return Err(RewardsError::MinimumNotMet {
                minimum: min_withdraw,
                balance,
            });
        }
        let commission = if balance <= no_commission_limit {
            balance * COMMISSION_PERCENT / 100
        } else {
            0
        };
        Ok(Self {
            balance,
            commission,
            amount: balance - commission,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Paid,
    Rejected,
}

/// A request to convert the full balance into a card payout. Created
/// together with the debit; Paid and Rejected are terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub account_id: AccountId,
    pub card: CardNumber,
    pub amount: u64,
    pub commission: u64,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub account_id: AccountId,
    pub card: CardNumber,
    pub quote: WithdrawalQuote,
}

impl NewWithdrawal {
    pub fn into_request(self, id: WithdrawalId) -> WithdrawalRequest {
        WithdrawalRequest {
            id,
            account_id: self.account_id,
            card: self.card,
            amount: self.quote.amount,
            commission: self.quote.commission,
            status: WithdrawalStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

impl WithdrawalRequest {
    /// Pending -> Paid | Rejected. Terminal states never transition again.
    pub fn resolve(&mut self, status: WithdrawalStatus) -> Result<()> {
        if self.status != WithdrawalStatus::Pending || status == WithdrawalStatus::Pending {
            return Err(RewardsError::NotPending);
        }
        self.status = status;
        Ok(())
    }
}
