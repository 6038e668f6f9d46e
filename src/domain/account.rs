use crate::error::{Result, RewardsError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform user identifier. Not store-assigned: it comes from the chat
/// platform and is immutable for the lifetime of the account.
pub type AccountId = i64;

/// A non-negative balance in minor currency units.
///
/// The only mutations are `credit` and `debit`; `debit` refuses to go
/// below zero, which keeps the ledger invariant local to this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Balance(pub u64);

/// A strictly positive amount for credits and debits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(RewardsError::Validation(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = RewardsError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl Balance {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A user's persistent balance record. Created on first contact, never
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub balance: Balance,
    pub joined_at: DateTime<Utc>,
    pub referrer_id: Option<AccountId>,
}

impl Account {
    pub fn new(id: AccountId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            balance: Balance::ZERO,
            joined_at: Utc::now(),
            referrer_id: None,
        }
    }

    pub fn credit(&mut self, amount: Amount) -> Result<()> {
        match self.balance.0.checked_add(amount.value()) {
            Some(total) => {
                self.balance = Balance(total);
                Ok(())
            }
            None => Err(RewardsError::Validation(format!(
                "crediting {} overflows the balance",
                amount.value()
            ))),
        }
    }

    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        match self.balance.0.checked_sub(amount.value()) {
            Some(rest) => {
                self.balance = Balance(rest);
                Ok(())
            }
            None => Err(RewardsError::InsufficientFunds {
                needed: amount.value(),
                available: self.balance.0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(1).is_ok());
        assert!(matches!(
            Amount::new(0),
            Err(RewardsError::Validation(_))
        ));
    }

    #[test]
    fn test_account_credit() {
        let mut account = Account::new(1, "alice");
        account.credit(Amount::new(500).unwrap()).unwrap();
        assert_eq!(account.balance, Balance::new(500));
    }

    #[test]
    fn test_account_credit_overflow_is_rejected() {
        let mut account = Account::new(1, "alice");
        account.credit(Amount::new(u64::MAX).unwrap()).unwrap();

        let result = account.credit(Amount::new(1).unwrap());
        assert!(matches!(result, Err(RewardsError::Validation(_))));
        assert_eq!(account.balance, Balance::new(u64::MAX));
    }

    #[test]
    fn test_account_debit_success() {
        let mut account = Account::new(1, "alice");
        account.credit(Amount::new(500).unwrap()).unwrap();

        let result = account.debit(Amount::new(200).unwrap());
        assert!(result.is_ok());
        assert_eq!(account.balance, Balance::new(300));
    }

    #[test]
    fn test_account_debit_insufficient_leaves_balance_unchanged() {
        let mut account = Account::new(1, "alice");
        account.credit(Amount::new(100).unwrap()).unwrap();

        let result = account.debit(Amount::new(101).unwrap());
        assert!(matches!(
            result,
            Err(RewardsError::InsufficientFunds {
                needed: 101,
                available: 100
            })
        ));
        assert_eq!(account.balance, Balance::new(100));
    }
}
