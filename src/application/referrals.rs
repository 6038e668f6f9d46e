use crate::domain::account::{AccountId, Amount};
use crate::domain::ports::{AccountStoreRef, ReferralStoreRef};
use crate::domain::referral::Referral;
use crate::error::{Result, RewardsError};

/// One-time referral bonus crediting. The uniqueness of the referral row
/// per referred account is the sole defense against double-crediting
/// when `register` is invoked more than once.
pub struct ReferralEngine {
    referrals: ReferralStoreRef,
    accounts: AccountStoreRef,
    bonus: u64,
}

impl ReferralEngine {
    pub fn new(referrals: ReferralStoreRef, accounts: AccountStoreRef, bonus: u64) -> Self {
        Self {
            referrals,
            accounts,
            bonus,
        }
    }

    /// Credits the inviter and records the referral in one commit.
    /// Self-referral is a silent no-op (`Ok(false)`); a repeat for an
    /// already-referred account is the benign `AlreadyReferred`
    /// short-circuit. Only the inviter is credited.
    pub async fn register(&self, inviter: AccountId, referred: AccountId) -> Result<bool> {
        if inviter == referred {
            return Ok(false);
        }
        if self.referrals.get(referred).await?.is_some() {
            return Err(RewardsError::AlreadyReferred);
        }

        let mut inviter_account = self
            .accounts
            .get(inviter)
            .await?
            .ok_or_else(|| RewardsError::not_found("account", inviter))?;
        inviter_account.credit(Amount::new(self.bonus)?)?;

        self.referrals
            .commit(Referral::rewarded(inviter, referred), inviter_account)
            .await?;

        tracing::info!(inviter, referred, bonus = self.bonus, "referral credited");
        Ok(true)
    }

    pub async fn rewarded_count(&self, inviter: AccountId) -> Result<u64> {
        self.referrals.rewarded_count(inviter).await
    }
}
