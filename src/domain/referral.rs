use crate::domain::account::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-time bonus relationship. An account can be referred at most once;
/// `reward_given` flips in the same commit as the inviter's credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub inviter_id: AccountId,
    pub referred_id: AccountId,
    pub reward_given: bool,
    pub created_at: DateTime<Utc>,
}

impl Referral {
    pub fn rewarded(inviter_id: AccountId, referred_id: AccountId) -> Self {
        Self {
            inviter_id,
            referred_id,
            reward_given: true,
            created_at: Utc::now(),
        }
    }
}
