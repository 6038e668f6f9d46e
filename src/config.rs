use crate::domain::account::AccountId;

/// Tunable business parameters. The ad price table is fixed in
/// `domain::ad` and is not configurable.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The single administrator account allowed to run privileged commands.
    pub admin_id: AccountId,
    /// Smallest balance that can be withdrawn, in minor currency units.
    pub min_withdraw: u64,
    /// Balances above this limit are withdrawn without commission.
    pub no_commission_limit: u64,
    /// Required prefix of a destination card number.
    pub card_prefix: String,
    /// One-time bonus credited to the inviter per referred account.
    pub referral_bonus: u64,
    /// Reward of a task spawned from an approved ad request.
    pub ad_task_reward: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin_id: 1,
            min_withdraw: 10_000,
            no_commission_limit: 50_000,
            card_prefix: "8600".to_string(),
            referral_bonus: 50,
            ad_task_reward: 100,
        }
    }
}
