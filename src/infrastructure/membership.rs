use crate::domain::account::AccountId;
use crate::domain::ports::MembershipChecker;
use crate::error::{Result, RewardsError};
use async_trait::async_trait;
use std::collections::HashSet;

/// Membership oracle backed by a fixed table. Useful where no live
/// channel can be queried: the CLI runs with `allow_all`, tests pick the
/// exact subscriptions they need.
#[derive(Default, Clone)]
pub struct StaticMembership {
    allow_all: bool,
    subscribed: HashSet<(String, AccountId)>,
}

impl StaticMembership {
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn subscribe(mut self, channel_handle: &str, account: AccountId) -> Self {
        self.subscribed.insert((channel_handle.to_string(), account));
        self
    }
}

#[async_trait]
impl MembershipChecker for StaticMembership {
    async fn is_subscribed(&self, channel_handle: &str, account: AccountId) -> Result<bool> {
        Ok(self.allow_all
            || self
                .subscribed
                .contains(&(channel_handle.to_string(), account)))
    }
}

/// Always errors, standing in for an unreachable membership service.
#[derive(Default, Clone)]
pub struct ErroringMembership;

#[async_trait]
impl MembershipChecker for ErroringMembership {
    async fn is_subscribed(&self, _channel_handle: &str, _account: AccountId) -> Result<bool> {
        Err(RewardsError::Internal(Box::new(std::io::Error::other(
            "membership service unreachable",
        ))))
    }
}
