use crate::application::ads::AdRequestWorkflow;
use crate::application::command::{Command, Outcome, StatsReport};
use crate::application::ledger::Ledger;
use crate::application::referrals::ReferralEngine;
use crate::application::support::SupportTicketing;
use crate::application::tasks::TaskRegistry;
use crate::application::withdrawals::WithdrawalWorkflow;
use crate::config::EngineConfig;
use crate::domain::account::{Account, AccountId, Amount};
use crate::domain::ad::AdStatus;
use crate::domain::ports::{MembershipCheckerRef, Notification, NotifierRef, Stores};
use crate::domain::task::ChannelRef;
use crate::domain::withdrawal::WithdrawalStatus;
use crate::error::{Result, RewardsError};
use crate::infrastructure::locks::LockMap;

/// Lock namespace for administrative resolutions, so a withdrawal and an
/// ad request with the same numeric id never share a mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RequestKind {
    Withdrawal,
    Ad,
    Ticket,
}

/// Single mediating entry point for all inbound commands.
///
/// Authorizes privileged commands, loads the target entity, dispatches to
/// exactly one workflow operation, and serializes mutations per account
/// and per request id with narrow-scope locks. Outbound notification runs
/// after the committed transition, outside the lock, and never rolls it
/// back on failure.
pub struct Orchestrator {
    config: EngineConfig,
    stores: Stores,
    ledger: Ledger,
    tasks: TaskRegistry,
    withdrawals: WithdrawalWorkflow,
    ads: AdRequestWorkflow,
    referrals: ReferralEngine,
    support: SupportTicketing,
    notifier: NotifierRef,
    membership: MembershipCheckerRef,
    account_locks: LockMap<AccountId>,
    request_locks: LockMap<(RequestKind, u64)>,
}

impl Orchestrator {
    pub fn new(
        stores: Stores,
        notifier: NotifierRef,
        membership: MembershipCheckerRef,
        config: EngineConfig,
    ) -> Self {
        Self {
            ledger: Ledger::new(stores.accounts.clone()),
            tasks: TaskRegistry::new(stores.tasks.clone(), stores.accounts.clone()),
            withdrawals: WithdrawalWorkflow::new(
                stores.withdrawals.clone(),
                stores.accounts.clone(),
                &config,
            ),
            ads: AdRequestWorkflow::new(
                stores.ads.clone(),
                stores.accounts.clone(),
                config.ad_task_reward,
            ),
            referrals: ReferralEngine::new(
                stores.referrals.clone(),
                stores.accounts.clone(),
                config.referral_bonus,
            ),
            support: SupportTicketing::new(stores.tickets.clone()),
            stores,
            notifier,
            membership,
            account_locks: LockMap::new(),
            request_locks: LockMap::new(),
            config,
        }
    }

    pub async fn handle(&self, caller: AccountId, command: Command) -> Result<Outcome> {
        if command.requires_admin() && caller != self.config.admin_id {
            return Err(RewardsError::Unauthorized);
        }

        match command {
            Command::Start { username, referrer } => self.start(caller, username, referrer).await,
            Command::Balance => Ok(Outcome::Balance(self.ledger.balance(caller).await?)),
            Command::Profile => self.profile(caller).await,
            Command::ListTasks => Ok(Outcome::Tasks(self.tasks.pending_for(caller).await?)),
            Command::ViewTask { task } => {
                let _guard = self.account_locks.acquire(caller).await;
                Ok(Outcome::TaskDetail(self.tasks.view(caller, task).await?))
            }
            Command::CompletionCheck { task } => self.completion_check(caller, task).await,
            Command::Withdraw { card } => {
                let _guard = self.account_locks.acquire(caller).await;
                let request = self.withdrawals.request(caller, &card).await?;
                Ok(Outcome::WithdrawalCreated(request))
            }
            Command::WithdrawalPaid { request } => {
                self.resolve_withdrawal(request, WithdrawalStatus::Paid).await
            }
            Command::WithdrawalRejected { request } => {
                self.resolve_withdrawal(request, WithdrawalStatus::Rejected)
                    .await
            }
            Command::SubmitAd {
                channel_name,
                channel_handle,
                duration,
                description,
            } => {
                let _guard = self.account_locks.acquire(caller).await;
                let request = self
                    .ads
                    .submit(caller, channel_name, channel_handle, duration, description)
                    .await?;
                Ok(Outcome::AdSubmitted(request))
            }
            Command::AdApprove { request } => self.decide_ad(request, None).await,
            Command::AdReject { request, comment } => self.decide_ad(request, Some(comment)).await,
            Command::SupportOpen { message } => {
                Ok(Outcome::TicketOpened(self.support.open(caller, message).await?))
            }
            Command::SupportReply { ticket, text } => {
                let reply = {
                    let _guard = self.request_locks.acquire((RequestKind::Ticket, ticket)).await;
                    self.support.reply(ticket, &text).await?
                };
                self.notify_best_effort(
                    reply.account_id,
                    Notification::SupportReply {
                        ticket_id: reply.id,
                        reply: text,
                    },
                )
                .await;
                Ok(Outcome::TicketResolved(reply))
            }
            Command::SupportClose { ticket } => {
                let _guard = self.request_locks.acquire((RequestKind::Ticket, ticket)).await;
                Ok(Outcome::TicketClosed(self.support.close(ticket).await?))
            }
            Command::CreateTask {
                link,
                handle,
                reward,
                description,
            } => {
                let channel = ChannelRef { link, handle };
                let task = self.tasks.create(channel, reward, description).await?;
                Ok(Outcome::TaskCreated(task))
            }
            Command::DeactivateTask { task } => {
                self.tasks.deactivate(task).await?;
                Ok(Outcome::TaskDeactivated { task })
            }
            Command::Grant { account, amount } => {
                let _guard = self.account_locks.acquire(account).await;
                let new_balance = self.ledger.credit(account, Amount::new(amount)?).await?;
                Ok(Outcome::Granted {
                    account,
                    new_balance,
                })
            }
            Command::Stats => self.stats().await,
        }
    }

    /// First contact: registers the account and, when a referral token is
    /// present, runs the one-time referral crediting. Both account locks
    /// are taken in ascending id order so two interleaved registrations
    /// cannot deadlock.
    async fn start(
        &self,
        caller: AccountId,
        username: Option<String>,
        referrer: Option<AccountId>,
    ) -> Result<Outcome> {
        let referrer = referrer.filter(|inviter| *inviter != caller);

        let _guards = match referrer {
            Some(inviter) => {
                let (first, second) = if inviter < caller {
                    (inviter, caller)
                } else {
                    (caller, inviter)
                };
                vec![
                    self.account_locks.acquire(first).await,
                    self.account_locks.acquire(second).await,
                ]
            }
            None => vec![self.account_locks.acquire(caller).await],
        };

        let mut template = Account::new(caller, username.unwrap_or_default());
        template.referrer_id = referrer;
        let account = self.stores.accounts.create_if_absent(template).await?;
        tracing::info!(account = caller, "account registered");

        let mut referral_credited = false;
        if let Some(inviter) = referrer {
            match self.referrals.register(inviter, caller).await {
                Ok(credited) => referral_credited = credited,
                Err(error) if error.is_benign_repeat() => {}
                Err(RewardsError::NotFound(what)) => {
                    tracing::warn!(%what, "referral token points at an unknown inviter");
                }
                Err(error) => return Err(error),
            }
        }
        drop(_guards);

        if referral_credited {
            // credited implies a referrer was present
            if let Some(inviter) = referrer {
                self.notify_best_effort(
                    inviter,
                    Notification::ReferralBonus {
                        amount: self.config.referral_bonus,
                    },
                )
                .await;
            }
        }

        Ok(Outcome::Registered {
            account,
            referral_credited,
        })
    }

    /// The external membership check runs first and fails closed: any
    /// checker error is treated as not-subscribed and nothing is
    /// recorded.
    async fn completion_check(&self, caller: AccountId, task_id: u64) -> Result<Outcome> {
        let _guard = self.account_locks.acquire(caller).await;
        let task = self.tasks.get(task_id).await?;

        let subscribed = match self
            .membership
            .is_subscribed(&task.channel.handle, caller)
            .await
        {
            Ok(subscribed) => subscribed,
            Err(error) => {
                tracing::warn!(
                    account = caller,
                    channel = %task.channel.handle,
                    %error,
                    "membership check failed, treating as not subscribed"
                );
                false
            }
        };
        if !subscribed {
            return Ok(Outcome::NotSubscribed {
                channel_handle: task.channel.handle,
            });
        }

        let (task, new_balance) = self.tasks.record_completion(caller, task_id).await?;
        Ok(Outcome::TaskCompleted { task, new_balance })
    }

    async fn resolve_withdrawal(&self, id: u64, status: WithdrawalStatus) -> Result<Outcome> {
        let _guard = self.request_locks.acquire((RequestKind::Withdrawal, id)).await;
        let request = self.withdrawals.resolve(id, status).await?;
        Ok(Outcome::WithdrawalResolved(request))
    }

    /// `comment: None` approves, `Some` rejects. The requester is
    /// notified either way, after the commit.
    async fn decide_ad(&self, id: u64, comment: Option<String>) -> Result<Outcome> {
        let request = {
            let _guard = self.request_locks.acquire((RequestKind::Ad, id)).await;
            match &comment {
                None => self.ads.approve(id).await?.0,
                Some(text) => self.ads.reject(id, text).await?,
            }
        };

        self.notify_best_effort(
            request.requester_id,
            Notification::AdDecision {
                request_id: request.id,
                approved: request.status == AdStatus::Approved,
                comment: request.admin_comment.clone(),
            },
        )
        .await;
        Ok(Outcome::AdDecided(request))
    }

    async fn profile(&self, caller: AccountId) -> Result<Outcome> {
        let account = self
            .stores
            .accounts
            .get(caller)
            .await?
            .ok_or_else(|| RewardsError::not_found("account", caller))?;
        let completed_tasks = self.tasks.completed_for(caller).await?.len() as u64;
        let pending_tasks = self.tasks.pending_for(caller).await?.len() as u64;
        let rewarded_referrals = self.referrals.rewarded_count(caller).await?;
        let ad_requests = self.ads.for_requester(caller).await?.len() as u64;
        Ok(Outcome::Profile {
            account,
            completed_tasks,
            pending_tasks,
            rewarded_referrals,
            ad_requests,
        })
    }

    async fn stats(&self) -> Result<Outcome> {
        let accounts = self.stores.accounts.all().await?;
        Ok(Outcome::Stats(StatsReport {
            total_accounts: accounts.len() as u64,
            total_balance: accounts.iter().map(|a| a.balance.value()).sum(),
            active_tasks: self.tasks.list_active().await?.len() as u64,
            pending_withdrawals: self.withdrawals.pending().await?.len() as u64,
            pending_ads: self.ads.pending().await?.len() as u64,
            open_tickets: self.support.open_tickets().await?.len() as u64,
        }))
    }

    /// Delivery failures are logged and never unwind the committed
    /// transition.
    async fn notify_best_effort(&self, account: AccountId, notification: Notification) {
        if let Err(error) = self.notifier.notify(account, notification).await {
            tracing::warn!(account, %error, "notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::MemoryStore;
    use crate::infrastructure::membership::StaticMembership;
    use crate::infrastructure::notify::RecordingNotifier;
    use std::sync::Arc;

    const ADMIN: AccountId = 1;
    const USER: AccountId = 7;

    fn orchestrator() -> (Orchestrator, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let orchestrator = Orchestrator::new(
            Stores::from_backend(MemoryStore::new()),
            Arc::new(notifier.clone()),
            Arc::new(StaticMembership::allow_all()),
            EngineConfig::default(),
        );
        (orchestrator, notifier)
    }

    async fn register(orchestrator: &Orchestrator, id: AccountId) {
        orchestrator
            .handle(
                id,
                Command::Start {
                    username: None,
                    referrer: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_privileged_commands_require_admin() {
        let (orchestrator, _) = orchestrator();
        register(&orchestrator, USER).await;

        for command in [
            Command::WithdrawalPaid { request: 1 },
            Command::AdApprove { request: 1 },
            Command::SupportClose { ticket: 1 },
            Command::CreateTask {
                link: "https://example.org/ch".to_string(),
                handle: "ch".to_string(),
                reward: 100,
                description: "subscribe".to_string(),
            },
            Command::Grant {
                account: USER,
                amount: 100,
            },
            Command::Stats,
        ] {
            assert!(matches!(
                orchestrator.handle(USER, command).await,
                Err(RewardsError::Unauthorized)
            ));
        }
    }

    #[tokio::test]
    async fn test_unknown_entities_are_not_found() {
        let (orchestrator, _) = orchestrator();
        register(&orchestrator, USER).await;

        assert!(matches!(
            orchestrator
                .handle(USER, Command::CompletionCheck { task: 99 })
                .await,
            Err(RewardsError::NotFound(_))
        ));
        assert!(matches!(
            orchestrator
                .handle(ADMIN, Command::WithdrawalPaid { request: 99 })
                .await,
            Err(RewardsError::NotFound(_))
        ));
        assert!(matches!(
            orchestrator
                .handle(ADMIN, Command::SupportClose { ticket: 99 })
                .await,
            Err(RewardsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_start_with_referral_credits_and_notifies_inviter() {
        let (orchestrator, notifier) = orchestrator();
        register(&orchestrator, 2).await;

        let outcome = orchestrator
            .handle(
                3,
                Command::Start {
                    username: Some("newcomer".to_string()),
                    referrer: Some(2),
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Registered {
                referral_credited: true,
                ..
            }
        ));

        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 2);
        assert_eq!(sent[0].1, Notification::ReferralBonus { amount: 50 });

        // repeated start does not credit again
        let outcome = orchestrator
            .handle(
                3,
                Command::Start {
                    username: None,
                    referrer: Some(2),
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Registered {
                referral_credited: false,
                ..
            }
        ));
        assert_eq!(notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_self_referral_registers_without_credit() {
        let (orchestrator, notifier) = orchestrator();
        let outcome = orchestrator
            .handle(
                5,
                Command::Start {
                    username: None,
                    referrer: Some(5),
                },
            )
            .await
            .unwrap();
        match outcome {
            Outcome::Registered {
                account,
                referral_credited,
            } => {
                assert!(!referral_credited);
                assert_eq!(account.referrer_id, None);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_stats_reflects_activity() {
        let (orchestrator, _) = orchestrator();
        register(&orchestrator, USER).await;
        orchestrator
            .handle(
                ADMIN,
                Command::CreateTask {
                    link: "https://example.org/ch".to_string(),
                    handle: "ch".to_string(),
                    reward: 500,
                    description: "subscribe".to_string(),
                },
            )
            .await
            .unwrap();
        orchestrator
            .handle(
                ADMIN,
                Command::Grant {
                    account: USER,
                    amount: 2_500,
                },
            )
            .await
            .unwrap();

        match orchestrator.handle(ADMIN, Command::Stats).await.unwrap() {
            Outcome::Stats(report) => {
                assert_eq!(report.total_accounts, 1);
                assert_eq!(report.total_balance, 2_500);
                assert_eq!(report.active_tasks, 1);
                assert_eq!(report.pending_withdrawals, 0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
