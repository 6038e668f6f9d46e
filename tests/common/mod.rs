use promoledger::application::command::{Command, Outcome};
use promoledger::application::orchestrator::Orchestrator;
use promoledger::config::EngineConfig;
use promoledger::domain::account::AccountId;
use promoledger::domain::ports::{MembershipCheckerRef, NotifierRef, Stores};
use promoledger::infrastructure::in_memory::MemoryStore;
use promoledger::infrastructure::membership::StaticMembership;
use promoledger::infrastructure::notify::RecordingNotifier;
use std::sync::Arc;

pub const ADMIN: AccountId = 1;

pub struct Harness {
    pub orchestrator: Arc<Orchestrator>,
    pub stores: Stores,
    pub notifier: RecordingNotifier,
}

/// Engine over the in-memory store with a recording notifier and an
/// allow-everything membership oracle.
pub fn harness() -> Harness {
    let notifier = RecordingNotifier::new();
    harness_with(
        Arc::new(notifier.clone()),
        Arc::new(StaticMembership::allow_all()),
        notifier,
    )
}

pub fn harness_with(
    notifier_ref: NotifierRef,
    membership: MembershipCheckerRef,
    notifier: RecordingNotifier,
) -> Harness {
    let stores = Stores::from_backend(MemoryStore::new());
    let orchestrator = Arc::new(Orchestrator::new(
        stores.clone(),
        notifier_ref,
        membership,
        EngineConfig::default(),
    ));
    Harness {
        orchestrator,
        stores,
        notifier,
    }
}

impl Harness {
    pub async fn register(&self, id: AccountId) {
        self.orchestrator
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

    pub async fn grant(&self, id: AccountId, amount: u64) {
        self.orchestrator
            .handle(ADMIN, Command::Grant { account: id, amount })
            .await
            .unwrap();
    }

    pub async fn create_task(&self, reward: u64) -> u64 {
        match self
            .orchestrator
            .handle(
                ADMIN,
                Command::CreateTask {
                    link: "https://example.org/rustfeed".to_string(),
                    handle: "rustfeed".to_string(),
                    reward,
                    description: "subscribe to rustfeed".to_string(),
                },
            )
            .await
            .unwrap()
        {
            Outcome::TaskCreated(task) => task.id,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    pub async fn balance(&self, id: AccountId) -> u64 {
        match self.orchestrator.handle(id, Command::Balance).await.unwrap() {
            Outcome::Balance(balance) => balance.value(),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
