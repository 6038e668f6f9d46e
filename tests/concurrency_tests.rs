mod common;

use common::harness;
use promoledger::application::command::{Command, Outcome};
use promoledger::domain::ad::AdDuration;
use promoledger::error::RewardsError;

const USER: i64 = 7;

#[tokio::test]
async fn test_concurrent_completion_checks_credit_once() {
    let h = harness();
    h.register(USER).await;
    let task = h.create_task(500).await;

    let a = {
        let orchestrator = h.orchestrator.clone();
        tokio::spawn(
            async move { orchestrator.handle(USER, Command::CompletionCheck { task }).await },
        )
    };
    let b = {
        let orchestrator = h.orchestrator.clone();
        tokio::spawn(
            async move { orchestrator.handle(USER, Command::CompletionCheck { task }).await },
        )
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let credited = results
        .iter()
        .filter(|r| matches!(r, Ok(Outcome::TaskCompleted { .. })))
        .count();
    let repeats = results
        .iter()
        .filter(|r| matches!(r, Err(RewardsError::AlreadyCompleted)))
        .count();
    assert_eq!(credited, 1);
    assert_eq!(repeats, 1);
    assert_eq!(h.balance(USER).await, 500);
}

#[tokio::test]
async fn test_concurrent_debits_admit_exactly_one() {
    let h = harness();
    h.register(USER).await;
    h.grant(USER, 10_000).await;

    // the balance covers either the withdrawal minimum or the ad price,
    // never both
    let withdraw = {
        let orchestrator = h.orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .handle(
                    USER,
                    Command::Withdraw {
                        card: "8600123412341234".to_string(),
                    },
                )
                .await
        })
    };
    let advertise = {
        let orchestrator = h.orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .handle(
                    USER,
                    Command::SubmitAd {
                        channel_name: "My Channel".to_string(),
                        channel_handle: "mychannel".to_string(),
                        duration: AdDuration::OneMonth,
                        description: "great memes daily".to_string(),
                    },
                )
                .await
        })
    };

    let withdraw = withdraw.await.unwrap();
    let advertise = advertise.await.unwrap();
    assert_eq!(
        [withdraw.is_ok(), advertise.is_ok()]
            .iter()
            .filter(|ok| **ok)
            .count(),
        1
    );

    let balance = h.balance(USER).await;
    if withdraw.is_ok() {
        assert!(matches!(
            advertise,
            Err(RewardsError::InsufficientFunds { .. })
        ));
        assert_eq!(balance, 0);
    } else {
        assert!(matches!(withdraw, Err(RewardsError::MinimumNotMet { .. })));
        assert_eq!(balance, 4_000);
    }
}

#[tokio::test]
async fn test_concurrent_registrations_credit_referral_once() {
    let h = harness();
    h.register(9).await;
    let start = || Command::Start {
        username: None,
        referrer: Some(9),
    };

    let a = {
        let orchestrator = h.orchestrator.clone();
        let command = start();
        tokio::spawn(async move { orchestrator.handle(4, command).await })
    };
    let b = {
        let orchestrator = h.orchestrator.clone();
        let command = start();
        tokio::spawn(async move { orchestrator.handle(4, command).await })
    };

    let results = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
    let credited = results
        .iter()
        .filter(|outcome| {
            matches!(
                outcome,
                Outcome::Registered {
                    referral_credited: true,
                    ..
                }
            )
        })
        .count();
    assert_eq!(credited, 1);
    assert_eq!(h.balance(9).await, 50);
}
