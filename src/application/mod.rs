//! Application layer: the workflow services and the orchestrator that
//! mediates every inbound command.

pub mod ads;
pub mod command;
pub mod ledger;
pub mod orchestrator;
pub mod referrals;
pub mod support;
pub mod tasks;
pub mod withdrawals;
