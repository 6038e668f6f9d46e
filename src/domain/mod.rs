pub mod account;
pub mod ad;
pub mod ports;
pub mod referral;
pub mod support;
pub mod task;
pub mod withdrawal;
