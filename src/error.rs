use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewardsError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("card must be a 16-digit number starting with {expected_prefix}")]
    InvalidCard { expected_prefix: String },
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("balance {balance} is below the withdrawal minimum of {minimum}")]
    MinimumNotMet { minimum: u64, balance: u64 },
    /// Idempotency short-circuit: the reward was already granted.
    #[error("task already completed by this account")]
    AlreadyCompleted,
    /// Idempotency short-circuit: the account was already referred.
    #[error("account already referred")]
    AlreadyReferred,
    #[error("{0} not found")]
    NotFound(String),
    #[error("operation requires administrator privileges")]
    Unauthorized,
    #[error("request is not pending")]
    NotPending,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl RewardsError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id}"))
    }

    /// Repeat invocations of idempotent operations are benign, not faults.
    pub fn is_benign_repeat(&self) -> bool {
        matches!(self, Self::AlreadyCompleted | Self::AlreadyReferred)
    }
}

impl From<serde_json::Error> for RewardsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for RewardsError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Internal(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, RewardsError>;
