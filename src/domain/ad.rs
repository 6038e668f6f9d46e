use crate::domain::account::AccountId;
use crate::error::{Result, RewardsError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type AdRequestId = u64;

/// How long a promotion runs. The price table is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdDuration {
    OneWeek,
    TwoWeeks,
    OneMonth,
}

impl AdDuration {
    pub fn price(&self) -> u64 {
        match self {
            Self::OneWeek => 2_000,
            Self::TwoWeeks => 3_500,
            Self::OneMonth => 6_000,
        }
    }

    pub fn parse(label: &str) -> Result<Self> {
        match label {
            "1-week" => Ok(Self::OneWeek),
            "2-weeks" => Ok(Self::TwoWeeks),
            "1-month" => Ok(Self::OneMonth),
            other => Err(RewardsError::Validation(format!(
                "unknown ad duration: {other}"
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneWeek => "1-week",
            Self::TwoWeeks => "2-weeks",
            Self::OneMonth => "1-month",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    Pending,
    Approved,
    Rejected,
}

/// A paid request to promote a channel. Created together with the price
/// debit; on approval it spawns a Task, on rejection it keeps the admin's
/// comment. Neither decision refunds the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRequest {
    pub id: AdRequestId,
    pub requester_id: AccountId,
    pub channel_name: String,
    pub channel_handle: String,
    pub duration: AdDuration,
    pub description: String,
    pub price: u64,
    pub status: AdStatus,
    pub admin_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdRequest {
    pub requester_id: AccountId,
    pub channel_name: String,
    pub channel_handle: String,
    pub duration: AdDuration,
    pub description: String,
}

impl NewAdRequest {
    pub fn into_request(self, id: AdRequestId) -> AdRequest {
        let price = self.duration.price();
        AdRequest {
            id,
            requester_id: self.requester_id,
            channel_name: self.channel_name,
            channel_handle: self.channel_handle,
            duration: self.duration,
            description: self.description,
            price,
            status: AdStatus::Pending,
            admin_comment: None,
            created_at: Utc::now(),
        }
    }
}

impl AdRequest {
    pub fn approve(&mut self) -> Result<()> {
        if self.status != AdStatus::Pending {
            return Err(RewardsError::NotPending);
        }
        self.status = AdStatus::Approved;
        Ok(())
    }

    pub fn reject(&mut self, comment: &str) -> Result<()> {
        if self.status != AdStatus::Pending {
            return Err(RewardsError::NotPending);
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(RewardsError::Validation(
                "rejection requires a comment".to_string(),
            ));
        }
        self.status = AdStatus::Rejected;
        self.admin_comment = Some(comment.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AdRequest {
        NewAdRequest {
            requester_id: 5,
            channel_name: "Rust Jobs".to_string(),
            channel_handle: "rustjobs".to_string(),
            duration: AdDuration::OneWeek,
            description: "daily postings".to_string(),
        }
        .into_request(1)
    }

    #[test]
    fn test_price_table() {
        assert_eq!(AdDuration::OneWeek.price(), 2_000);
        assert_eq!(AdDuration::TwoWeeks.price(), 3_500);
        assert_eq!(AdDuration::OneMonth.price(), 6_000);
    }

    #[test]
    fn test_duration_labels_round_trip() {
        for duration in [AdDuration::OneWeek, AdDuration::TwoWeeks, AdDuration::OneMonth] {
            assert_eq!(AdDuration::parse(duration.label()).unwrap(), duration);
        }
        assert!(AdDuration::parse("3-weeks").is_err());
    }

    #[test]
    fn test_reject_requires_comment() {
        let mut req = request();
        assert!(matches!(
            req.reject("  "),
            Err(RewardsError::Validation(_))
        ));
        assert_eq!(req.status, AdStatus::Pending);

        req.reject("channel violates the rules").unwrap();
        assert_eq!(req.status, AdStatus::Rejected);
        assert_eq!(
            req.admin_comment.as_deref(),
            Some("channel violates the rules")
        );
    }

    #[test]
    fn test_decisions_are_terminal() {
        let mut req = request();
        req.approve().unwrap();
        assert!(matches!(req.approve(), Err(RewardsError::NotPending)));
        assert!(matches!(req.reject("late"), Err(RewardsError::NotPending)));
    }
}
