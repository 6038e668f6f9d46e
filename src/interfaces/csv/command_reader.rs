use crate::application::command::Command;
use crate::domain::account::AccountId;
use crate::domain::ad::AdDuration;
use crate::error::{Result, RewardsError};
use serde::Deserialize;
use std::io::Read;

/// One raw inbound record: `actor, action, arg1..arg4`. Trailing argument
/// columns may be omitted entirely.
#[derive(Debug, Deserialize)]
struct RawRecord {
    actor: AccountId,
    action: String,
    #[serde(default)]
    arg1: Option<String>,
    #[serde(default)]
    arg2: Option<String>,
    #[serde(default)]
    arg3: Option<String>,
    #[serde(default)]
    arg4: Option<String>,
}

impl RawRecord {
    fn require(&self, index: usize, name: &str) -> Result<String> {
        let value = match index {
            1 => &self.arg1,
            2 => &self.arg2,
            3 => &self.arg3,
            _ => &self.arg4,
        };
        value
            .as_deref()
            .map(str::to_string)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                RewardsError::Validation(format!("action '{}' requires {name}", self.action))
            })
    }

    fn optional(&self, index: usize) -> Option<String> {
        let value = match index {
            1 => &self.arg1,
            2 => &self.arg2,
            3 => &self.arg3,
            _ => &self.arg4,
        };
        value.as_deref().map(str::to_string).filter(|v| !v.is_empty())
    }
}

fn parse_id(action: &str, suffix: &str) -> Result<u64> {
    suffix
        .parse()
        .map_err(|_| RewardsError::Validation(format!("bad id in action '{action}'")))
}

fn parse_number<T: std::str::FromStr>(what: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| RewardsError::Validation(format!("'{raw}' is not a valid {what}")))
}

/// Turns one raw record into the command the orchestrator understands.
///
/// Entity-addressed actions carry their id as an opaque `verb:<id>`
/// suffix, matching the callback identifiers the transport round-trips.
fn parse(record: RawRecord) -> Result<(AccountId, Command)> {
    let action = record.action.clone();
    let (verb, suffix) = match action.split_once(':') {
        Some((verb, suffix)) => (verb, Some(suffix)),
        None => (action.as_str(), None),
    };

    let command = match (verb, suffix) {
        ("start", None) => Command::Start {
            referrer: match record.optional(1) {
                Some(token) => Some(parse_number("inviter id", &token)?),
                None => None,
            },
            username: record.optional(2),
        },
        ("balance", None) => Command::Balance,
        ("profile", None) => Command::Profile,
        ("tasks", None) => Command::ListTasks,
        ("task", Some(id)) => Command::ViewTask {
            task: parse_id(&action, id)?,
        },
        ("completion-check", Some(id)) => Command::CompletionCheck {
            task: parse_id(&action, id)?,
        },
        ("withdraw", None) => Command::Withdraw {
            card: record.require(1, "a card number")?,
        },
        ("withdrawal-paid", Some(id)) => Command::WithdrawalPaid {
            request: parse_id(&action, id)?,
        },
        ("withdrawal-rejected", Some(id)) => Command::WithdrawalRejected {
            request: parse_id(&action, id)?,
        },
        ("ad-submit", None) => Command::SubmitAd {
            channel_name: record.require(1, "a channel name")?,
            channel_handle: record.require(2, "a channel handle")?,
            duration: AdDuration::parse(&record.require(3, "a duration")?)?,
            description: record.require(4, "a description")?,
        },
        ("ad-approve", Some(id)) => Command::AdApprove {
            request: parse_id(&action, id)?,
        },
        ("ad-reject", Some(id)) => Command::AdReject {
            request: parse_id(&action, id)?,
            comment: record.require(1, "a rejection comment")?,
        },
        ("support-open", None) => Command::SupportOpen {
            message: record.require(1, "a message")?,
        },
        ("support-reply", Some(id)) => Command::SupportReply {
            ticket: parse_id(&action, id)?,
            text: record.require(1, "a reply")?,
        },
        ("support-close", Some(id)) => Command::SupportClose {
            ticket: parse_id(&action, id)?,
        },
        ("create-task", None) => Command::CreateTask {
            link: record.require(1, "a channel link")?,
            handle: record.require(2, "a channel handle")?,
            reward: parse_number("reward", &record.require(3, "a reward")?)?,
            description: record.require(4, "a description")?,
        },
        ("deactivate-task", Some(id)) => Command::DeactivateTask {
            task: parse_id(&action, id)?,
        },
        ("grant", None) => Command::Grant {
            account: parse_number("account id", &record.require(1, "an account id")?)?,
            amount: parse_number("amount", &record.require(2, "an amount")?)?,
        },
        ("stats", None) => Command::Stats,
        _ => {
            return Err(RewardsError::Validation(format!(
                "unknown action '{action}'"
            )));
        }
    };

    Ok((record.actor, command))
}

/// Reads inbound commands from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record
/// lengths, and yields an iterator of parsed commands so large inputs
/// stream without loading everything into memory.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<(AccountId, Command)>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(RewardsError::from).and_then(parse))
    }
}
