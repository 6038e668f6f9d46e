//! Ephemeral per-session conversational state.
//!
//! Multi-step submissions (withdrawal, ad request, support message) collect
//! their inputs here before anything touches the engine. The state is a
//! plain value owned by the transport and passed through pure step
//! functions; discarding it at any point abandons the draft with no
//! externally visible effect. Only the final confirm step emits a command.

use crate::application::command::Command;
use crate::domain::ad::AdDuration;
use crate::error::{Result, RewardsError};

/// Reply that abandons the current draft from any step.
pub const CANCEL: &str = "cancel";
/// Reply that commits a completed draft.
pub const CONFIRM: &str = "confirm";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdDraft {
    pub channel_name: Option<String>,
    pub channel_handle: Option<String>,
    pub duration: Option<AdDuration>,
    pub description: Option<String>,
}

impl AdDraft {
    fn complete(&self) -> bool {
        self.channel_name.is_some()
            && self.channel_handle.is_some()
            && self.duration.is_some()
            && self.description.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingCard,
    ConfirmingWithdrawal {
        card: String,
    },
    AdDraft(AdDraft),
    AwaitingSupportMessage,
}

/// Outcome of feeding one free-text reply into a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The draft needs more input; carry the state into the next reply.
    Prompt {
        state: SessionState,
        prompt: &'static str,
    },
    /// The draft is confirmed; hand the command to the orchestrator.
    Emit(Command),
    /// The draft was abandoned. Nothing happened.
    Cancelled,
}

impl SessionState {
    pub fn begin_withdrawal() -> (Self, &'static str) {
        (Self::AwaitingCard, "send the 16-digit card number")
    }

    pub fn begin_ad() -> (Self, &'static str) {
        (Self::AdDraft(AdDraft::default()), "send the channel name")
    }

    pub fn begin_support() -> (Self, &'static str) {
        (Self::AwaitingSupportMessage, "describe the problem")
    }

    /// Consumes the state and one reply. Invalid input never loses the
    /// collected fields; the same state comes back with a fresh prompt.
    pub fn advance(self, input: &str) -> Result<Step> {
        let input = input.trim();
        if input.eq_ignore_ascii_case(CANCEL) {
            return Ok(Step::Cancelled);
        }

        match self {
            Self::Idle => Err(RewardsError::Validation(
                "no submission in progress".to_string(),
            )),
            Self::AwaitingCard => Ok(Step::Prompt {
                state: Self::ConfirmingWithdrawal {
                    card: input.to_string(),
                },
                prompt: "reply 'confirm' to withdraw the full balance",
            }),
            Self::ConfirmingWithdrawal { card } => {
                if input.eq_ignore_ascii_case(CONFIRM) {
                    Ok(Step::Emit(Command::Withdraw { card }))
                } else {
                    Ok(Step::Prompt {
                        state: Self::ConfirmingWithdrawal { card },
                        prompt: "reply 'confirm' to withdraw the full balance",
                    })
                }
            }
            Self::AdDraft(draft) => Self::advance_ad(draft, input),
            Self::AwaitingSupportMessage => Ok(Step::Emit(Command::SupportOpen {
                message: input.to_string(),
            })),
        }
    }

    fn advance_ad(mut draft: AdDraft, input: &str) -> Result<Step> {
        if draft.channel_name.is_none() {
            draft.channel_name = Some(input.to_string());
            return Ok(Step::Prompt {
                state: Self::AdDraft(draft),
                prompt: "send the channel handle",
            });
        }
        if draft.channel_handle.is_none() {
            draft.channel_handle = Some(input.to_string());
            return Ok(Step::Prompt {
                state: Self::AdDraft(draft),
                prompt: "choose a duration: 1-week, 2-weeks or 1-month",
            });
        }
        if draft.duration.is_none() {
            return Ok(match AdDuration::parse(input) {
                Ok(duration) => {
                    draft.duration = Some(duration);
                    Step::Prompt {
                        state: Self::AdDraft(draft),
                        prompt: "describe the promotion",
                    }
                }
                Err(_) => Step::Prompt {
                    state: Self::AdDraft(draft),
                    prompt: "choose a duration: 1-week, 2-weeks or 1-month",
                },
            });
        }
        if draft.description.is_none() {
            draft.description = Some(input.to_string());
            return Ok(Step::Prompt {
                state: Self::AdDraft(draft),
                prompt: "reply 'confirm' to submit and pay",
            });
        }

        if input.eq_ignore_ascii_case(CONFIRM) && draft.complete() {
            // complete() holds here, the fields below are all filled
            let (Some(channel_name), Some(channel_handle), Some(duration), Some(description)) = (
                draft.channel_name,
                draft.channel_handle,
                draft.duration,
                draft.description,
            ) else {
                return Err(RewardsError::Validation(
                    "incomplete ad draft".to_string(),
                ));
            };
            return Ok(Step::Emit(Command::SubmitAd {
                channel_name,
                channel_handle,
                duration,
                description,
            }));
        }

        Ok(Step::Prompt {
            state: Self::AdDraft(draft),
            prompt: "reply 'confirm' to submit and pay",
        })
    }
}
