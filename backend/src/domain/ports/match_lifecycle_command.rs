//! Driving port for match proposals.
//!
//! Swipe-accepts and icebreakers both arrive here as a [`ProposeRequest`].
//! Implementations advance the pair's lifecycle and report where it landed.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{ChatId, Error, MatchState, Message, MessageBody, UserAddress};

use super::NotificationReport;

/// Request to express interest in another participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposeRequest {
    /// Participant acting.
    pub initiator: UserAddress,
    /// Participant being proposed to.
    pub target: UserAddress,
    /// Optional first message sent alongside the proposal.
    pub icebreaker: Option<MessageBody>,
}

/// Where a proposal left the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeOutcome {
    /// Lifecycle state after the call.
    pub state: MatchState,
    /// Chat for the pair once the match is complete.
    pub chat_id: Option<ChatId>,
    /// Icebreakers written into the chat by this call.
    pub seeded_messages: Vec<Message>,
    /// Notifications sent to the counterpart by this call.
    pub notifications: NotificationReport,
}

/// Driving port for the match lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchLifecycleCommand: Send + Sync {
    /// Record interest from `initiator` in `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Both sides are the same participant (invalid request).
    /// - The match store is unreachable or a write fails; no side effect may
    ///   be assumed and the caller should retry the whole call.
    /// - A concurrent proposal keeps winning the pair uniqueness race
    ///   (conflict).
    async fn propose(&self, request: ProposeRequest) -> Result<ProposeOutcome, Error>;
}

/// Fixture implementation that reports every proposal as partial.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMatchLifecycleCommand;

#[async_trait]
impl MatchLifecycleCommand for FixtureMatchLifecycleCommand {
    async fn propose(&self, _request: ProposeRequest) -> Result<ProposeOutcome, Error> {
        Ok(ProposeOutcome {
            state: MatchState::Partial,
            chat_id: None,
            seeded_messages: Vec::new(),
            notifications: NotificationReport::skipped("match is not mutual yet"),
        })
    }
}
