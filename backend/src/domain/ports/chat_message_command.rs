//! Driving port for sending chat messages.

use async_trait::async_trait;

use crate::domain::{ChatId, Error, Message, MessageBody, MessageId, ThrottleDecision, UserAddress};

use super::NotificationReport;

/// Request to append a message to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    /// Chat receiving the message.
    pub chat_id: ChatId,
    /// Participant sending the message.
    pub sender: UserAddress,
    /// Message text.
    pub body: MessageBody,
    /// Client-chosen identifier; retries with the same id append once.
    pub client_message_id: Option<MessageId>,
}

/// Result of a send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageOutcome {
    /// The message is in the ledger.
    Delivered {
        /// The stored message.
        message: Message,
        /// Notifications sent to the receiver.
        notifications: NotificationReport,
        /// Whether the message was already stored by an earlier attempt.
        replayed: bool,
    },
    /// The sender must wait for a reply before sending more.
    Throttled {
        /// The negative message-throttle decision.
        decision: ThrottleDecision,
    },
}

/// Driving port for chat messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatMessageCommand: Send + Sync {
    /// Send a message, subject to the message throttle.
    ///
    /// A throttle denial is returned as [`SendMessageOutcome::Throttled`],
    /// not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the chat does not exist (not found), the sender is
    /// not a participant (forbidden), or the ledger fails.
    async fn send_message(&self, request: SendMessageRequest) -> Result<SendMessageOutcome, Error>;
}

/// Fixture implementation that throttles every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChatMessageCommand;

#[async_trait]
impl ChatMessageCommand for FixtureChatMessageCommand {
    async fn send_message(
        &self,
        _request: SendMessageRequest,
    ) -> Result<SendMessageOutcome, Error> {
        Ok(SendMessageOutcome::Throttled {
            decision: ThrottleDecision::deny("fixture chat does not accept messages"),
        })
    }
}
