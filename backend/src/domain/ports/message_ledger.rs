//! Port for the per-chat message ledger.

use async_trait::async_trait;

use crate::domain::{ChatId, Message, MessageId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message ledger adapters.
    pub enum MessageLedgerError {
        /// Ledger connection could not be established.
        Connection { message: String } =>
            "message ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "message ledger query failed: {message}",
        /// A message with the same identifier was already appended.
        DuplicateMessage { message_id: String } =>
            "message {message_id} already exists",
        /// The message to update does not exist.
        MissingMessage { message_id: String } =>
            "message {message_id} not found",
    }
}

/// Port over all messages of a two-party conversation.
///
/// Messages are never deleted; the only permitted mutation is flagging that
/// an email notification went out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageLedger: Send + Sync {
    /// List every message in the chat, in any order.
    async fn list_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, MessageLedgerError>;

    /// Append a message.
    ///
    /// Fails with [`MessageLedgerError::DuplicateMessage`] when the identifier
    /// is already present.
    async fn append(&self, message: &Message) -> Result<(), MessageLedgerError>;

    /// Record that an email notification was sent for a message.
    async fn mark_email_notification_sent(
        &self,
        message_id: &MessageId,
    ) -> Result<(), MessageLedgerError>;
}

/// Fixture ledger that is always empty and discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessageLedger;

#[async_trait]
impl MessageLedger for FixtureMessageLedger {
    async fn list_messages(&self, _chat_id: &ChatId) -> Result<Vec<Message>, MessageLedgerError> {
        Ok(Vec::new())
    }

    async fn append(&self, _message: &Message) -> Result<(), MessageLedgerError> {
        Ok(())
    }

    async fn mark_email_notification_sent(
        &self,
        _message_id: &MessageId,
    ) -> Result<(), MessageLedgerError> {
        Ok(())
    }
}
