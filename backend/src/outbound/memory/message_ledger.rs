//! In-memory implementation of [`MessageLedger`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{MessageLedger, MessageLedgerError};
use crate::domain::{ChatId, Message, MessageId};

use super::lock;

/// Stored message plus its append position.
#[derive(Debug)]
struct Entry {
    sequence: u64,
    message: Message,
}

#[derive(Debug, Default)]
struct Entries {
    next_sequence: u64,
    by_id: HashMap<MessageId, Entry>,
}

/// Append-only message ledger with unique message identifiers.
///
/// Messages sharing a `created_at` list in append order.
#[derive(Debug, Default)]
pub struct InMemoryMessageLedger {
    messages: Mutex<Entries>,
}

impl InMemoryMessageLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageLedger for InMemoryMessageLedger {
    async fn list_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, MessageLedgerError> {
        let messages = lock(&self.messages, "message ledger").map_err(MessageLedgerError::query)?;
        let mut listed: Vec<&Entry> = messages
            .by_id
            .values()
            .filter(|entry| &entry.message.chat_id == chat_id)
            .collect();
        listed.sort_by_key(|entry| (entry.message.created_at, entry.sequence));
        Ok(listed
            .into_iter()
            .map(|entry| entry.message.clone())
            .collect())
    }

    async fn append(&self, message: &Message) -> Result<(), MessageLedgerError> {
        let mut messages =
            lock(&self.messages, "message ledger").map_err(MessageLedgerError::query)?;
        if messages.by_id.contains_key(&message.id) {
            return Err(MessageLedgerError::duplicate_message(message.id.to_string()));
        }
        let sequence = messages.next_sequence;
        messages.next_sequence += 1;
        messages.by_id.insert(
            message.id,
            Entry {
                sequence,
                message: message.clone(),
            },
        );
        Ok(())
    }

    async fn mark_email_notification_sent(
        &self,
        message_id: &MessageId,
    ) -> Result<(), MessageLedgerError> {
        let mut messages =
            lock(&self.messages, "message ledger").map_err(MessageLedgerError::query)?;
        let entry = messages
            .by_id
            .get_mut(message_id)
            .ok_or_else(|| MessageLedgerError::missing_message(message_id.to_string()))?;
        entry.message.email_notification_sent = true;
        Ok(())
    }
}
