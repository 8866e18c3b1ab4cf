//! Chats and the messages exchanged inside them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserAddress;

/// Maximum accepted message length in characters.
pub const MESSAGE_BODY_MAX: usize = 4000;

/// Stable chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(Uuid);

impl ChatId {
    /// Wrap an existing UUID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable message identifier.
///
/// Clients may supply their own identifier so that retried sends append the
/// message once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Wrap an existing UUID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation errors for message bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageBodyValidationError {
    /// The body was empty once trimmed.
    #[error("message body must not be blank")]
    Blank,
    /// The body exceeded [`MESSAGE_BODY_MAX`] characters.
    #[error("message body must be at most {max} characters")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// Non-blank chat message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageBody(String);

impl MessageBody {
    /// Validate and construct a body from owned input.
    pub fn new(body: impl Into<String>) -> Result<Self, MessageBodyValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(MessageBodyValidationError::Blank);
        }
        if body.chars().count() > MESSAGE_BODY_MAX {
            return Err(MessageBodyValidationError::TooLong {
                max: MESSAGE_BODY_MAX,
            });
        }
        Ok(Self(body))
    }

    /// Leading characters of the body, for notification previews.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.0.chars().take(max_chars).collect();
        if self.0.chars().count() > max_chars {
            preview.push('…');
        }
        preview
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MessageBody> for String {
    fn from(value: MessageBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for MessageBody {
    type Error = MessageBodyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Conversation opened when a match becomes mutual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Chat identifier.
    pub id: ChatId,
    /// Participant who proposed first.
    pub user_a: UserAddress,
    /// Participant who reciprocated.
    pub user_b: UserAddress,
    /// When the match became mutual.
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Whether `address` takes part in this chat.
    pub fn has_participant(&self, address: &UserAddress) -> bool {
        &self.user_a == address || &self.user_b == address
    }

    /// The other participant, if `address` takes part in this chat.
    pub fn counterpart_of(&self, address: &UserAddress) -> Option<&UserAddress> {
        if &self.user_a == address {
            Some(&self.user_b)
        } else if &self.user_b == address {
            Some(&self.user_a)
        } else {
            None
        }
    }
}

/// A single chat message.
///
/// ## Invariants
/// - `sender != receiver`.
/// - Immutable once appended, apart from `email_notification_sent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Chat the message belongs to.
    pub chat_id: ChatId,
    /// Author.
    pub sender: UserAddress,
    /// Recipient.
    pub receiver: UserAddress,
    /// Message text.
    pub body: MessageBody,
    /// When the ledger accepted the message.
    pub created_at: DateTime<Utc>,
    /// Whether an email notification went out for this message.
    pub email_notification_sent: bool,
}

impl Message {
    /// Whether this message was sent by `address`.
    pub fn is_from(&self, address: &UserAddress) -> bool {
        &self.sender == address
    }
}
