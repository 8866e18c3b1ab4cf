//! Port for outbound notifications (email, Telegram).
//!
//! The domain decides *whether* to notify; adapters own delivery.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{ChatId, UserAddress};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum NotifierError {
        /// The provider rejected or failed to deliver the notification.
        Delivery { message: String } =>
            "notification delivery failed: {message}",
    }
}

/// Delivery channel for a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationChannel {
    /// Email to the given address.
    Email {
        /// Recipient email address.
        address: String,
    },
    /// Telegram message to the given chat.
    Telegram {
        /// Recipient Telegram chat identifier.
        chat_id: i64,
    },
}

/// What the notification is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// The recipient has a new mutual match.
    NewMatch {
        /// The participant the recipient matched with.
        counterpart: UserAddress,
        /// Chat opened for the match.
        chat_id: ChatId,
    },
    /// The recipient received a chat message.
    NewMessage {
        /// Author of the message.
        from: UserAddress,
        /// Chat the message belongs to.
        chat_id: ChatId,
        /// Shortened message text.
        preview: String,
    },
}

/// A notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Participant being notified.
    pub recipient: UserAddress,
    /// Delivery channel.
    pub channel: NotificationChannel,
    /// Notification payload.
    pub kind: NotificationKind,
}

/// Port for notification delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a single notification.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifierError>;
}

/// Fixture notifier that accepts and drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotifier;

#[async_trait]
impl Notifier for FixtureNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotifierError> {
        Ok(())
    }
}

/// Result of one notification attempt, reported back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationStatus {
    /// The notifier accepted the notification.
    Sent,
    /// No notification was attempted.
    Skipped {
        /// Why the notification was not attempted.
        reason: String,
    },
    /// The notifier failed; the surrounding action still succeeded.
    Failed {
        /// Delivery failure description.
        reason: String,
    },
}

impl NotificationStatus {
    /// Convenience constructor for [`NotificationStatus::Skipped`].
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }
}

/// Per-channel outcome of notifying one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    /// Email outcome.
    pub email: NotificationStatus,
    /// Telegram outcome.
    pub telegram: NotificationStatus,
}

impl NotificationReport {
    /// Report for an action that notifies nobody.
    pub fn skipped(reason: &str) -> Self {
        Self {
            email: NotificationStatus::skipped(reason),
            telegram: NotificationStatus::skipped(reason),
        }
    }
}
