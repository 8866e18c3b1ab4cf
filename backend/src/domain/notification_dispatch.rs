//! Fan-out of a single notification to a participant's linked channels.
//!
//! Callers decide whether email is permitted (the throttle engine or the
//! first-contact allowance); this helper resolves contact details, applies the
//! participant's opt-in and reports what happened on each channel. Delivery
//! failures are logged and reported, never propagated.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ports::{
    ContactDirectory, Notification, NotificationChannel, NotificationKind, NotificationReport,
    NotificationStatus, Notifier,
};
use crate::domain::{ThrottleDecision, UserAddress};

pub(crate) struct NotificationDispatch<C, N> {
    contacts: Arc<C>,
    notifier: Arc<N>,
}

impl<C, N> Clone for NotificationDispatch<C, N> {
    fn clone(&self) -> Self {
        Self {
            contacts: Arc::clone(&self.contacts),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<C, N> NotificationDispatch<C, N>
where
    C: ContactDirectory,
    N: Notifier,
{
    pub(crate) fn new(contacts: Arc<C>, notifier: Arc<N>) -> Self {
        Self { contacts, notifier }
    }

    /// Notify `recipient` on every channel they linked.
    ///
    /// Email is attempted only when `email_gate` allows it and the recipient
    /// opted in; Telegram is attempted whenever a chat id is on file.
    pub(crate) async fn dispatch(
        &self,
        recipient: &UserAddress,
        kind: NotificationKind,
        email_gate: &ThrottleDecision,
    ) -> NotificationReport {
        let contact = match self.contacts.find_contact(recipient).await {
            Ok(Some(contact)) => contact,
            Ok(None) => {
                debug!(%recipient, "no contact details on file");
                return NotificationReport::skipped("no contact details on file");
            }
            Err(error) => {
                warn!(%recipient, %error, "contact lookup failed");
                let reason = format!("contact lookup failed: {error}");
                return NotificationReport {
                    email: NotificationStatus::Failed {
                        reason: reason.clone(),
                    },
                    telegram: NotificationStatus::Failed { reason },
                };
            }
        };

        let email = if !email_gate.can_send {
            NotificationStatus::skipped(email_gate.reason.clone())
        } else if let Some(address) = contact.reachable_email() {
            let channel = NotificationChannel::Email {
                address: address.to_owned(),
            };
            self.deliver(recipient, channel, kind.clone()).await
        } else {
            NotificationStatus::skipped("email notifications not enabled")
        };

        let telegram = match contact.telegram_chat_id {
            Some(chat_id) => {
                self.deliver(recipient, NotificationChannel::Telegram { chat_id }, kind)
                    .await
            }
            None => NotificationStatus::skipped("telegram not linked"),
        };

        NotificationReport { email, telegram }
    }

    async fn deliver(
        &self,
        recipient: &UserAddress,
        channel: NotificationChannel,
        kind: NotificationKind,
    ) -> NotificationStatus {
        let notification = Notification {
            recipient: recipient.clone(),
            channel,
            kind,
        };
        match self.notifier.notify(&notification).await {
            Ok(()) => NotificationStatus::Sent,
            Err(error) => {
                warn!(
                    %recipient,
                    channel = ?notification.channel,
                    %error,
                    "notification delivery failed"
                );
                NotificationStatus::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }
}
