//! Notifier adapter that records delivery decisions in the trace log.
//!
//! Email and Telegram delivery mechanics live outside this service; the
//! adapter emits one structured `info` event per notification so operators
//! (and downstream log shippers) can see exactly what would be delivered.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    Notification, NotificationChannel, NotificationKind, Notifier, NotifierError,
};

/// Notifier that logs each notification and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Create a new notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifierError> {
        let (channel, destination) = match &notification.channel {
            NotificationChannel::Email { address } => ("email", address.clone()),
            NotificationChannel::Telegram { chat_id } => ("telegram", chat_id.to_string()),
        };
        match &notification.kind {
            NotificationKind::NewMatch {
                counterpart,
                chat_id,
            } => info!(
                recipient = %notification.recipient,
                channel,
                %destination,
                %counterpart,
                %chat_id,
                "new match notification"
            ),
            NotificationKind::NewMessage {
                from,
                chat_id,
                preview,
            } => info!(
                recipient = %notification.recipient,
                channel,
                %destination,
                %from,
                %chat_id,
                preview = preview.as_str(),
                "new message notification"
            ),
        }
        Ok(())
    }
}
