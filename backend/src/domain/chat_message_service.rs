//! Chat message domain service.
//!
//! Gates every send through the message throttle, appends accepted messages
//! to the ledger and decides whether the receiver gets an email about them.
//! Client-supplied message ids make retried sends append once.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::notification_dispatch::NotificationDispatch;
use crate::domain::ports::{
    ChatMessageCommand, ContactDirectory, MatchRepository, MatchRepositoryError, MessageLedger,
    MessageLedgerError, NotificationKind, NotificationReport, NotificationStatus, Notifier,
    SendMessageOutcome, SendMessageRequest, ThrottleStatus, ThrottleStatusQuery,
    ThrottleStatusRequest,
};
use crate::domain::{
    Chat, ChatId, Error, Message, MessageId, ThrottlePolicy, UserAddress, can_send_email,
};

/// Characters of the message body included in notifications.
const PREVIEW_CHARS: usize = 140;

/// Chat message service implementing [`ChatMessageCommand`] and
/// [`ThrottleStatusQuery`].
pub struct ChatMessageService<M, L, C, N> {
    matches: Arc<M>,
    ledger: Arc<L>,
    dispatch: NotificationDispatch<C, N>,
    policy: ThrottlePolicy,
    clock: Arc<dyn Clock>,
}

impl<M, L, C, N> Clone for ChatMessageService<M, L, C, N> {
    fn clone(&self) -> Self {
        Self {
            matches: Arc::clone(&self.matches),
            ledger: Arc::clone(&self.ledger),
            dispatch: self.dispatch.clone(),
            policy: self.policy,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<M, L, C, N> ChatMessageService<M, L, C, N>
where
    M: MatchRepository,
    L: MessageLedger,
    C: ContactDirectory,
    N: Notifier,
{
    /// Create a new service using the default [`ThrottlePolicy`].
    pub fn new(
        matches: Arc<M>,
        ledger: Arc<L>,
        contacts: Arc<C>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            matches,
            ledger,
            dispatch: NotificationDispatch::new(contacts, notifier),
            policy: ThrottlePolicy::default(),
            clock,
        }
    }

    /// Replace the throttle policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ThrottlePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn map_match_error(error: MatchRepositoryError) -> Error {
        match error {
            MatchRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("match repository unavailable: {message}"))
            }
            MatchRepositoryError::Query { message } | MatchRepositoryError::Conflict { message } => {
                Error::internal(format!("match repository error: {message}"))
            }
        }
    }

    fn map_ledger_error(error: MessageLedgerError) -> Error {
        match error {
            MessageLedgerError::Connection { message } => {
                Error::service_unavailable(format!("message ledger unavailable: {message}"))
            }
            MessageLedgerError::Query { message } => {
                Error::internal(format!("message ledger error: {message}"))
            }
            MessageLedgerError::DuplicateMessage { message_id } => {
                Error::conflict(format!("message {message_id} already exists"))
            }
            MessageLedgerError::MissingMessage { message_id } => {
                Error::internal(format!("message {message_id} disappeared from the ledger"))
            }
        }
    }

    /// Load the chat and resolve the receiver opposite `sender`.
    async fn participants(
        &self,
        chat_id: &ChatId,
        sender: &UserAddress,
    ) -> Result<(Chat, UserAddress), Error> {
        let chat = self
            .matches
            .find_chat_by_id(chat_id)
            .await
            .map_err(Self::map_match_error)?
            .ok_or_else(|| Error::not_found(format!("chat {chat_id} not found")))?;
        let receiver = chat
            .counterpart_of(sender)
            .cloned()
            .ok_or_else(|| Error::forbidden("sender is not a participant in this chat"))?;
        Ok((chat, receiver))
    }

    async fn list(&self, chat_id: &ChatId) -> Result<Vec<Message>, Error> {
        self.ledger
            .list_messages(chat_id)
            .await
            .map_err(Self::map_ledger_error)
    }

    fn replay(
        messages: &[Message],
        message_id: &MessageId,
        sender: &UserAddress,
    ) -> Option<Result<SendMessageOutcome, Error>> {
        let stored = messages.iter().find(|message| &message.id == message_id)?;
        if !stored.is_from(sender) {
            return Some(Err(Error::conflict(format!(
                "message {message_id} belongs to another sender"
            ))));
        }
        Some(Ok(SendMessageOutcome::Delivered {
            message: stored.clone(),
            notifications: NotificationReport::skipped("message was already delivered"),
            replayed: true,
        }))
    }

    async fn notify_receiver(
        &self,
        message: &mut Message,
        history: &[Message],
        now: DateTime<Utc>,
    ) -> NotificationReport {
        let email_gate = can_send_email(history, &message.sender, &message.receiver, now);
        debug!(
            chat_id = %message.chat_id,
            can_send = email_gate.can_send,
            reason = %email_gate.reason,
            "email throttle evaluated"
        );
        let kind = NotificationKind::NewMessage {
            from: message.sender.clone(),
            chat_id: message.chat_id,
            preview: message.body.preview(PREVIEW_CHARS),
        };
        let report = self
            .dispatch
            .dispatch(&message.receiver, kind, &email_gate)
            .await;

        if report.email == NotificationStatus::Sent {
            match self.ledger.mark_email_notification_sent(&message.id).await {
                Ok(()) => message.email_notification_sent = true,
                Err(error) => warn!(
                    message_id = %message.id,
                    %error,
                    "failed to flag email notification"
                ),
            }
        }
        report
    }
}

#[async_trait]
impl<M, L, C, N> ChatMessageCommand for ChatMessageService<M, L, C, N>
where
    M: MatchRepository,
    L: MessageLedger,
    C: ContactDirectory,
    N: Notifier,
{
    async fn send_message(&self, request: SendMessageRequest) -> Result<SendMessageOutcome, Error> {
        let (chat, receiver) = self.participants(&request.chat_id, &request.sender).await?;
        let mut history = self.list(&chat.id).await?;

        if let Some(replayed) = request
            .client_message_id
            .as_ref()
            .and_then(|id| Self::replay(&history, id, &request.sender))
        {
            debug!(chat_id = %chat.id, "replaying stored message");
            return replayed;
        }

        let now = self.clock.utc();
        let decision = self
            .policy
            .can_send_message(&history, &request.sender, &receiver, now);
        if !decision.can_send {
            info!(
                chat_id = %chat.id,
                sender = %request.sender,
                reason = %decision.reason,
                "message throttled"
            );
            return Ok(SendMessageOutcome::Throttled { decision });
        }

        let mut message = Message {
            id: request.client_message_id.unwrap_or_else(MessageId::random),
            chat_id: chat.id,
            sender: request.sender.clone(),
            receiver,
            body: request.body,
            created_at: now,
            email_notification_sent: false,
        };
        match self.ledger.append(&message).await {
            Ok(()) => {}
            Err(MessageLedgerError::DuplicateMessage { message_id }) => {
                debug!(%message_id, "concurrent append; re-reading ledger");
                let current = self.list(&chat.id).await?;
                return Self::replay(&current, &message.id, &request.sender).unwrap_or_else(|| {
                    Err(Error::conflict(format!("message {message_id} already exists")))
                });
            }
            Err(error) => return Err(Self::map_ledger_error(error)),
        }

        history.push(message.clone());
        let notifications = self.notify_receiver(&mut message, &history, now).await;
        info!(
            chat_id = %chat.id,
            message_id = %message.id,
            email_sent = message.email_notification_sent,
            "message delivered"
        );

        Ok(SendMessageOutcome::Delivered {
            message,
            notifications,
            replayed: false,
        })
    }
}

#[async_trait]
impl<M, L, C, N> ThrottleStatusQuery for ChatMessageService<M, L, C, N>
where
    M: MatchRepository,
    L: MessageLedger,
    C: ContactDirectory,
    N: Notifier,
{
    async fn throttle_status(
        &self,
        request: ThrottleStatusRequest,
    ) -> Result<ThrottleStatus, Error> {
        let (chat, receiver) = self.participants(&request.chat_id, &request.sender).await?;
        let history = self.list(&chat.id).await?;
        let now = self.clock.utc();

        Ok(ThrottleStatus {
            message: self
                .policy
                .can_send_message(&history, &request.sender, &receiver, now),
            email: can_send_email(&history, &request.sender, &receiver, now),
        })
    }
}

#[cfg(test)]
#[path = "chat_message_service_tests.rs"]
mod tests;
