//! Match lifecycle domain service.
//!
//! Drives a participant pair through `None` → `Partial` → `Complete`. The
//! counterpart reciprocating opens the pair's chat, seeds it with any
//! icebreakers and notifies the participant who proposed first. Writes are
//! sequential without a surrounding transaction: only the caller that creates
//! the chat seeds it, and a repeated call on a complete match finishes an
//! interrupted completion (missing chat or missing icebreakers) instead of
//! failing.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::notification_dispatch::NotificationDispatch;
use crate::domain::ports::{
    ContactDirectory, MatchLifecycleCommand, MatchRepository, MatchRepositoryError,
    MessageLedger, MessageLedgerError, NotificationKind, NotificationReport, Notifier,
    ProposeOutcome, ProposeRequest,
};
use crate::domain::{
    Chat, ChatId, Error, Match, MatchState, Message, MessageBody, MessageId, ThrottleDecision,
    UserAddress, UserPair,
};

const FIRST_CONTACT_REASON: &str = "first contact with a new match";

/// Result of one pass over the pair's current state.
enum Attempt {
    Settled(ProposeOutcome),
    /// Another writer created the pair's match between lookup and insert.
    LostRace(String),
}

/// Result of trying to open the chat for a completed pair.
enum OpenedChat {
    /// This call created the chat and owns seeding it.
    Created(Chat),
    /// Another writer created it first.
    Existing(Chat),
}

/// An icebreaker waiting to be written into a chat.
struct Icebreaker {
    sender: UserAddress,
    receiver: UserAddress,
    body: MessageBody,
}

impl Icebreaker {
    fn matches(&self, message: &Message) -> bool {
        message.is_from(&self.sender) && message.body == self.body
    }
}

/// Match lifecycle service implementing [`MatchLifecycleCommand`].
pub struct MatchLifecycleService<M, L, C, N> {
    matches: Arc<M>,
    ledger: Arc<L>,
    dispatch: NotificationDispatch<C, N>,
    clock: Arc<dyn Clock>,
}

impl<M, L, C, N> Clone for MatchLifecycleService<M, L, C, N> {
    fn clone(&self) -> Self {
        Self {
            matches: Arc::clone(&self.matches),
            ledger: Arc::clone(&self.ledger),
            dispatch: self.dispatch.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<M, L, C, N> MatchLifecycleService<M, L, C, N>
where
    M: MatchRepository,
    L: MessageLedger,
    C: ContactDirectory,
    N: Notifier,
{
    /// Create a new service with the given collaborators.
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
            clock,
        }
    }

    fn map_match_error(error: MatchRepositoryError) -> Error {
        match error {
            MatchRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("match repository unavailable: {message}"))
            }
            MatchRepositoryError::Query { message } => {
                Error::internal(format!("match repository error: {message}"))
            }
            MatchRepositoryError::Conflict { message } => Error::conflict(message),
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

    fn partial(notifications: NotificationReport) -> ProposeOutcome {
        ProposeOutcome {
            state: MatchState::Partial,
            chat_id: None,
            seeded_messages: Vec::new(),
            notifications,
        }
    }

    async fn attempt(&self, pair: &UserPair, request: &ProposeRequest) -> Result<Attempt, Error> {
        let existing = self
            .matches
            .find_match(pair)
            .await
            .map_err(Self::map_match_error)?;

        let outcome = match existing {
            None => return self.open_match(request).await,
            Some(record) if record.matched => self.settle_complete(pair, record, request).await?,
            Some(record) if record.initiated_by(&request.initiator) => {
                self.repropose(pair, request).await?
            }
            Some(record) => self.reciprocate(pair, record, request).await?,
        };
        Ok(Attempt::Settled(outcome))
    }

    async fn open_match(&self, request: &ProposeRequest) -> Result<Attempt, Error> {
        let record = Match::proposed(
            request.initiator.clone(),
            request.target.clone(),
            request.icebreaker.clone(),
            self.clock.utc(),
        );
        match self.matches.create_match(&record).await {
            Ok(()) => {
                info!(
                    initiator = %request.initiator,
                    target = %request.target,
                    "match proposed"
                );
                Ok(Attempt::Settled(Self::partial(NotificationReport::skipped(
                    "match is not mutual yet",
                ))))
            }
            Err(MatchRepositoryError::Conflict { message }) => Ok(Attempt::LostRace(message)),
            Err(error) => Err(Self::map_match_error(error)),
        }
    }

    async fn repropose(
        &self,
        pair: &UserPair,
        request: &ProposeRequest,
    ) -> Result<ProposeOutcome, Error> {
        if let Some(icebreaker) = &request.icebreaker {
            self.matches
                .update_pending_icebreaker(pair, icebreaker)
                .await
                .map_err(Self::map_match_error)?;
            debug!(%pair, "pending icebreaker replaced");
        }
        Ok(Self::partial(NotificationReport::skipped(
            "match is not mutual yet",
        )))
    }

    async fn reciprocate(
        &self,
        pair: &UserPair,
        record: Match,
        request: &ProposeRequest,
    ) -> Result<ProposeOutcome, Error> {
        self.matches
            .set_matched(pair)
            .await
            .map_err(Self::map_match_error)?;

        match self.open_chat(pair, &record).await? {
            OpenedChat::Created(chat) => {
                let icebreakers = Self::icebreakers(&record, request);
                self.complete(pair, &chat, &record, icebreakers).await
            }
            OpenedChat::Existing(chat) => {
                debug!(%pair, chat_id = %chat.id, "match completed by a concurrent proposal");
                Ok(Self::already_complete(chat.id))
            }
        }
    }

    async fn settle_complete(
        &self,
        pair: &UserPair,
        record: Match,
        request: &ProposeRequest,
    ) -> Result<ProposeOutcome, Error> {
        let expected = Self::icebreakers(&record, request);
        let found = self
            .matches
            .find_chat(pair)
            .await
            .map_err(Self::map_match_error)?;

        let (chat, icebreakers) = match found {
            Some(chat) => {
                let missing = self.unseeded(&chat, expected).await?;
                if missing.is_empty() {
                    return Ok(Self::already_complete(chat.id));
                }
                (chat, missing)
            }
            None => {
                warn!(%pair, "complete match has no chat; reconciling");
                match self.open_chat(pair, &record).await? {
                    OpenedChat::Created(chat) => (chat, expected),
                    OpenedChat::Existing(chat) => return Ok(Self::already_complete(chat.id)),
                }
            }
        };

        info!(%pair, chat_id = %chat.id, "resuming interrupted match completion");
        self.complete(pair, &chat, &record, icebreakers).await
    }

    /// Seed `icebreakers` into the new chat and tell the first proposer.
    async fn complete(
        &self,
        pair: &UserPair,
        chat: &Chat,
        record: &Match,
        icebreakers: Vec<Icebreaker>,
    ) -> Result<ProposeOutcome, Error> {
        let mut seeded_messages = Vec::with_capacity(icebreakers.len());
        for icebreaker in icebreakers {
            seeded_messages.push(self.seed(chat, icebreaker).await?);
        }

        info!(
            %pair,
            chat_id = %chat.id,
            seeded = seeded_messages.len(),
            "match completed"
        );

        let notifications = self
            .dispatch
            .dispatch(
                &record.user_a,
                NotificationKind::NewMatch {
                    counterpart: record.user_b.clone(),
                    chat_id: chat.id,
                },
                &ThrottleDecision::allow(FIRST_CONTACT_REASON),
            )
            .await;

        Ok(ProposeOutcome {
            state: MatchState::Complete,
            chat_id: Some(chat.id),
            seeded_messages,
            notifications,
        })
    }

    fn already_complete(chat_id: ChatId) -> ProposeOutcome {
        ProposeOutcome {
            state: MatchState::Complete,
            chat_id: Some(chat_id),
            seeded_messages: Vec::new(),
            notifications: NotificationReport::skipped("match already complete"),
        }
    }

    /// Icebreakers owed to a completed chat: the first proposer's pending one,
    /// then the reciprocating side's.
    fn icebreakers(record: &Match, request: &ProposeRequest) -> Vec<Icebreaker> {
        let pending = record.pending_icebreaker.clone().map(|body| Icebreaker {
            sender: record.user_a.clone(),
            receiver: record.user_b.clone(),
            body,
        });
        let reply = request
            .icebreaker
            .clone()
            .filter(|_| request.initiator == record.user_b)
            .map(|body| Icebreaker {
                sender: record.user_b.clone(),
                receiver: record.user_a.clone(),
                body,
            });
        pending.into_iter().chain(reply).collect()
    }

    /// Icebreakers still missing from a chat whose seeding was interrupted.
    ///
    /// Once the chat holds anything besides icebreakers the conversation is
    /// under way and nothing is owed.
    async fn unseeded(
        &self,
        chat: &Chat,
        expected: Vec<Icebreaker>,
    ) -> Result<Vec<Icebreaker>, Error> {
        if expected.is_empty() {
            return Ok(expected);
        }
        let stored = self
            .ledger
            .list_messages(&chat.id)
            .await
            .map_err(Self::map_ledger_error)?;
        if !stored
            .iter()
            .all(|message| expected.iter().any(|icebreaker| icebreaker.matches(message)))
        {
            return Ok(Vec::new());
        }
        Ok(expected
            .into_iter()
            .filter(|icebreaker| !stored.iter().any(|message| icebreaker.matches(message)))
            .collect())
    }

    async fn open_chat(&self, pair: &UserPair, record: &Match) -> Result<OpenedChat, Error> {
        let chat = Chat {
            id: ChatId::random(),
            user_a: record.user_a.clone(),
            user_b: record.user_b.clone(),
            created_at: self.clock.utc(),
        };
        match self.matches.create_chat(&chat).await {
            Ok(()) => Ok(OpenedChat::Created(chat)),
            Err(MatchRepositoryError::Conflict { message }) => {
                debug!(%pair, %message, "chat already exists; re-reading");
                self.matches
                    .find_chat(pair)
                    .await
                    .map_err(Self::map_match_error)?
                    .map(OpenedChat::Existing)
                    .ok_or_else(|| Error::conflict(message))
            }
            Err(error) => Err(Self::map_match_error(error)),
        }
    }

    async fn seed(&self, chat: &Chat, icebreaker: Icebreaker) -> Result<Message, Error> {
        let message = Message {
            id: MessageId::random(),
            chat_id: chat.id,
            sender: icebreaker.sender,
            receiver: icebreaker.receiver,
            body: icebreaker.body,
            created_at: self.clock.utc(),
            email_notification_sent: false,
        };
        self.ledger
            .append(&message)
            .await
            .map_err(Self::map_ledger_error)?;
        Ok(message)
    }
}

#[async_trait]
impl<M, L, C, N> MatchLifecycleCommand for MatchLifecycleService<M, L, C, N>
where
    M: MatchRepository,
    L: MessageLedger,
    C: ContactDirectory,
    N: Notifier,
{
    async fn propose(&self, request: ProposeRequest) -> Result<ProposeOutcome, Error> {
        let pair = UserPair::new(request.initiator.clone(), request.target.clone())
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        match self.attempt(&pair, &request).await? {
            Attempt::Settled(outcome) => Ok(outcome),
            Attempt::LostRace(message) => {
                debug!(%pair, %message, "lost match creation race; retrying");
                match self.attempt(&pair, &request).await? {
                    Attempt::Settled(outcome) => Ok(outcome),
                    Attempt::LostRace(message) => Err(Error::conflict(format!(
                        "concurrent proposals for {pair}: {message}"
                    ))),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "match_lifecycle_service_tests.rs"]
mod tests;
