//! In-memory implementation of [`MatchRepository`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{MatchRepository, MatchRepositoryError};
use crate::domain::{Chat, ChatId, Match, MessageBody, UserPair};

use super::lock;

#[derive(Debug, Default)]
struct Records {
    matches: HashMap<UserPair, Match>,
    chats: HashMap<UserPair, Chat>,
    chat_pairs: HashMap<ChatId, UserPair>,
}

/// Match store keyed by unordered participant pair.
///
/// Enforces one match and one chat per pair, rejecting duplicates with
/// [`MatchRepositoryError::Conflict`].
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    records: Mutex<Records>,
}

impl InMemoryMatchRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<std::sync::MutexGuard<'_, Records>, MatchRepositoryError> {
        lock(&self.records, "match repository").map_err(MatchRepositoryError::query)
    }
}

fn pair_of(record: &Match) -> Result<UserPair, MatchRepositoryError> {
    record
        .pair()
        .map_err(|err| MatchRepositoryError::query(format!("invalid match record: {err}")))
}

fn chat_pair(chat: &Chat) -> Result<UserPair, MatchRepositoryError> {
    UserPair::new(chat.user_a.clone(), chat.user_b.clone())
        .map_err(|err| MatchRepositoryError::query(format!("invalid chat record: {err}")))
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn find_match(&self, pair: &UserPair) -> Result<Option<Match>, MatchRepositoryError> {
        Ok(self.records()?.matches.get(pair).cloned())
    }

    async fn create_match(&self, record: &Match) -> Result<(), MatchRepositoryError> {
        let pair = pair_of(record)?;
        let mut records = self.records()?;
        if records.matches.contains_key(&pair) {
            return Err(MatchRepositoryError::conflict(format!(
                "match for {pair} already exists"
            )));
        }
        debug!(%pair, "match stored");
        records.matches.insert(pair, record.clone());
        Ok(())
    }

    async fn set_matched(&self, pair: &UserPair) -> Result<(), MatchRepositoryError> {
        let mut records = self.records()?;
        let record = records
            .matches
            .get_mut(pair)
            .ok_or_else(|| MatchRepositoryError::query(format!("no match for {pair}")))?;
        record.matched = true;
        Ok(())
    }

    async fn update_pending_icebreaker(
        &self,
        pair: &UserPair,
        icebreaker: &MessageBody,
    ) -> Result<(), MatchRepositoryError> {
        let mut records = self.records()?;
        let record = records
            .matches
            .get_mut(pair)
            .ok_or_else(|| MatchRepositoryError::query(format!("no match for {pair}")))?;
        record.pending_icebreaker = Some(icebreaker.clone());
        Ok(())
    }

    async fn create_chat(&self, chat: &Chat) -> Result<(), MatchRepositoryError> {
        let pair = chat_pair(chat)?;
        let mut records = self.records()?;
        if records.chats.contains_key(&pair) {
            return Err(MatchRepositoryError::conflict(format!(
                "chat for {pair} already exists"
            )));
        }
        records.chat_pairs.insert(chat.id, pair.clone());
        records.chats.insert(pair, chat.clone());
        Ok(())
    }

    async fn find_chat(&self, pair: &UserPair) -> Result<Option<Chat>, MatchRepositoryError> {
        Ok(self.records()?.chats.get(pair).cloned())
    }

    async fn find_chat_by_id(&self, chat_id: &ChatId) -> Result<Option<Chat>, MatchRepositoryError> {
        let records = self.records()?;
        Ok(records
            .chat_pairs
            .get(chat_id)
            .and_then(|pair| records.chats.get(pair))
            .cloned())
    }
}
