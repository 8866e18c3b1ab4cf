//! Port for match and chat persistence.
//!
//! The [`MatchRepository`] trait is the match store collaborator: it keeps one
//! match record per unordered participant pair and the chat opened when that
//! match becomes mutual. Adapters must enforce the pair uniqueness constraint
//! and report violations as [`MatchRepositoryError::Conflict`]; the lifecycle
//! service relies on that to resolve concurrent proposals.

use async_trait::async_trait;

use crate::domain::{Chat, ChatId, Match, MessageBody, UserPair};

use super::define_port_error;

define_port_error! {
    /// Errors raised by match repository adapters.
    pub enum MatchRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "match repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "match repository query failed: {message}",
        /// A record already exists for the pair.
        Conflict { message: String } =>
            "match repository conflict: {message}",
    }
}

/// Port for match and chat storage.
///
/// Every lookup keyed by [`UserPair`] must match regardless of which
/// participant proposed first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Fetch the match record for a pair, if any.
    async fn find_match(&self, pair: &UserPair) -> Result<Option<Match>, MatchRepositoryError>;

    /// Insert a new match record.
    ///
    /// Fails with [`MatchRepositoryError::Conflict`] when a record for the
    /// same unordered pair exists.
    async fn create_match(&self, record: &Match) -> Result<(), MatchRepositoryError>;

    /// Flag the pair's match as mutual.
    async fn set_matched(&self, pair: &UserPair) -> Result<(), MatchRepositoryError>;

    /// Replace the initiator's pending icebreaker on a partial match.
    async fn update_pending_icebreaker(
        &self,
        pair: &UserPair,
        icebreaker: &MessageBody,
    ) -> Result<(), MatchRepositoryError>;

    /// Insert the chat for a mutual match.
    ///
    /// Fails with [`MatchRepositoryError::Conflict`] when the pair already has
    /// a chat.
    async fn create_chat(&self, chat: &Chat) -> Result<(), MatchRepositoryError>;

    /// Fetch the chat for a pair, if any.
    async fn find_chat(&self, pair: &UserPair) -> Result<Option<Chat>, MatchRepositoryError>;

    /// Fetch a chat by identifier, if any.
    async fn find_chat_by_id(&self, chat_id: &ChatId) -> Result<Option<Chat>, MatchRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Lookups always miss and writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMatchRepository;

#[async_trait]
impl MatchRepository for FixtureMatchRepository {
    async fn find_match(&self, _pair: &UserPair) -> Result<Option<Match>, MatchRepositoryError> {
        Ok(None)
    }

    async fn create_match(&self, _record: &Match) -> Result<(), MatchRepositoryError> {
        Ok(())
    }

    async fn set_matched(&self, _pair: &UserPair) -> Result<(), MatchRepositoryError> {
        Ok(())
    }

    async fn update_pending_icebreaker(
        &self,
        _pair: &UserPair,
        _icebreaker: &MessageBody,
    ) -> Result<(), MatchRepositoryError> {
        Ok(())
    }

    async fn create_chat(&self, _chat: &Chat) -> Result<(), MatchRepositoryError> {
        Ok(())
    }

    async fn find_chat(&self, _pair: &UserPair) -> Result<Option<Chat>, MatchRepositoryError> {
        Ok(None)
    }

    async fn find_chat_by_id(
        &self,
        _chat_id: &ChatId,
    ) -> Result<Option<Chat>, MatchRepositoryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserAddress;
    use chrono::Utc;
    use rstest::rstest;

    fn pair() -> UserPair {
        UserPair::new(
            UserAddress::new("0xa").expect("valid"),
            UserAddress::new("0xb").expect("valid"),
        )
        .expect("distinct")
    }

    #[tokio::test]
    async fn fixture_repository_lookups_miss() {
        let repo = FixtureMatchRepository;
        assert!(repo.find_match(&pair()).await.expect("lookup").is_none());
        assert!(repo.find_chat(&pair()).await.expect("lookup").is_none());
        assert!(
            repo.find_chat_by_id(&ChatId::random())
                .await
                .expect("lookup")
                .is_none()
        );
    }

    #[tokio::test]
    async fn fixture_repository_accepts_writes() {
        let repo = FixtureMatchRepository;
        let record = Match::proposed(
            pair().low().clone(),
            pair().high().clone(),
            None,
            Utc::now(),
        );
        repo.create_match(&record).await.expect("create accepted");
        repo.set_matched(&pair()).await.expect("update accepted");
    }

    #[rstest]
    fn conflict_error_formats_message() {
        let error = MatchRepositoryError::conflict("pair 0xa<->0xb exists");
        assert_eq!(
            error.to_string(),
            "match repository conflict: pair 0xa<->0xb exists"
        );
    }
}
