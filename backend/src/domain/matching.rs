//! Match records and the lifecycle states derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AddressValidationError, MessageBody, UserAddress, UserPair};

/// Lifecycle state of a participant pair.
///
/// `None` → `Partial` → `Complete`; a pair never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// No match record exists.
    None,
    /// One side proposed; the other has not reciprocated.
    Partial,
    /// Both sides proposed and a chat is open.
    Complete,
}

/// Stored match between two participants.
///
/// ## Invariants
/// - At most one record exists per unordered pair.
/// - `user_a` is the participant who proposed first.
/// - `matched` flips to `true` once and never back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Initiator of the first proposal.
    pub user_a: UserAddress,
    /// Target of the first proposal.
    pub user_b: UserAddress,
    /// Whether the target reciprocated.
    pub matched: bool,
    /// Icebreaker sent by `user_a` while the match was partial.
    pub pending_icebreaker: Option<MessageBody>,
    /// When the first proposal was recorded.
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Build a fresh partial match proposed by `initiator`.
    pub fn proposed(
        initiator: UserAddress,
        target: UserAddress,
        icebreaker: Option<MessageBody>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_a: initiator,
            user_b: target,
            matched: false,
            pending_icebreaker: icebreaker,
            created_at,
        }
    }

    /// The unordered pair this record belongs to.
    pub fn pair(&self) -> Result<UserPair, AddressValidationError> {
        UserPair::new(self.user_a.clone(), self.user_b.clone())
    }

    /// Lifecycle state represented by this record.
    pub fn state(&self) -> MatchState {
        if self.matched {
            MatchState::Complete
        } else {
            MatchState::Partial
        }
    }

    /// Whether `address` made the first proposal.
    pub fn initiated_by(&self, address: &UserAddress) -> bool {
        &self.user_a == address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn address(raw: &str) -> UserAddress {
        UserAddress::new(raw).expect("fixture address is valid")
    }

    #[rstest]
    fn proposed_match_is_partial() {
        let record = Match::proposed(address("0xa"), address("0xb"), None, Utc::now());
        assert_eq!(record.state(), MatchState::Partial);
        assert!(record.initiated_by(&address("0xa")));
        assert!(!record.initiated_by(&address("0xb")));
    }

    #[rstest]
    fn matched_record_is_complete() {
        let mut record = Match::proposed(address("0xa"), address("0xb"), None, Utc::now());
        record.matched = true;
        assert_eq!(record.state(), MatchState::Complete);
    }

    #[rstest]
    fn pair_is_independent_of_direction() {
        let forward = Match::proposed(address("0xa"), address("0xb"), None, Utc::now());
        let reverse = Match::proposed(address("0xb"), address("0xa"), None, Utc::now());
        assert_eq!(
            forward.pair().expect("distinct"),
            reverse.pair().expect("distinct")
        );
    }
}
