//! Driving port reporting current throttle decisions for a chat participant.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{ChatId, Error, ThrottleDecision, UserAddress};

/// Request for a participant's throttle state in a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleStatusRequest {
    /// Chat being inspected.
    pub chat_id: ChatId,
    /// Participant who wants to send.
    pub sender: UserAddress,
}

/// Both throttle decisions for a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThrottleStatus {
    /// Whether another chat message may be sent.
    pub message: ThrottleDecision,
    /// Whether the next message would trigger an email notification.
    pub email: ThrottleDecision,
}

/// Driving port for throttle inspection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThrottleStatusQuery: Send + Sync {
    /// Evaluate both throttles against the chat's ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the chat does not exist, the sender is not a
    /// participant, or the ledger fails.
    async fn throttle_status(&self, request: ThrottleStatusRequest)
    -> Result<ThrottleStatus, Error>;
}

/// Fixture implementation allowing everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureThrottleStatusQuery;

#[async_trait]
impl ThrottleStatusQuery for FixtureThrottleStatusQuery {
    async fn throttle_status(
        &self,
        _request: ThrottleStatusRequest,
    ) -> Result<ThrottleStatus, Error> {
        Ok(ThrottleStatus {
            message: ThrottleDecision::allow("fixture"),
            email: ThrottleDecision::allow("fixture"),
        })
    }
}
