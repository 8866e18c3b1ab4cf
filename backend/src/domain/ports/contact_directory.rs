//! Port resolving participants to their notification contact details.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::UserAddress;

use super::define_port_error;

define_port_error! {
    /// Errors raised by contact directory adapters.
    pub enum ContactDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "contact directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "contact directory query failed: {message}",
    }
}

/// Where and whether a participant wants to be notified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContact {
    /// Participant the contact belongs to.
    pub address: UserAddress,
    /// Email address, when one is on file.
    pub email: Option<String>,
    /// Whether the participant opted into email notifications.
    pub email_notifications_enabled: bool,
    /// Telegram chat identifier, when the participant linked Telegram.
    pub telegram_chat_id: Option<i64>,
}

impl NotificationContact {
    /// The email address to notify, if the participant is reachable by email.
    pub fn reachable_email(&self) -> Option<&str> {
        if !self.email_notifications_enabled {
            return None;
        }
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// Port for contact lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// Fetch the contact for a participant; `None` when nothing is on file.
    async fn find_contact(
        &self,
        address: &UserAddress,
    ) -> Result<Option<NotificationContact>, ContactDirectoryError>;
}

/// Fixture directory with no contacts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureContactDirectory;

#[async_trait]
impl ContactDirectory for FixtureContactDirectory {
    async fn find_contact(
        &self,
        _address: &UserAddress,
    ) -> Result<Option<NotificationContact>, ContactDirectoryError> {
        Ok(None)
    }
}
