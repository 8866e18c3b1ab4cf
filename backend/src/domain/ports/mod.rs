//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`MatchRepository`, `MessageLedger`, `ContactDirectory`,
//! `Notifier`) are implemented by outbound adapters. Driving ports
//! (`MatchLifecycleCommand`, `ChatMessageCommand`, `ThrottleStatusQuery`) are
//! implemented by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod chat_message_command;
mod contact_directory;
mod match_lifecycle_command;
mod match_repository;
mod message_ledger;
mod notifier;
mod throttle_status_query;

#[cfg(test)]
pub use chat_message_command::MockChatMessageCommand;
pub use chat_message_command::{
    ChatMessageCommand, FixtureChatMessageCommand, SendMessageOutcome, SendMessageRequest,
};
#[cfg(test)]
pub use contact_directory::MockContactDirectory;
pub use contact_directory::{
    ContactDirectory, ContactDirectoryError, FixtureContactDirectory, NotificationContact,
};
#[cfg(test)]
pub use match_lifecycle_command::MockMatchLifecycleCommand;
pub use match_lifecycle_command::{
    FixtureMatchLifecycleCommand, MatchLifecycleCommand, ProposeOutcome, ProposeRequest,
};
#[cfg(test)]
pub use match_repository::MockMatchRepository;
pub use match_repository::{FixtureMatchRepository, MatchRepository, MatchRepositoryError};
#[cfg(test)]
pub use message_ledger::MockMessageLedger;
pub use message_ledger::{FixtureMessageLedger, MessageLedger, MessageLedgerError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{
    FixtureNotifier, Notification, NotificationChannel, NotificationKind, NotificationReport,
    NotificationStatus, Notifier, NotifierError,
};
#[cfg(test)]
pub use throttle_status_query::MockThrottleStatusQuery;
pub use throttle_status_query::{
    FixtureThrottleStatusQuery, ThrottleStatus, ThrottleStatusQuery, ThrottleStatusRequest,
};
