//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the strongly typed match and chat model, the pure throttle
//! engine, and the services that drive the match lifecycle and chat flow
//! through the ports in [`ports`]. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - UserAddress / UserPair: validated participants and unordered pairs.
//! - Match / MatchState, Chat / Message: lifecycle records.
//! - can_send_message / can_send_email: throttle decisions.
//! - MatchLifecycleService / ChatMessageService: driving port
//!   implementations.

pub mod address;
pub mod chat;
mod chat_message_service;
pub mod error;
mod match_lifecycle_service;
pub mod matching;
mod notification_dispatch;
pub mod ports;
pub mod throttle;

pub use self::address::{ADDRESS_MAX, AddressValidationError, UserAddress, UserPair};
pub use self::chat::{
    Chat, ChatId, MESSAGE_BODY_MAX, Message, MessageBody, MessageBodyValidationError, MessageId,
};
pub use self::chat_message_service::ChatMessageService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::match_lifecycle_service::MatchLifecycleService;
pub use self::matching::{Match, MatchState};
pub use self::throttle::{
    DEFAULT_MESSAGE_BURST_LIMIT, EmailTier, ThrottleDecision, ThrottlePolicy, can_send_email,
    can_send_message,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use matchmaking::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
