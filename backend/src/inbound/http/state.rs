//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ChatMessageCommand, FixtureChatMessageCommand, FixtureMatchLifecycleCommand,
    FixtureThrottleStatusQuery, MatchLifecycleCommand, ThrottleStatusQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub matches: Arc<dyn MatchLifecycleCommand>,
    pub messages: Arc<dyn ChatMessageCommand>,
    pub throttle: Arc<dyn ThrottleStatusQuery>,
}

impl HttpState {
    /// Construct state from the driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use matchmaking::domain::ports::{
    ///     FixtureChatMessageCommand, FixtureMatchLifecycleCommand, FixtureThrottleStatusQuery,
    /// };
    /// use matchmaking::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureMatchLifecycleCommand),
    ///     Arc::new(FixtureChatMessageCommand),
    ///     Arc::new(FixtureThrottleStatusQuery),
    /// );
    /// let _matches = state.matches.clone();
    /// ```
    pub fn new(
        matches: Arc<dyn MatchLifecycleCommand>,
        messages: Arc<dyn ChatMessageCommand>,
        throttle: Arc<dyn ThrottleStatusQuery>,
    ) -> Self {
        Self {
            matches,
            messages,
            throttle,
        }
    }
}

impl Default for HttpState {
    /// State backed by fixture ports, for handler tests and local wiring.
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureMatchLifecycleCommand),
            Arc::new(FixtureChatMessageCommand),
            Arc::new(FixtureThrottleStatusQuery),
        )
    }
}
