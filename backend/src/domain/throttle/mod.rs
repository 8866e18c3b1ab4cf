//! Throttle engine deciding whether a participant may send another chat
//! message or trigger another email notification.
//!
//! Every decision is a pure function of the conversation ledger and the
//! current instant. Denials are ordinary values carrying a human-readable
//! reason and, for cooldowns, the remaining wait in whole hours.

mod window;

use std::num::NonZeroUsize;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use self::window::{hours_until, spans_at_least, within_last};
use super::{Message, UserAddress};

/// Messages a participant may send in a row before the counterpart must reply.
pub const DEFAULT_MESSAGE_BURST_LIMIT: usize = 20;

/// Outcome of a throttle evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleDecision {
    /// Whether the action is currently permitted.
    pub can_send: bool,
    /// Human-readable explanation suitable for display.
    pub reason: String,
    /// Remaining cooldown in whole hours, for time-based denials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_hours: Option<u64>,
}

impl ThrottleDecision {
    /// A positive decision.
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            can_send: true,
            reason: reason.into(),
            wait_hours: None,
        }
    }

    /// A negative decision that no amount of waiting resolves on its own.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            can_send: false,
            reason: reason.into(),
            wait_hours: None,
        }
    }

    /// A negative decision that lifts after `wait_hours`.
    pub fn deny_for(reason: impl Into<String>, wait_hours: u64) -> Self {
        Self {
            can_send: false,
            reason: reason.into(),
            wait_hours: Some(wait_hours),
        }
    }
}

/// Engagement tier selecting the email cooldown.
///
/// Tiers are evaluated in declaration order; the first whose condition holds
/// decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTier {
    /// Two or more replies in the last 2 days, at least 3 hours apart.
    SustainedReplies,
    /// A reply in the last 3 days, newer than the latest email.
    RepliedSinceLastEmail,
    /// A reply in the last 7 days, newer than the second-latest email.
    RepliedSinceSecondEmail,
    /// A reply in the last 14 days, newer than the third-latest email.
    RepliedSinceThirdEmail,
    /// Any reply in the last 14 days.
    ActiveFortnight,
    /// Any reply in the last 30 days.
    ActiveMonth,
}

impl EmailTier {
    /// Minimum gap between the latest email and the next one.
    pub fn cooldown(self) -> TimeDelta {
        match self {
            Self::SustainedReplies => TimeDelta::hours(12),
            Self::RepliedSinceLastEmail => TimeDelta::hours(24),
            Self::RepliedSinceSecondEmail => TimeDelta::hours(48),
            Self::RepliedSinceThirdEmail => TimeDelta::hours(72),
            Self::ActiveFortnight => TimeDelta::days(7),
            Self::ActiveMonth => TimeDelta::days(14),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::SustainedReplies => "recipient is actively replying",
            Self::RepliedSinceLastEmail => "recipient replied since the last email",
            Self::RepliedSinceSecondEmail => "recipient replied since the second-latest email",
            Self::RepliedSinceThirdEmail => "recipient replied since the third-latest email",
            Self::ActiveFortnight => "recipient was active in the last 14 days",
            Self::ActiveMonth => "recipient was active in the last 30 days",
        }
    }
}

/// Tunable throttle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    message_burst_limit: NonZeroUsize,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            message_burst_limit: NonZeroUsize::MIN.saturating_add(DEFAULT_MESSAGE_BURST_LIMIT - 1),
        }
    }
}

impl ThrottlePolicy {
    /// Policy with a custom burst limit.
    pub fn with_message_burst_limit(message_burst_limit: NonZeroUsize) -> Self {
        Self {
            message_burst_limit,
        }
    }

    /// Messages `user_a` may send in a row without a reply.
    pub fn message_burst_limit(&self) -> usize {
        self.message_burst_limit.get()
    }

    /// Decide whether `user_a` may send another chat message to `user_b`.
    ///
    /// The limit counts messages, not time: `_now` is ignored.
    pub fn can_send_message(
        &self,
        messages: &[Message],
        user_a: &UserAddress,
        user_b: &UserAddress,
        _now: DateTime<Utc>,
    ) -> ThrottleDecision {
        let limit = self.message_burst_limit();
        let ordered = chronological(messages);
        let sent: Vec<DateTime<Utc>> = ordered
            .iter()
            .filter(|message| message.is_from(user_a))
            .map(|message| message.created_at)
            .collect();

        let Some(burst_start) = sent
            .len()
            .checked_sub(limit)
            .and_then(|index| sent.get(index))
            .copied()
        else {
            return ThrottleDecision::allow(format!(
                "{} of {limit} messages sent before a reply is needed",
                sent.len()
            ));
        };

        let replied = ordered
            .iter()
            .any(|message| message.is_from(user_b) && message.created_at > burst_start);
        if replied {
            ThrottleDecision::allow("recipient replied during the latest burst")
        } else {
            ThrottleDecision::deny(format!(
                "{limit} messages sent without a reply; wait for the recipient to respond"
            ))
        }
    }
}

/// Decide whether `user_a` may send another chat message to `user_b` under
/// the default policy.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use matchmaking::domain::{UserAddress, can_send_message};
///
/// let alice = UserAddress::new("0xa1").expect("valid");
/// let bob = UserAddress::new("0xb2").expect("valid");
/// assert!(can_send_message(&[], &alice, &bob, Utc::now()).can_send);
/// ```
pub fn can_send_message(
    messages: &[Message],
    user_a: &UserAddress,
    user_b: &UserAddress,
    now: DateTime<Utc>,
) -> ThrottleDecision {
    ThrottlePolicy::default().can_send_message(messages, user_a, user_b, now)
}

/// Decide whether `user_a` may trigger another email notification to `user_b`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use matchmaking::domain::{UserAddress, can_send_email};
///
/// let alice = UserAddress::new("0xa1").expect("valid");
/// let bob = UserAddress::new("0xb2").expect("valid");
/// assert!(!can_send_email(&[], &alice, &bob, Utc::now()).can_send);
/// ```
pub fn can_send_email(
    messages: &[Message],
    user_a: &UserAddress,
    user_b: &UserAddress,
    now: DateTime<Utc>,
) -> ThrottleDecision {
    let ordered = chronological(messages);
    let replies: Vec<DateTime<Utc>> = ordered
        .iter()
        .filter(|message| message.is_from(user_b))
        .map(|message| message.created_at)
        .collect();
    let Some(latest_reply) = replies.iter().max().copied() else {
        return ThrottleDecision::deny("recipient has never sent a message");
    };

    let emails: Vec<DateTime<Utc>> = ordered
        .iter()
        .filter(|message| message.is_from(user_a) && message.email_notification_sent)
        .map(|message| message.created_at)
        .collect();
    let Some(last_email) = emails.last().copied() else {
        return ThrottleDecision::allow("first email notification to this recipient");
    };
    let nth_latest = |n: usize| {
        emails
            .len()
            .checked_sub(n)
            .and_then(|index| emails.get(index))
            .copied()
    };

    let history = EmailHistory {
        last: last_email,
        second: nth_latest(2),
        third: nth_latest(3),
    };
    match select_email_tier(&replies, latest_reply, &history, now) {
        Some(tier) => cooldown_decision(tier, history.last, now),
        None => ThrottleDecision::deny("recipient inactive for more than 30 days"),
    }
}

struct EmailHistory {
    last: DateTime<Utc>,
    second: Option<DateTime<Utc>>,
    third: Option<DateTime<Utc>>,
}

fn select_email_tier(
    replies: &[DateTime<Utc>],
    latest_reply: DateTime<Utc>,
    history: &EmailHistory,
    now: DateTime<Utc>,
) -> Option<EmailTier> {
    let recent: Vec<DateTime<Utc>> = replies
        .iter()
        .copied()
        .filter(|at| within_last(*at, now, TimeDelta::days(2)))
        .collect();
    // Absent earlier emails impose no ordering constraint.
    let replied_after = |mark: Option<DateTime<Utc>>| mark.is_none_or(|at| latest_reply > at);
    let active_within = |days: i64| within_last(latest_reply, now, TimeDelta::days(days));

    if spans_at_least(&recent, TimeDelta::hours(3)) {
        Some(EmailTier::SustainedReplies)
    } else if active_within(3) && latest_reply > history.last {
        Some(EmailTier::RepliedSinceLastEmail)
    } else if active_within(7) && replied_after(history.second) {
        Some(EmailTier::RepliedSinceSecondEmail)
    } else if active_within(14) && replied_after(history.third) {
        Some(EmailTier::RepliedSinceThirdEmail)
    } else if active_within(14) {
        Some(EmailTier::ActiveFortnight)
    } else if active_within(30) {
        Some(EmailTier::ActiveMonth)
    } else {
        None
    }
}

fn cooldown_decision(
    tier: EmailTier,
    last_email: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ThrottleDecision {
    let ready_at = last_email + tier.cooldown();
    if now >= ready_at {
        ThrottleDecision::allow(tier.describe())
    } else {
        let wait_hours = hours_until(ready_at, now);
        ThrottleDecision::deny_for(
            format!("{}; next email in {wait_hours}h", tier.describe()),
            wait_hours,
        )
    }
}

fn chronological(messages: &[Message]) -> Vec<&Message> {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by_key(|message| message.created_at);
    ordered
}

#[cfg(test)]
mod tests;
