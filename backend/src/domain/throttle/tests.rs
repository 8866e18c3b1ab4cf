//! Tests for the message and email throttles.

use chrono::TimeZone;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{ChatId, MessageBody, MessageId};

struct Conversation {
    chat_id: ChatId,
    alice: UserAddress,
    bob: UserAddress,
    messages: Vec<Message>,
}

impl Conversation {
    fn push(&mut self, from_alice: bool, created_at: DateTime<Utc>, emailed: bool) {
        let (sender, receiver) = if from_alice {
            (self.alice.clone(), self.bob.clone())
        } else {
            (self.bob.clone(), self.alice.clone())
        };
        self.messages.push(Message {
            id: MessageId::random(),
            chat_id: self.chat_id,
            sender,
            receiver,
            body: MessageBody::new("hey").expect("valid body"),
            created_at,
            email_notification_sent: emailed,
        });
    }

    fn from_alice(&mut self, created_at: DateTime<Utc>) {
        self.push(true, created_at, false);
    }

    fn emailed_from_alice(&mut self, created_at: DateTime<Utc>) {
        self.push(true, created_at, true);
    }

    fn from_bob(&mut self, created_at: DateTime<Utc>) {
        self.push(false, created_at, false);
    }

    fn message_decision(&self, now: DateTime<Utc>) -> ThrottleDecision {
        can_send_message(&self.messages, &self.alice, &self.bob, now)
    }

    fn email_decision(&self, now: DateTime<Utc>) -> ThrottleDecision {
        can_send_email(&self.messages, &self.alice, &self.bob, now)
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 10, 18, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn conversation() -> Conversation {
    Conversation {
        chat_id: ChatId::random(),
        alice: UserAddress::new("0xa11ce").expect("valid"),
        bob: UserAddress::new("0xb0b").expect("valid"),
        messages: Vec::new(),
    }
}

fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    now() - TimeDelta::minutes(minutes)
}

// -----------------------------------------------------------------------------
// Chat message limiter
// -----------------------------------------------------------------------------

#[rstest]
#[case(0)]
#[case(1)]
#[case(DEFAULT_MESSAGE_BURST_LIMIT - 1)]
fn messages_below_the_limit_are_allowed_without_replies(
    mut conversation: Conversation,
    #[case] sent: usize,
) {
    for index in 0..sent {
        conversation.from_alice(minutes_ago(1000 - i64::try_from(index).expect("small")));
    }
    assert!(conversation.message_decision(now()).can_send);
}

#[rstest]
fn a_full_burst_without_reply_is_denied(mut conversation: Conversation) {
    conversation.from_bob(minutes_ago(500));
    for minute in 0..20 {
        conversation.from_alice(minutes_ago(100 - minute));
    }

    let decision = conversation.message_decision(now());
    assert!(!decision.can_send);
    assert!(decision.wait_hours.is_none());
}

#[rstest]
fn a_reply_inside_the_burst_lifts_the_limit(mut conversation: Conversation) {
    for minute in 0..20 {
        conversation.from_alice(minutes_ago(100 - minute));
    }
    conversation.from_bob(minutes_ago(95));

    assert!(conversation.message_decision(now()).can_send);
}

#[rstest]
fn a_reply_at_the_burst_start_does_not_count(mut conversation: Conversation) {
    for minute in 0..20 {
        conversation.from_alice(minutes_ago(100 - minute));
    }
    conversation.from_bob(minutes_ago(100));

    assert!(!conversation.message_decision(now()).can_send);
}

#[rstest]
#[case(97, false)]
#[case(90, true)]
fn only_replies_after_the_twentieth_to_last_message_count(
    mut conversation: Conversation,
    #[case] reply_minutes_ago: i64,
    #[case] expected: bool,
) {
    // 25 messages: the burst window starts at the sixth, sent 95 minutes ago.
    for minute in 0..25 {
        conversation.from_alice(minutes_ago(100 - minute));
    }
    conversation.from_bob(minutes_ago(reply_minutes_ago));

    assert_eq!(conversation.message_decision(now()).can_send, expected);
}

#[rstest]
fn ledger_order_does_not_matter(mut conversation: Conversation) {
    conversation.from_bob(minutes_ago(95));
    for minute in (0..20).rev() {
        conversation.from_alice(minutes_ago(100 - minute));
    }

    assert!(conversation.message_decision(now()).can_send);
}

#[rstest]
fn custom_burst_limits_apply(mut conversation: Conversation) {
    let limit = NonZeroUsize::new(2).expect("non-zero");
    let policy = ThrottlePolicy::with_message_burst_limit(limit);
    conversation.from_alice(minutes_ago(10));
    conversation.from_alice(minutes_ago(5));

    let decision = policy.can_send_message(
        &conversation.messages,
        &conversation.alice,
        &conversation.bob,
        now(),
    );
    assert!(!decision.can_send);
    assert_eq!(policy.message_burst_limit(), 2);
}

// -----------------------------------------------------------------------------
// Email notification limiter
// -----------------------------------------------------------------------------

#[rstest]
fn empty_ledger_denies_email(conversation: Conversation) {
    let decision = conversation.email_decision(now());
    assert!(!decision.can_send);
}

#[rstest]
fn single_reply_allows_first_email(mut conversation: Conversation) {
    conversation.from_bob(minutes_ago(10));
    assert!(conversation.email_decision(now()).can_send);
}

#[rstest]
fn first_email_is_allowed_even_when_the_recipient_is_stale(mut conversation: Conversation) {
    conversation.from_bob(now() - TimeDelta::days(90));
    conversation.from_alice(minutes_ago(10));
    assert!(conversation.email_decision(now()).can_send);
}

#[rstest]
fn recipient_who_never_wrote_blocks_email_regardless_of_history(mut conversation: Conversation) {
    conversation.emailed_from_alice(now() - TimeDelta::days(40));
    conversation.from_alice(minutes_ago(10));
    assert!(!conversation.email_decision(now()).can_send);
}

#[rstest]
fn recipient_inactive_beyond_thirty_days_blocks_email(mut conversation: Conversation) {
    conversation.from_bob(now() - TimeDelta::days(31));
    conversation.emailed_from_alice(now() - TimeDelta::days(60));

    let decision = conversation.email_decision(now());
    assert!(!decision.can_send);
    assert!(decision.wait_hours.is_none());
}

/// Builds a ledger whose latest email from Alice sits `last_email_age` before
/// `now()` and whose replies from Bob select `tier`.
fn tier_scenario(conversation: &mut Conversation, tier: EmailTier, last_email_age: TimeDelta) {
    let hours = |h: i64| now() - TimeDelta::hours(h);
    match tier {
        EmailTier::SustainedReplies => {
            conversation.from_bob(hours(1));
            conversation.from_bob(hours(5));
        }
        EmailTier::RepliedSinceLastEmail => {
            conversation.from_bob(hours(1));
        }
        EmailTier::RepliedSinceSecondEmail => {
            conversation.emailed_from_alice(hours(60));
            conversation.from_bob(hours(50));
        }
        EmailTier::RepliedSinceThirdEmail => {
            conversation.emailed_from_alice(hours(100));
            conversation.from_bob(hours(90));
            conversation.emailed_from_alice(hours(80));
        }
        EmailTier::ActiveFortnight => {
            conversation.from_bob(hours(240));
            conversation.emailed_from_alice(hours(192));
            conversation.emailed_from_alice(hours(180));
        }
        EmailTier::ActiveMonth => {
            conversation.from_bob(hours(480));
        }
    }
    conversation.emailed_from_alice(now() - last_email_age);
}

#[rstest]
#[case(EmailTier::SustainedReplies)]
#[case(EmailTier::RepliedSinceLastEmail)]
#[case(EmailTier::RepliedSinceSecondEmail)]
#[case(EmailTier::RepliedSinceThirdEmail)]
#[case(EmailTier::ActiveFortnight)]
#[case(EmailTier::ActiveMonth)]
fn cooldown_is_denied_just_before_expiry(mut conversation: Conversation, #[case] tier: EmailTier) {
    tier_scenario(
        &mut conversation,
        tier,
        tier.cooldown() - TimeDelta::minutes(1),
    );

    let decision = conversation.email_decision(now());
    assert!(!decision.can_send, "{tier:?} should still be cooling down");
    assert_eq!(decision.wait_hours, Some(1));
    assert!(decision.reason.starts_with(tier.describe()));
}

#[rstest]
#[case(EmailTier::SustainedReplies)]
#[case(EmailTier::RepliedSinceLastEmail)]
#[case(EmailTier::RepliedSinceSecondEmail)]
#[case(EmailTier::RepliedSinceThirdEmail)]
#[case(EmailTier::ActiveFortnight)]
#[case(EmailTier::ActiveMonth)]
fn cooldown_is_allowed_just_after_expiry(mut conversation: Conversation, #[case] tier: EmailTier) {
    tier_scenario(
        &mut conversation,
        tier,
        tier.cooldown() + TimeDelta::minutes(1),
    );

    let decision = conversation.email_decision(now());
    assert!(decision.can_send, "{tier:?} should have cooled down");
    assert_eq!(decision.reason, tier.describe());
}

#[rstest]
fn wait_time_counts_down_from_the_latest_email(mut conversation: Conversation) {
    conversation.from_bob(minutes_ago(30));
    conversation.emailed_from_alice(minutes_ago(60));

    let decision = conversation.email_decision(now());
    assert!(!decision.can_send);
    assert_eq!(decision.wait_hours, Some(23));
}

#[rstest]
fn sustained_replies_need_a_three_hour_spread(mut conversation: Conversation) {
    conversation.from_bob(minutes_ago(60));
    conversation.from_bob(minutes_ago(120));
    conversation.emailed_from_alice(minutes_ago(13 * 60));

    // Replies only two hours apart fall through to the 24h tier.
    let decision = conversation.email_decision(now());
    assert!(!decision.can_send);
    assert!(decision.reason.starts_with(EmailTier::RepliedSinceLastEmail.describe()));
}

#[rstest]
fn decisions_serialise_for_display() {
    let value = serde_json::to_value(ThrottleDecision::deny_for("wait", 3)).expect("serialises");
    assert_eq!(
        value,
        serde_json::json!({"canSend": false, "reason": "wait", "waitHours": 3})
    );
    let value = serde_json::to_value(ThrottleDecision::allow("ok")).expect("serialises");
    assert_eq!(value, serde_json::json!({"canSend": true, "reason": "ok"}));
}
