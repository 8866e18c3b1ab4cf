//! End-to-end flow over the in-memory adapters: matching, seeding
//! icebreakers, chatting under the throttle, and email flags.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use matchmaking::domain::ports::{
    ChatMessageCommand, MatchLifecycleCommand, MessageLedger, MessageLedgerError,
    NotificationContact, NotificationStatus, ProposeOutcome, ProposeRequest, SendMessageOutcome,
    SendMessageRequest, ThrottleStatusQuery, ThrottleStatusRequest,
};
use matchmaking::domain::{
    ChatId, ChatMessageService, ErrorCode, MatchLifecycleService, MatchState, Message,
    MessageBody, MessageId, ThrottlePolicy, UserAddress,
};
use matchmaking::outbound::memory::{
    InMemoryContactDirectory, InMemoryMatchRepository, InMemoryMessageLedger,
};
use matchmaking::outbound::notify::TracingNotifier;

struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    fn advance(&self, minutes: i64) {
        let mut now = self.now.lock().expect("clock lock");
        *now += TimeDelta::minutes(minutes);
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Ledger whose backing store is unreachable.
struct UnavailableLedger;

#[async_trait]
impl MessageLedger for UnavailableLedger {
    async fn list_messages(&self, _chat_id: &ChatId) -> Result<Vec<Message>, MessageLedgerError> {
        Err(MessageLedgerError::connection("ledger down"))
    }

    async fn append(&self, _message: &Message) -> Result<(), MessageLedgerError> {
        Err(MessageLedgerError::connection("ledger down"))
    }

    async fn mark_email_notification_sent(
        &self,
        _message_id: &MessageId,
    ) -> Result<(), MessageLedgerError> {
        Err(MessageLedgerError::connection("ledger down"))
    }
}

type Lifecycle = MatchLifecycleService<
    InMemoryMatchRepository,
    InMemoryMessageLedger,
    InMemoryContactDirectory,
    TracingNotifier,
>;
type Chats = ChatMessageService<
    InMemoryMatchRepository,
    InMemoryMessageLedger,
    InMemoryContactDirectory,
    TracingNotifier,
>;

struct Harness {
    lifecycle: Lifecycle,
    chats: Chats,
    matches: Arc<InMemoryMatchRepository>,
    ledger: Arc<InMemoryMessageLedger>,
    contacts: Arc<InMemoryContactDirectory>,
    clock: Arc<SteppingClock>,
}

fn alice() -> UserAddress {
    UserAddress::new("0xA11CE").expect("valid address")
}

fn bob() -> UserAddress {
    UserAddress::new("0xb0b").expect("valid address")
}

fn body(text: &str) -> MessageBody {
    MessageBody::new(text).expect("valid body")
}

fn email_contact(address: UserAddress, email: &str) -> NotificationContact {
    NotificationContact {
        address,
        email: Some(email.to_owned()),
        email_notifications_enabled: true,
        telegram_chat_id: None,
    }
}

#[fixture]
fn harness() -> Harness {
    let matches = Arc::new(InMemoryMatchRepository::new());
    let ledger = Arc::new(InMemoryMessageLedger::new());
    let contacts = Arc::new(InMemoryContactDirectory::from_iter([
        email_contact(alice(), "alice@example.com"),
        email_contact(bob(), "bob@example.com"),
    ]));
    let notifier = Arc::new(TracingNotifier::new());
    let clock = Arc::new(SteppingClock {
        now: Mutex::new(
            Utc.with_ymd_and_hms(2026, 5, 10, 18, 0, 0)
                .single()
                .expect("valid timestamp"),
        ),
    });
    let shared_clock: Arc<dyn Clock> = clock.clone();
    let limit = NonZeroUsize::new(3).expect("non-zero limit");

    Harness {
        lifecycle: MatchLifecycleService::new(
            Arc::clone(&matches),
            Arc::clone(&ledger),
            Arc::clone(&contacts),
            Arc::clone(&notifier),
            Arc::clone(&shared_clock),
        ),
        chats: ChatMessageService::new(
            Arc::clone(&matches),
            Arc::clone(&ledger),
            Arc::clone(&contacts),
            notifier,
            shared_clock,
        )
        .with_policy(ThrottlePolicy::with_message_burst_limit(limit)),
        matches,
        ledger,
        contacts,
        clock,
    }
}

async fn propose(
    harness: &Harness,
    initiator: UserAddress,
    target: UserAddress,
    icebreaker: Option<&str>,
) -> ProposeOutcome {
    harness
        .lifecycle
        .propose(ProposeRequest {
            initiator,
            target,
            icebreaker: icebreaker.map(body),
        })
        .await
        .expect("proposal succeeds")
}

async fn send(
    harness: &Harness,
    chat_id: ChatId,
    sender: UserAddress,
    text: &str,
) -> SendMessageOutcome {
    harness.clock.advance(1);
    harness
        .chats
        .send_message(SendMessageRequest {
            chat_id,
            sender,
            body: body(text),
            client_message_id: None,
        })
        .await
        .expect("send succeeds")
}

async fn matched_chat(harness: &Harness) -> ChatId {
    propose(harness, alice(), bob(), Some("hi bob")).await;
    propose(harness, bob(), alice(), Some("hey alice"))
        .await
        .chat_id
        .expect("complete match opens a chat")
}

#[rstest]
#[tokio::test]
async fn mutual_proposals_open_one_chat_with_icebreakers(harness: Harness) {
    let first = propose(&harness, alice(), bob(), Some("hi bob")).await;
    assert_eq!(first.state, MatchState::Partial);
    assert!(first.chat_id.is_none());
    assert!(first.seeded_messages.is_empty());

    let second = propose(&harness, bob(), alice(), Some("hey alice")).await;
    assert_eq!(second.state, MatchState::Complete);
    let chat_id = second.chat_id.expect("chat opened");
    let seeded: Vec<(UserAddress, &str)> = second
        .seeded_messages
        .iter()
        .map(|message| (message.sender.clone(), message.body.as_ref()))
        .collect();
    assert_eq!(seeded, vec![(alice(), "hi bob"), (bob(), "hey alice")]);
    assert_eq!(second.notifications.email, NotificationStatus::Sent);

    let repeat = propose(&harness, alice(), bob(), None).await;
    assert_eq!(repeat.state, MatchState::Complete);
    assert_eq!(repeat.chat_id, Some(chat_id));
    assert!(repeat.seeded_messages.is_empty());

    let stored = harness
        .ledger
        .list_messages(&chat_id)
        .await
        .expect("ledger readable");
    let bodies: Vec<&str> = stored.iter().map(|message| message.body.as_ref()).collect();
    assert_eq!(bodies, vec!["hi bob", "hey alice"]);
}

#[rstest]
#[tokio::test]
async fn reciprocation_interrupted_by_the_ledger_finishes_on_retry(harness: Harness) {
    propose(&harness, alice(), bob(), Some("hi bob")).await;

    let shared_clock: Arc<dyn Clock> = harness.clock.clone();
    let interrupted = MatchLifecycleService::new(
        Arc::clone(&harness.matches),
        Arc::new(UnavailableLedger),
        Arc::clone(&harness.contacts),
        Arc::new(TracingNotifier::new()),
        shared_clock,
    );
    let error = interrupted
        .propose(ProposeRequest {
            initiator: bob(),
            target: alice(),
            icebreaker: Some(body("hey alice")),
        })
        .await
        .expect_err("ledger outage fails the reciprocation");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);

    let retry = propose(&harness, bob(), alice(), Some("hey alice")).await;
    assert_eq!(retry.state, MatchState::Complete);
    assert_eq!(retry.seeded_messages.len(), 2);
    assert_eq!(retry.notifications.email, NotificationStatus::Sent);

    let chat_id = retry.chat_id.expect("chat opened");
    let stored: Vec<(UserAddress, String)> = harness
        .ledger
        .list_messages(&chat_id)
        .await
        .expect("ledger readable")
        .into_iter()
        .map(|message| (message.sender, message.body.into()))
        .collect();
    assert_eq!(
        stored,
        vec![
            (alice(), "hi bob".to_owned()),
            (bob(), "hey alice".to_owned()),
        ]
    );

    let settled = propose(&harness, bob(), alice(), Some("hey alice")).await;
    assert!(settled.seeded_messages.is_empty());
}

#[rstest]
#[tokio::test]
async fn first_email_is_sent_and_the_next_one_cools_down(harness: Harness) {
    let chat_id = matched_chat(&harness).await;

    let SendMessageOutcome::Delivered {
        message,
        notifications,
        replayed,
    } = send(&harness, chat_id, alice(), "how was your day?").await
    else {
        panic!("first message should be delivered");
    };
    assert!(!replayed);
    assert_eq!(notifications.email, NotificationStatus::Sent);

    let SendMessageOutcome::Delivered { notifications, .. } =
        send(&harness, chat_id, alice(), "still there?").await
    else {
        panic!("second message should be delivered");
    };
    assert!(matches!(
        notifications.email,
        NotificationStatus::Skipped { .. }
    ));

    let stored = harness
        .ledger
        .list_messages(&chat_id)
        .await
        .expect("ledger readable");
    let flagged: Vec<_> = stored
        .iter()
        .filter(|stored| stored.email_notification_sent)
        .map(|stored| stored.id)
        .collect();
    assert_eq!(flagged, vec![message.id]);
}

#[rstest]
#[tokio::test]
async fn burst_is_throttled_until_the_counterpart_replies(harness: Harness) {
    let chat_id = matched_chat(&harness).await;
    send(&harness, chat_id, alice(), "one").await;
    send(&harness, chat_id, alice(), "two").await;

    let throttled = send(&harness, chat_id, alice(), "three").await;
    let SendMessageOutcome::Throttled { decision } = throttled else {
        panic!("third message in a row should be throttled");
    };
    assert!(!decision.can_send);

    let status = harness
        .chats
        .throttle_status(ThrottleStatusRequest {
            chat_id,
            sender: alice(),
        })
        .await
        .expect("status readable");
    assert!(!status.message.can_send);

    let reply = send(&harness, chat_id, bob(), "sorry, busy day").await;
    assert!(matches!(reply, SendMessageOutcome::Delivered { .. }));

    let resumed = send(&harness, chat_id, alice(), "no worries").await;
    assert!(matches!(resumed, SendMessageOutcome::Delivered { .. }));
}
