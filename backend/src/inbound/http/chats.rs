//! Chat HTTP handlers.
//!
//! ```text
//! POST /api/v1/chats/{chat_id}/messages
//! GET  /api/v1/chats/{chat_id}/throttle?sender=...
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    NotificationReport, SendMessageOutcome, SendMessageRequest, ThrottleStatus,
    ThrottleStatusRequest,
};
use crate::domain::{ChatId, Message, MessageId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_address, parse_body, parse_optional_uuid, parse_uuid,
};

const CHAT_ID: FieldName = FieldName::new("chatId");
const SENDER: FieldName = FieldName::new("sender");
const BODY: FieldName = FieldName::new("body");
const CLIENT_MESSAGE_ID: FieldName = FieldName::new("clientMessageId");

/// Request payload for sending a chat message.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub sender: Option<String>,
    pub body: Option<String>,
    pub client_message_id: Option<String>,
}

/// Query parameters for the throttle status endpoint.
#[derive(Debug, Deserialize)]
pub struct ThrottleQuery {
    pub sender: Option<String>,
}

/// Wire representation of a stored chat message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub sender: String,
    pub receiver: String,
    pub body: String,
    pub created_at: String,
    pub email_notification_sent: bool,
}

impl From<Message> for MessageResponse {
    fn from(value: Message) -> Self {
        Self {
            id: value.id.to_string(),
            chat_id: value.chat_id.to_string(),
            sender: value.sender.into(),
            receiver: value.receiver.into(),
            body: value.body.into(),
            created_at: value.created_at.to_rfc3339(),
            email_notification_sent: value.email_notification_sent,
        }
    }
}

/// Response payload for a send attempt. Both variants are returned with 200.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendMessageResponse {
    Delivered {
        message: MessageResponse,
        notifications: NotificationReport,
        replayed: bool,
    },
    #[serde(rename_all = "camelCase")]
    Throttled {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        wait_hours: Option<u64>,
    },
}

impl From<SendMessageOutcome> for SendMessageResponse {
    fn from(value: SendMessageOutcome) -> Self {
        match value {
            SendMessageOutcome::Delivered {
                message,
                notifications,
                replayed,
            } => Self::Delivered {
                message: MessageResponse::from(message),
                notifications,
                replayed,
            },
            SendMessageOutcome::Throttled { decision } => Self::Throttled {
                reason: decision.reason,
                wait_hours: decision.wait_hours,
            },
        }
    }
}

fn parse_chat_id(raw: &str) -> ApiResult<ChatId> {
    parse_uuid(raw, CHAT_ID).map(ChatId::new)
}

fn parse_send_request(chat_id: ChatId, payload: SendMessagePayload) -> ApiResult<SendMessageRequest> {
    let sender = parse_address(payload.sender, SENDER)?;
    let body = parse_body(payload.body.ok_or_else(|| missing_field_error(BODY))?, BODY)?;
    let client_message_id =
        parse_optional_uuid(payload.client_message_id, CLIENT_MESSAGE_ID)?.map(MessageId::new);
    Ok(SendMessageRequest {
        chat_id,
        sender,
        body,
        client_message_id,
    })
}

/// Send a message into a chat, subject to the message throttle.
#[post("/chats/{chat_id}/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SendMessagePayload>,
) -> ApiResult<web::Json<SendMessageResponse>> {
    let chat_id = parse_chat_id(&path.into_inner())?;
    let request = parse_send_request(chat_id, payload.into_inner())?;
    let outcome = state.messages.send_message(request).await?;
    Ok(web::Json(SendMessageResponse::from(outcome)))
}

/// Report whether the sender may message and email the counterpart now.
#[get("/chats/{chat_id}/throttle")]
pub async fn throttle_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ThrottleQuery>,
) -> ApiResult<web::Json<ThrottleStatus>> {
    let chat_id = parse_chat_id(&path.into_inner())?;
    let sender = parse_address(query.into_inner().sender, SENDER)?;
    let status = state
        .throttle
        .throttle_status(ThrottleStatusRequest { chat_id, sender })
        .await?;
    Ok(web::Json(status))
}
