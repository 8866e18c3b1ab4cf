//! Match proposal HTTP handler.
//!
//! ```text
//! POST /api/v1/matches
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};

use crate::domain::MatchState;
use crate::domain::ports::{NotificationReport, ProposeOutcome, ProposeRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::chats::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_address, parse_optional_body};

const INITIATOR: FieldName = FieldName::new("initiator");
const TARGET: FieldName = FieldName::new("target");
const ICEBREAKER: FieldName = FieldName::new("icebreaker");

/// Request payload for a swipe-accept or icebreaker.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeMatchPayload {
    pub initiator: Option<String>,
    pub target: Option<String>,
    pub icebreaker: Option<String>,
}

/// Response payload describing where the proposal left the pair.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeMatchResponse {
    pub state: MatchState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    pub seeded_messages: Vec<MessageResponse>,
    pub notifications: NotificationReport,
}

impl From<ProposeOutcome> for ProposeMatchResponse {
    fn from(value: ProposeOutcome) -> Self {
        Self {
            state: value.state,
            chat_id: value.chat_id.map(|id| id.to_string()),
            seeded_messages: value
                .seeded_messages
                .into_iter()
                .map(MessageResponse::from)
                .collect(),
            notifications: value.notifications,
        }
    }
}

fn parse_propose_request(payload: ProposeMatchPayload) -> ApiResult<ProposeRequest> {
    Ok(ProposeRequest {
        initiator: parse_address(payload.initiator, INITIATOR)?,
        target: parse_address(payload.target, TARGET)?,
        icebreaker: parse_optional_body(payload.icebreaker, ICEBREAKER)?,
    })
}

/// Record interest from `initiator` in `target`.
#[post("/matches")]
pub async fn propose_match(
    state: web::Data<HttpState>,
    payload: web::Json<ProposeMatchPayload>,
) -> ApiResult<web::Json<ProposeMatchResponse>> {
    let request = parse_propose_request(payload.into_inner())?;
    let outcome = state.matches.propose(request).await?;
    Ok(web::Json(ProposeMatchResponse::from(outcome)))
}
