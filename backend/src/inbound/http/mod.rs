//! HTTP inbound adapter exposing REST endpoints.

pub mod chats;
pub mod error;
pub mod health;
pub mod matches;
pub mod state;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register the versioned API routes on an actix `ServiceConfig`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use matchmaking::inbound::http::{api_routes, state::HttpState};
///
/// let _app = App::new()
///     .app_data(web::Data::new(HttpState::default()))
///     .configure(api_routes);
/// ```
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(matches::propose_match)
            .service(chats::send_message)
            .service(chats::throttle_status),
    );
}
