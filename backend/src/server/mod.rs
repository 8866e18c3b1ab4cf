//! Server construction and adapter wiring.

mod config;

pub use config::{ServerSettings, SettingsError};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::info;

use matchmaking::domain::ports::NotificationContact;
use matchmaking::domain::{ChatMessageService, MatchLifecycleService, ThrottlePolicy};
use matchmaking::inbound::http::api_routes;
use matchmaking::inbound::http::health::{HealthState, live, ready};
use matchmaking::inbound::http::state::HttpState;
use matchmaking::outbound::memory::{
    InMemoryContactDirectory, InMemoryMatchRepository, InMemoryMessageLedger,
};
use matchmaking::outbound::notify::TracingNotifier;

/// Wire the domain services over the in-memory stores.
///
/// Both services share the same stores so a chat opened by a match is
/// immediately visible to the chat flow. `contacts` seeds the directory used
/// for match and message notifications.
pub fn build_http_state(policy: ThrottlePolicy, contacts: Vec<NotificationContact>) -> HttpState {
    let matches = Arc::new(InMemoryMatchRepository::new());
    let ledger = Arc::new(InMemoryMessageLedger::new());
    let contacts = Arc::new(InMemoryContactDirectory::from_iter(contacts));
    let notifier = Arc::new(TracingNotifier::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let lifecycle = MatchLifecycleService::new(
        Arc::clone(&matches),
        Arc::clone(&ledger),
        Arc::clone(&contacts),
        Arc::clone(&notifier),
        Arc::clone(&clock),
    );
    let chat = Arc::new(
        ChatMessageService::new(matches, ledger, contacts, notifier, clock).with_policy(policy),
    );

    HttpState::new(Arc::new(lifecycle), chat.clone(), chat)
}

/// Build the actix application from shared state.
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(api_routes)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server from loaded settings.
///
/// Readiness is flipped once the listener is bound.
///
/// # Errors
/// Returns [`std::io::Error`] when the settings are invalid or binding fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    settings: &ServerSettings,
) -> std::io::Result<Server> {
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let policy = settings.throttle_policy().map_err(std::io::Error::other)?;
    let contacts = settings.load_contacts().map_err(std::io::Error::other)?;
    let contact_count = contacts.len();
    let http_state = web::Data::new(build_http_state(policy, contacts));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    info!(
        %bind_addr,
        burst_limit = policy.message_burst_limit(),
        contacts = contact_count,
        "server bound"
    );
    health_state.mark_ready();
    Ok(server)
}
