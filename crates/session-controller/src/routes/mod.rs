//! HTTP routes for the Session Controller.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::identity::require_identity;
use crate::store::MeetingStore;
use crate::tokens::{ShareTokens, TokenIssuer};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// In-memory meeting store.
    pub store: Arc<MeetingStore>,

    /// Service configuration.
    pub config: Config,

    /// Transport grant issuer.
    pub token_issuer: Arc<TokenIssuer>,

    /// Recording share token issuer/verifier.
    pub share_tokens: Arc<ShareTokens>,
}

impl AppState {
    /// Build application state from configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let token_issuer = Arc::new(TokenIssuer::new(
            config.transport_url.clone(),
            config.transport_api_key.clone(),
            config.transport_api_secret.clone(),
            config.token_ttl_seconds,
        ));
        let share_tokens = Arc::new(ShareTokens::new(config.share_token_secret.clone()));

        Self {
            store: Arc::new(MeetingStore::new()),
            config,
            token_issuer,
            share_tokens,
        }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/v1/health` - Liveness probe - public
/// - `/v1/meetings` and sub-routes - meeting lifecycle, roster, recording
/// - `/v1/tokens` - transport grant issuance
/// - TraceLayer for request logging
/// - 30 second request timeout
///
/// Everything except the health check sits behind the gateway identity
/// middleware.
pub fn build_routes(state: Arc<AppState>) -> Router {
    // Public routes (no identity headers required)
    let public_routes = Router::new()
        .route("/v1/health", get(handlers::health_check))
        .with_state(state.clone());

    // Protected routes (gateway identity headers required)
    let protected_routes = Router::new()
        .route("/v1/meetings", post(handlers::meetings::create_meeting))
        .route("/v1/meetings/:id", get(handlers::meetings::get_meeting))
        .route(
            "/v1/meetings/code/:code",
            get(handlers::meetings::get_meeting_by_code),
        )
        .route(
            "/v1/meetings/:id/join",
            post(handlers::meetings::join_meeting),
        )
        .route(
            "/v1/meetings/:id/leave",
            post(handlers::meetings::leave_meeting),
        )
        .route(
            "/v1/meetings/:id/start",
            post(handlers::meetings::start_meeting),
        )
        .route("/v1/meetings/:id/end", post(handlers::meetings::end_meeting))
        .route(
            "/v1/meetings/:id/cancel",
            post(handlers::meetings::cancel_meeting),
        )
        .route(
            "/v1/meetings/:id/co-hosts",
            put(handlers::meetings::update_co_hosts),
        )
        .route(
            "/v1/meetings/:id/recording",
            post(handlers::recordings::attach_recording),
        )
        .route(
            "/v1/meetings/:id/share-token",
            post(handlers::recordings::create_share_token),
        )
        .route(
            "/v1/meetings/:id/recording-access",
            get(handlers::recordings::get_recording_access),
        )
        .route("/v1/tokens", post(handlers::tokens::issue_token))
        .route_layer(middleware::from_fn(require_identity))
        .with_state(state);

    // Merge routes and apply global middleware layers
    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
