//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`               - Root slug redirect
//! - `GET  /{*slug}`        - Slug redirect
//! - `GET  /ping`           - Liveness probe
//! - `GET  /health`         - Health check: DB, cache, access queue
//! - `GET  /vip/{id}`       - `vip` destination with an id appended
//! - `GET  /gib/{org}`      - Donation page redirect
//! - `GET  /glitch`         - Workshop remix page
//! - `POST /slack/commands` - Slack slash commands (signed requests only)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **HTTPS enforcement** - Optional redirect of plain HTTP requests
//! - **Slack signature** - HMAC verification on the slash command route
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{
    gib_handler, glitch_handler, health_handler, ping_handler, redirect_handler,
    root_redirect_handler, slack_command_handler, vip_handler,
};
use crate::api::middleware::{force_https, slack_signature, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the router with all routes and middleware, without path
/// normalization.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(root_redirect_handler))
        .route("/{*slug}", get(redirect_handler))
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .route("/vip/{id}", get(vip_handler))
        .route("/gib/{org}", get(gib_handler))
        .route("/glitch", get(glitch_handler));

    if state.config.is_slack_enabled() {
        let slack = Router::new()
            .route("/slack/commands", post(slack_command_handler))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                slack_signature::layer,
            ));
        router = router.merge(slack);
    }

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            force_https::layer,
        ))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with trailing slashes trimmed before
/// routing.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
