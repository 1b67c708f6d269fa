//! Plain HTTP to HTTPS redirect middleware.

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;
use crate::utils::client::request_scheme;

/// Redirects requests that did not arrive over TLS to `https://host/uri`.
///
/// TLS is terminated by the proxy in front of the service, so the scheme is
/// taken from `X-Forwarded-Proto`. Requests without a `Host` header pass
/// through. No-op unless `FORCE_HTTPS` is enabled.
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    if !st.config.force_https || request_scheme(req.headers()).eq_ignore_ascii_case("https") {
        return next.run(req).await;
    }

    let Some(host) = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
    else {
        return next.run(req).await;
    };

    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let location = format!("https://{host}{path}");
    tracing::debug!(location = %location, "Upgrading to HTTPS");

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}
