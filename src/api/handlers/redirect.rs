//! Handler for slug redirects.

use axum::{
    extract::{ConnectInfo, RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::domain::access_event::AccessEvent;
use crate::domain::entities::LinkRecord;
use crate::error::ResolveError;
use crate::state::AppState;
use crate::utils::client::{client_ip, is_bot, request_url};
use crate::utils::destination::{build_redirect_url, fallback_url};
use crate::utils::slug::{ROOT_SLUG, normalize_slug};

/// Redirects a slug to its destination.
///
/// # Endpoint
///
/// `GET /{*slug}`
///
/// # Request Flow
///
/// 1. Normalize the path into a slug (`/docs/` and `/docs` are the same slug)
/// 2. Resolve through the cache, falling back to the store on a miss
/// 3. Merge the request query into the destination query
/// 4. Queue an access event for the background worker
/// 5. Return 307 Temporary Redirect
///
/// # Fallback
///
/// Unknown slugs, store failures and unparsable destinations all answer
/// 302 Found to the configured fallback base with the slug appended. The end
/// user never sees a 5xx from this endpoint.
///
/// A path that does not percent-decode to UTF-8 cannot name a slug and goes
/// straight to the fallback.
///
/// # Access Logging
///
/// Access events are sent to a bounded channel for async processing.
/// If the queue is full, the event is dropped (fire-and-forget).
pub async fn redirect_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    uri: Uri,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let raw_path = uri.path();
    let path = match percent_decode_str(raw_path).decode_utf8() {
        Ok(path) => path,
        Err(_) => {
            let slug = normalize_slug(raw_path);
            return fallback(&state, &slug, &ResolveError::NotFound(slug.clone()));
        }
    };

    let request = AccessContext::new(&state, &headers, &uri, addr);
    redirect(&state, &normalize_slug(&path), query.as_deref(), request).await
}

/// Redirects the root slug.
///
/// # Endpoint
///
/// `GET /`
pub async fn root_redirect_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    uri: Uri,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let request = AccessContext::new(&state, &headers, &uri, addr);
    redirect(&state, ROOT_SLUG, query.as_deref(), request).await
}

/// Request metadata recorded with an access event.
pub(crate) struct AccessContext {
    client_ip: String,
    user_agent: Option<String>,
    url: Option<String>,
}

impl AccessContext {
    pub(crate) fn new(
        state: &AppState,
        headers: &HeaderMap,
        uri: &Uri,
        addr: SocketAddr,
    ) -> Self {
        Self {
            client_ip: client_ip(headers, addr, state.config.behind_proxy),
            user_agent: headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            url: request_url(headers, uri),
        }
    }
}

async fn redirect(
    state: &AppState,
    slug: &str,
    query: Option<&str>,
    request: AccessContext,
) -> Response {
    let resolved = state.resolver.resolve(slug).await.and_then(|record| {
        let location = build_redirect_url(&record.destination, query.unwrap_or(""))?;
        Ok((record, location))
    });

    match resolved {
        Ok((record, location)) => {
            metrics::counter!("redirect_resolved_total").increment(1);
            debug!(slug, location = %location, "Redirecting");
            record_access(state, &record, request);
            redirect_response(StatusCode::TEMPORARY_REDIRECT, &location)
        }
        Err(e) => fallback(state, slug, &e),
    }
}

/// Builds the fallback redirect for a slug that could not be resolved.
pub(crate) fn fallback(state: &AppState, slug: &str, reason: &ResolveError) -> Response {
    metrics::counter!("redirect_fallback_total", "reason" => reason.reason()).increment(1);

    match reason {
        ResolveError::NotFound(_) => info!(slug, "Slug not found, using fallback"),
        ResolveError::Store(e) => error!(slug, error = %e, "Store lookup failed, using fallback"),
        ResolveError::MalformedDestination(d) => {
            warn!(slug, destination = %d, "Malformed destination, using fallback")
        }
    }

    found(&fallback_url(&state.config.fallback_base_url, slug))
}

/// 302 Found to `location`.
pub(crate) fn found(location: &str) -> Response {
    redirect_response(StatusCode::FOUND, location)
}

fn redirect_response(status: StatusCode, location: &str) -> Response {
    match HeaderValue::try_from(location) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            error!(location, "Redirect target is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Queues an access event unless logging is disabled for this request.
pub(crate) fn record_access(state: &AppState, record: &LinkRecord, request: AccessContext) {
    if !state.config.access_logging {
        return;
    }

    let bot = is_bot(request.user_agent.as_deref());
    if bot && !state.config.bot_logging {
        debug!(slug = %record.slug, "Skipping access log for bot");
        return;
    }

    let event = AccessEvent::new(
        record.id,
        record.slug.clone(),
        Some(request.client_ip),
        request.user_agent.as_deref(),
        bot,
        request.url,
    );

    match state.access_sender.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            metrics::counter!("access_events_dropped_total").increment(1);
            debug!(slug = %event.slug, "Access queue full, dropping event");
        }
        Err(TrySendError::Closed(event)) => {
            metrics::counter!("access_events_dropped_total").increment(1);
            warn!(slug = %event.slug, "Access queue closed, dropping event");
        }
    }
}
