//! Fixed routes that predate the slug table.

use std::sync::LazyLock;

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::header,
    response::{IntoResponse, Response},
};
use url::Url;

use super::redirect::{fallback, found};
use crate::error::ResolveError;
use crate::state::AppState;
use crate::utils::destination::{fallback_url, parse_destination};

/// Slug whose destination prefixes every `/vip/{id}` redirect.
pub const VIP_SLUG: &str = "vip";

static DONATIONS_BASE: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://bank.hackclub.com/donations/start/").unwrap()
});

const WORKSHOP_REMIX_URL: &str = "https://glitch.com/edit/#!/remix/intro-workshop-starter/84e5e504-d255-4505-b104-fa2955ef8311";

/// Redirects to the `vip` destination with the id appended verbatim.
///
/// # Endpoint
///
/// `GET /vip/{id}`
///
/// Answers 302 Found. Falls back like an unknown slug when `vip` cannot be
/// resolved or the id does not decode to UTF-8.
pub async fn vip_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return fallback(&state, VIP_SLUG, &ResolveError::NotFound(VIP_SLUG.to_string()));
    };
    let slug = format!("{VIP_SLUG}/{id}");

    let target = state
        .resolver
        .resolve(VIP_SLUG)
        .await
        .and_then(|record| parse_destination(&format!("{}{}", record.destination, id)));

    match target {
        Ok(url) => found(url.as_str()),
        Err(e) => fallback(&state, &slug, &e),
    }
}

/// Redirects to the donation page of an organization.
///
/// # Endpoint
///
/// `GET /gib/{org}`
///
/// An org that does not decode to UTF-8 lands on the donations start page.
pub async fn gib_handler(org: Result<Path<String>, PathRejection>) -> Response {
    match org {
        Ok(Path(org)) => found(&fallback_url(&DONATIONS_BASE, &org)),
        Err(_) => found(DONATIONS_BASE.as_str()),
    }
}

/// Serves a meta-refresh page to the workshop starter remix.
///
/// # Endpoint
///
/// `GET /glitch`
pub async fn glitch_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html")],
        format!(r#"<meta http-equiv="refresh" content="0; url='{WORKSHOP_REMIX_URL}'" />"#),
    )
}
