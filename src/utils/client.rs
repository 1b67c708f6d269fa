//! Client metadata extracted from incoming requests.

use axum::http::{HeaderMap, Uri, header};
use regex::Regex;
use std::net::SocketAddr;
use std::sync::LazyLock;

/// Heuristic crawler/automation detector, case-insensitive.
static BOT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(bot|crawl|spider|slurp|archiver|preview|monitor|uptime|pingdom|headless|curl/|wget/|python-requests|python-urllib|go-http-client|okhttp|java/|libwww|httpclient|scrapy|facebookexternalhit|embedly|whatsapp|lighthouse)",
    )
    .expect("bot pattern is valid")
});

/// Exact user agents treated as bots regardless of the pattern.
const KNOWN_BOT_AGENTS: &[&str] = &["apex/ping/v1.0"];

/// Returns true if the user agent looks automated.
///
/// A missing user agent is not considered a bot.
pub fn is_bot(user_agent: Option<&str>) -> bool {
    match user_agent {
        Some(ua) => KNOWN_BOT_AGENTS.contains(&ua) || BOT_REGEX.is_match(ua),
        None => false,
    }
}

/// Resolves the client IP address.
///
/// Behind a trusted proxy the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`; otherwise the socket peer address is used.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = real_ip {
            return ip.to_string();
        }
    }

    peer.ip().to_string()
}

/// Request scheme as seen by the client (`X-Forwarded-Proto` or `http`).
pub fn request_scheme(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or("http")
}

/// Reconstructs the full request URL for access logging.
///
/// Returns `None` without a `Host` header.
pub fn request_url(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    Some(format!("{}://{}{}", request_scheme(headers), host, path))
}
