//! Slack request signature verification middleware.

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::slack_signature::{SignatureError, verify};

/// Slash command payloads are small; anything larger is rejected.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Verifies `X-Slack-Signature` against the raw request body.
///
/// The body is buffered, checked, and handed to the next handler unchanged.
///
/// # Errors
///
/// Returns `401 Unauthorized` if headers are missing, the timestamp is older
/// than five minutes, or the signature does not match. Returns
/// `400 Bad Request` if the body cannot be read.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(secret) = st.config.slack_signing_secret.as_deref() else {
        return Err(AppError::not_found("Slack commands are disabled", json!({})));
    };

    let (parts, body) = req.into_parts();

    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let timestamp = header("x-slack-request-timestamp");
    let signature = header("x-slack-signature");

    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        AppError::bad_request("Failed to read request body", json!({ "reason": e.to_string() }))
    })?;

    let result = match (timestamp, signature) {
        (Some(timestamp), Some(signature)) => {
            verify(secret, &timestamp, &bytes, &signature, Utc::now().timestamp())
        }
        _ => Err(SignatureError::Missing),
    };

    if let Err(e) = result {
        tracing::warn!(error = %e, "Rejected Slack request");
        return Err(AppError::unauthorized(
            "Unauthorized",
            json!({ "reason": e.to_string() }),
        ));
    }

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}
