//! Handlers for liveness and health check endpoints.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Liveness probe for uptime checkers.
///
/// # Endpoint
///
/// `GET /ping`
pub async fn ping_handler() -> &'static str {
    "pong"
}

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Round-trips `SELECT 1`
/// 2. **Cache**: Reports the active policy
/// 3. **Access Queue**: Checks if channel is open and reports free capacity
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "cache": { "status": "ok", "message": "lru (capacity 10000)" },
///     "access_queue": { "status": "ok", "message": "Capacity: 10000" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = if state.resolver.store_healthy().await {
        CheckStatus::ok("Connected")
    } else {
        CheckStatus::error("Database unreachable")
    };

    let cache = if state.resolver.cache_healthy().await {
        CheckStatus::ok(state.resolver.cache_policy())
    } else {
        CheckStatus::error("Cache unavailable")
    };

    let access_queue = check_access_queue(&state);

    let all_healthy = database.is_ok() && cache.is_ok() && access_queue.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            cache,
            access_queue,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks if the access logging queue is operational.
fn check_access_queue(state: &AppState) -> CheckStatus {
    if !state.config.access_logging {
        return CheckStatus::ok("Access logging disabled");
    }

    if state.access_sender.is_closed() {
        CheckStatus::error("Access queue is closed")
    } else {
        CheckStatus::ok(format!("Capacity: {}", state.access_sender.capacity()))
    }
}
