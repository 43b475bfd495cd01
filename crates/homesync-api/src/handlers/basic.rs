//! Health check handler.

use axum::extract::State;
use serde_json::json;

use super::common::{ok, HandlerResult};
use super::ServerState;

/// GET /api/health
///
/// Always 200; the broker field reports the degraded state so dashboards
/// can surface a disconnected bus without the process being unhealthy.
pub async fn health_handler(State(state): State<ServerState>) -> HandlerResult {
    ok(json!({
        "status": "ok",
        "broker": state.broker.connection_status().as_str(),
    }))
}
