//! Application router configuration.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::state::ServerState;
use crate::handlers::{basic, devices, realtime};

/// Create the application router.
pub fn create_router(state: ServerState) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(basic::health_handler))
        // Device control
        .route("/api/device/status", get(devices::all_device_status_handler))
        .route("/api/device/toggle-mode", post(devices::toggle_mode_handler))
        .route(
            "/api/device/:device/save-state",
            post(devices::save_state_handler),
        )
        .route(
            "/api/device/:device/status",
            get(devices::device_status_handler),
        )
        .route("/api/device/:device/mode", get(devices::device_mode_handler))
        .route(
            "/api/device/:device/current-status",
            get(devices::current_status_handler),
        )
        .route(
            "/api/device/:device/manual-state",
            get(devices::manual_state_handler),
        )
        .route(
            "/api/device/:device/:action",
            post(devices::device_action_handler),
        )
        // Realtime and history queries
        .route("/api/realtime/:kind", get(realtime::realtime_handler))
        .route("/api/realtime-db/:kind", get(realtime::realtime_db_handler))
        .route("/api/history/:kind", get(realtime::history_handler))
        .route("/api/messages/:device", get(realtime::messages_handler))
        // The dashboard is served from another origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
