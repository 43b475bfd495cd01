//! Device control and state handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use homesync_core::OverrideFlag;
use homesync_devices::GatewayError;

use super::common::{ok, ApiError, HandlerResult};
use super::ServerState;

/// POST /api/device/:device/:action
///
/// on/off/brighter/dimmer are control actions; manual/auto switch the mode.
pub async fn device_action_handler(
    State(state): State<ServerState>,
    Path((device, action)): Path<(String, String)>,
) -> HandlerResult {
    match action.as_str() {
        "manual" | "auto" => {
            let mode = state.gateway.set_mode(&device, &action).await?;
            ok(json!({
                "message": format!("{} mode set to {}", device, mode.as_str())
            }))
        }
        _ => {
            let status = state.gateway.control_device(&device, &action).await?;
            ok(json!({ "status": "success", "action": status }))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveStateBody {
    pub status: Option<String>,
    pub mode: Option<String>,
}

/// POST /api/device/:device/save-state
pub async fn save_state_handler(
    State(state): State<ServerState>,
    Path(device): Path<String>,
    Json(body): Json<SaveStateBody>,
) -> HandlerResult {
    state
        .gateway
        .save_state(&device, body.status.as_deref(), body.mode.as_deref())
        .await?;
    ok(json!({ "message": format!("{} state saved successfully", device) }))
}

#[derive(Debug, Deserialize)]
pub struct ToggleModeBody {
    pub manual_mode: Option<String>,
}

/// POST /api/device/toggle-mode
///
/// Fleet-wide override switch. Anything other than "on" switches the
/// override off.
pub async fn toggle_mode_handler(
    State(state): State<ServerState>,
    Json(body): Json<ToggleModeBody>,
) -> HandlerResult {
    let flag = if body.manual_mode.as_deref() == Some("on") {
        OverrideFlag::On
    } else {
        OverrideFlag::Off
    };
    state.gateway.toggle_global_override(flag).await?;
    ok(json!({ "message": format!("Device mode set to {}", flag.as_str()) }))
}

/// GET /api/device/:device/status
///
/// Unknown devices get a 404 carrying the "unknown" sentinel body so the
/// dashboard still renders a default card.
pub async fn device_status_handler(
    State(state): State<ServerState>,
    Path(device): Path<String>,
) -> HandlerResult {
    match state.gateway.record(&device) {
        Ok(record) => ok(json!({
            "mode": record.mode.as_str(),
            "status": record.status,
        })),
        Err(GatewayError::DeviceNotFound(_)) => Err(ApiError::with_body(
            StatusCode::NOT_FOUND,
            json!({ "mode": "unknown", "status": "unknown" }),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/device/:device/mode
///
/// Reports the manual override flag (the dashboard's "mode" toggle reads
/// this, not the auto/manual mode).
pub async fn device_mode_handler(
    State(state): State<ServerState>,
    Path(device): Path<String>,
) -> HandlerResult {
    let record = state.gateway.record(&device)?;
    ok(json!({ "mode": record.manual_override.as_str() }))
}

/// GET /api/device/:device/current-status
pub async fn current_status_handler(
    State(state): State<ServerState>,
    Path(device): Path<String>,
) -> HandlerResult {
    match state.gateway.record(&device) {
        Ok(record) => ok(json!({
            "status": record.status,
            "manual_mode": record.manual_override.as_str(),
        })),
        Err(GatewayError::DeviceNotFound(_)) => Err(ApiError::with_body(
            StatusCode::NOT_FOUND,
            json!({ "status": "N/A", "manual_mode": "off" }),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/device/:device/manual-state
pub async fn manual_state_handler(
    State(state): State<ServerState>,
    Path(device): Path<String>,
) -> HandlerResult {
    match state.gateway.record(&device) {
        Ok(record) => ok(json!({
            "status": record.status,
            "manual_override": record.manual_override.as_str(),
        })),
        Err(GatewayError::DeviceNotFound(_)) => Err(ApiError::with_body(
            StatusCode::NOT_FOUND,
            json!({ "status": "unknown", "manual_override": "off" }),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/device/status returns every non-aircon record.
pub async fn all_device_status_handler(State(state): State<ServerState>) -> HandlerResult {
    let records = state.gateway.records()?;
    let body: Vec<_> = records
        .iter()
        .filter(|r| r.device != homesync_core::Device::Aircon)
        .map(|r| {
            json!({
                "device": r.device.as_str(),
                "mode": r.mode.as_str(),
                "status": r.status,
            })
        })
        .collect();
    ok(json!(body))
}
