//! Realtime and history query handlers.
//!
//! Realtime reads come from the bounded topic cache; history and
//! realtime-db reads come from the telemetry store. "No data yet" is a
//! sentinel body, not an error.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{json, Value};

use homesync_core::TelemetryKind;

use super::common::{ok, ApiError, HandlerResult};
use super::ServerState;

/// Rows returned by history queries.
const HISTORY_LIMIT: usize = 100;

fn parse_kind(kind: &str) -> Result<TelemetryKind, ApiError> {
    TelemetryKind::parse(kind).ok_or_else(|| {
        ApiError::new(
            StatusCode::NOT_FOUND,
            format!("unknown telemetry type: {}", kind),
        )
    })
}

/// GET /api/realtime/:kind returns the newest cached bus message.
pub async fn realtime_handler(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> HandlerResult {
    let kind = parse_kind(&kind)?;
    match state.cache.latest(kind.topic()).await {
        Some(payload) => ok(payload),
        None => ok(no_data_sentinel(kind)),
    }
}

/// GET /api/history/:kind returns the most recent 100 samples, newest first.
pub async fn history_handler(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> HandlerResult {
    let kind = parse_kind(&kind)?;
    let samples = state.telemetry.recent(kind, HISTORY_LIMIT)?;
    let history: Vec<Value> = samples.iter().map(|s| s.to_body()).collect();
    ok(json!({ "history": history }))
}

/// GET /api/realtime-db/:kind returns the newest stored sample.
pub async fn realtime_db_handler(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> HandlerResult {
    let kind = parse_kind(&kind)?;
    match state.telemetry.latest(kind)? {
        Some(sample) => {
            let mut body = sample.to_body();
            if let Some(obj) = body.as_object_mut() {
                obj.insert(
                    "message".to_string(),
                    Value::from("Data fetched successfully"),
                );
            }
            ok(body)
        }
        None => {
            let mut body = no_data_sentinel(kind);
            if let Some(obj) = body.as_object_mut() {
                obj.insert("message".to_string(), Value::from("No data available"));
            }
            ok(body)
        }
    }
}

/// GET /api/messages/:device returns the cached payloads for `device/{device}`.
pub async fn messages_handler(
    State(state): State<ServerState>,
    Path(device): Path<String>,
) -> HandlerResult {
    let topic = format!("device/{}", device);
    let messages = state.cache.messages(&topic).await;
    ok(json!({ "topic": topic, "messages": messages }))
}

/// Per-kind empty body so dashboards always see their expected keys.
fn no_data_sentinel(kind: TelemetryKind) -> Value {
    match kind {
        TelemetryKind::Temperature => {
            json!({ "value": null, "timestamp": "", "message": "No data" })
        }
        TelemetryKind::WaterHeater => {
            json!({ "temperature": null, "status": null, "timestamp": "", "message": "No data" })
        }
        TelemetryKind::LightControl => {
            json!({ "intensity": null, "status": null, "timestamp": "", "message": "No data" })
        }
        TelemetryKind::Fps => json!({ "fps": null, "timestamp": "", "message": "No data" }),
        TelemetryKind::SurveillanceCamera => {
            json!({ "status": null, "timestamp": "", "message": "No data" })
        }
        TelemetryKind::Aircon => json!({
            "temperature": null,
            "humidity": null,
            "cooling_status": "N/A",
            "dehumidifying_status": "N/A",
            "timestamp": "",
            "message": "No data"
        }),
    }
}
