//! Telemetry vocabulary: sample kinds and the append-only sample record.

use serde::{Deserialize, Serialize};

/// A telemetry stream. One append-only history exists per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    Temperature,
    WaterHeater,
    LightControl,
    Fps,
    SurveillanceCamera,
    Aircon,
}

impl TelemetryKind {
    pub const ALL: [TelemetryKind; 6] = [
        TelemetryKind::Temperature,
        TelemetryKind::WaterHeater,
        TelemetryKind::LightControl,
        TelemetryKind::Fps,
        TelemetryKind::SurveillanceCamera,
        TelemetryKind::Aircon,
    ];

    /// String form used in storage keys and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryKind::Temperature => "temperature",
            TelemetryKind::WaterHeater => "water_heater",
            TelemetryKind::LightControl => "light_control",
            TelemetryKind::Fps => "fps",
            TelemetryKind::SurveillanceCamera => "surveillance_camera",
            TelemetryKind::Aircon => "aircon",
        }
    }

    /// Parse a kind name. Hyphens are accepted in place of underscores so
    /// URL forms like `light-control` resolve.
    pub fn parse(s: &str) -> Option<TelemetryKind> {
        match s.replace('-', "_").as_str() {
            "temperature" => Some(TelemetryKind::Temperature),
            "water_heater" => Some(TelemetryKind::WaterHeater),
            "light_control" => Some(TelemetryKind::LightControl),
            "fps" => Some(TelemetryKind::Fps),
            "surveillance_camera" => Some(TelemetryKind::SurveillanceCamera),
            "aircon" => Some(TelemetryKind::Aircon),
            _ => None,
        }
    }

    /// Bus topic carrying this stream.
    pub fn topic(&self) -> &'static str {
        match self {
            TelemetryKind::Temperature => "device/temperature",
            TelemetryKind::WaterHeater => "device/water_heater",
            TelemetryKind::LightControl => "device/light_control",
            TelemetryKind::Fps => "device/fps",
            TelemetryKind::SurveillanceCamera => "device/surveillance_camera",
            TelemetryKind::Aircon => "device/aircon",
        }
    }
}

impl std::fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One historical measurement. Append-only: no update or delete exists.
///
/// Each variant carries the fields of the corresponding history table plus
/// a timestamp (unix millis).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TelemetrySample {
    Temperature {
        value: f64,
        timestamp: i64,
    },
    WaterHeater {
        temperature: f64,
        status: String,
        timestamp: i64,
    },
    LightControl {
        intensity: f64,
        status: String,
        timestamp: i64,
    },
    Fps {
        fps: f64,
        timestamp: i64,
    },
    SurveillanceCamera {
        status: String,
        timestamp: i64,
    },
    Aircon {
        temperature: f64,
        humidity: f64,
        cooling_status: String,
        dehumidifying_status: String,
        timestamp: i64,
    },
}

impl TelemetrySample {
    pub fn kind(&self) -> TelemetryKind {
        match self {
            TelemetrySample::Temperature { .. } => TelemetryKind::Temperature,
            TelemetrySample::WaterHeater { .. } => TelemetryKind::WaterHeater,
            TelemetrySample::LightControl { .. } => TelemetryKind::LightControl,
            TelemetrySample::Fps { .. } => TelemetryKind::Fps,
            TelemetrySample::SurveillanceCamera { .. } => TelemetryKind::SurveillanceCamera,
            TelemetrySample::Aircon { .. } => TelemetryKind::Aircon,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            TelemetrySample::Temperature { timestamp, .. }
            | TelemetrySample::WaterHeater { timestamp, .. }
            | TelemetrySample::LightControl { timestamp, .. }
            | TelemetrySample::Fps { timestamp, .. }
            | TelemetrySample::SurveillanceCamera { timestamp, .. }
            | TelemetrySample::Aircon { timestamp, .. } => *timestamp,
        }
    }

    /// JSON body for history/realtime responses: the sample's fields
    /// without the internal `kind` tag.
    pub fn to_body(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.remove("kind");
        }
        value
    }
}
