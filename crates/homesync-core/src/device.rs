//! Device identifiers, control vocabulary and the per-device state record.

use serde::{Deserialize, Serialize};

/// A controllable device. The fleet is closed: records for these four
/// devices are seeded at store open and never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    WaterHeater,
    Lighting,
    Camera,
    Aircon,
}

impl Device {
    /// Every device in the fleet.
    pub const ALL: [Device; 4] = [
        Device::WaterHeater,
        Device::Lighting,
        Device::Camera,
        Device::Aircon,
    ];

    /// String form used in topics, storage keys and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::WaterHeater => "water_heater",
            Device::Lighting => "lighting",
            Device::Camera => "camera",
            Device::Aircon => "aircon",
        }
    }

    /// Parse a device identifier, returning `None` for anything outside
    /// the fixed set.
    pub fn parse(s: &str) -> Option<Device> {
        match s {
            "water_heater" => Some(Device::WaterHeater),
            "lighting" => Some(Device::Lighting),
            "camera" => Some(Device::Camera),
            "aircon" => Some(Device::Aircon),
            _ => None,
        }
    }

    /// Inbound command topic for this device.
    pub fn command_topic(&self) -> String {
        format!("device/{}", self.as_str())
    }

    /// Topic on which confirmed status transitions are republished for
    /// dashboard subscribers.
    pub fn status_topic(&self) -> String {
        format!("device/{}/status", self.as_str())
    }

    /// Topic on which operator commands are forwarded to attached
    /// hardware.
    pub fn command_control_topic(&self) -> String {
        format!("device/{}/control", self.as_str())
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auto/manual classification governing which writer is expected to drive
/// a device's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Auto,
    Manual,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Mode> {
        match s {
            "auto" => Some(Mode::Auto),
            "manual" => Some(Mode::Manual),
            _ => None,
        }
    }
}

/// Per-device (or fleet-wide) flag asserting that the last change was
/// operator-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideFlag {
    On,
    Off,
}

impl OverrideFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideFlag::On => "on",
            OverrideFlag::Off => "off",
        }
    }

    pub fn parse(s: &str) -> Option<OverrideFlag> {
        match s {
            "on" => Some(OverrideFlag::On),
            "off" => Some(OverrideFlag::Off),
            _ => None,
        }
    }
}

/// An operator control action, as received on the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    On,
    Off,
    Brighter,
    Dimmer,
}

impl ControlAction {
    pub fn parse(s: &str) -> Option<ControlAction> {
        match s {
            "on" => Some(ControlAction::On),
            "off" => Some(ControlAction::Off),
            "brighter" => Some(ControlAction::Brighter),
            "dimmer" => Some(ControlAction::Dimmer),
            _ => None,
        }
    }

    /// The status string written to the device record and republished.
    pub fn status(&self) -> &'static str {
        match self {
            ControlAction::On => "ON",
            ControlAction::Off => "OFF",
            ControlAction::Brighter => "BRIGHTER",
            ControlAction::Dimmer => "DIMMER",
        }
    }

    /// Whether this action belongs to the brightness/power vocabulary that
    /// historically also produced a light-control telemetry row.
    pub fn is_brightness(&self) -> bool {
        matches!(
            self,
            ControlAction::Brighter | ControlAction::Dimmer | ControlAction::Off
        )
    }
}

/// Gate deciding whether a bus-originated command may change a device's
/// status given its current mode.
///
/// `Permissive` matches the historical behavior: bus writes go through
/// regardless of mode. `ManualBlocksBus` is the tightened policy where a
/// device in manual mode only accepts operator commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    #[default]
    Permissive,
    ManualBlocksBus,
}

impl WritePolicy {
    pub fn allows_bus_write(&self, mode: Mode) -> bool {
        match self {
            WritePolicy::Permissive => true,
            WritePolicy::ManualBlocksBus => mode == Mode::Auto,
        }
    }
}

/// Authoritative per-device state record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Device identifier (immutable key)
    pub device: Device,
    /// Auto/manual mode
    pub mode: Mode,
    /// Device-specific status string
    pub status: String,
    /// Manual override flag
    pub manual_override: OverrideFlag,
    /// Timestamp of the most recent mutation (unix millis)
    pub last_updated: i64,
}

impl DeviceRecord {
    /// Default record seeded at store open: auto mode, status "off",
    /// override off.
    pub fn new(device: Device) -> Self {
        Self {
            device,
            mode: Mode::Auto,
            status: "off".to_string(),
            manual_override: OverrideFlag::Off,
            last_updated: chrono::Utc::now().timestamp_millis(),
        }
    }
}
