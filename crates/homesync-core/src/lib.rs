//! Core types for HomeSync.
//!
//! This crate defines the device and telemetry vocabulary shared by the
//! storage, device and API crates.

pub mod device;
pub mod telemetry;

pub use device::{ControlAction, Device, DeviceRecord, Mode, OverrideFlag, WritePolicy};
pub use telemetry::{TelemetryKind, TelemetrySample};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::device::{
        ControlAction, Device, DeviceRecord, Mode, OverrideFlag, WritePolicy,
    };
    pub use crate::telemetry::{TelemetryKind, TelemetrySample};
}
