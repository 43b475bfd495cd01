//! Control gateway.
//!
//! The single funnel for every device-record mutation. Both writers, the
//! HTTP control surface and the message router, go through this service,
//! which serializes read-modify-write cycles per device so `status`,
//! `manual_override` and `last_updated` can never interleave
//! inconsistently, and republishes every confirmed transition on
//! `device/{id}/status`.

use std::sync::Arc;

use dashmap::DashMap;
use rand::Rng;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use homesync_core::{
    ControlAction, Device, DeviceRecord, Mode, OverrideFlag, TelemetrySample, WritePolicy,
};
use homesync_storage::{DeviceControlStore, TelemetryStore};

use crate::client::BrokerClient;
use crate::error::{AdapterError, GatewayError, GatewayResult};

/// Command gateway over the device control store.
pub struct ControlGateway {
    control: Arc<DeviceControlStore>,
    telemetry: Arc<TelemetryStore>,
    broker: Arc<BrokerClient>,
    locks: DashMap<Device, Arc<Mutex<()>>>,
    policy: WritePolicy,
}

impl ControlGateway {
    pub fn new(
        control: Arc<DeviceControlStore>,
        telemetry: Arc<TelemetryStore>,
        broker: Arc<BrokerClient>,
    ) -> Self {
        Self {
            control,
            telemetry,
            broker,
            locks: DashMap::new(),
            policy: WritePolicy::default(),
        }
    }

    /// Override the bus-write policy gate.
    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn lock(&self, device: Device) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(device)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    fn parse_device(&self, device: &str) -> GatewayResult<Device> {
        Device::parse(device).ok_or_else(|| GatewayError::DeviceNotFound(device.to_string()))
    }

    /// Republish a confirmed transition. A disconnected broker degrades to
    /// a warning: the store is already updated and the externally observed
    /// status catches up on reconnection.
    async fn publish_status(&self, device: Device, status: &str) {
        match self.broker.publish(device.status_topic(), status.as_bytes().to_vec()).await {
            Ok(()) => debug!(device = %device, status, "republished status"),
            Err(AdapterError::NotConnected) => {
                warn!(device = %device, status, "broker disconnected; status updated but not republished")
            }
            Err(e) => warn!(device = %device, error = %e, "failed to republish status"),
        }
    }

    /// Apply an operator control action: set status, assert the manual
    /// override, persist, republish. Returns the written status string.
    pub async fn control_device(&self, device: &str, action: &str) -> GatewayResult<String> {
        let device = self.parse_device(device)?;
        let action = ControlAction::parse(action)
            .ok_or_else(|| GatewayError::InvalidAction(action.to_string()))?;
        let status = action.status();

        {
            let _guard = self.lock(device).await;
            let mut record = self.control.get(device)?;
            record.status = status.to_string();
            record.manual_override = OverrideFlag::On;
            self.control.put(&mut record)?;
        }

        self.publish_status(device, status).await;

        // Operator commands are also forwarded on the device's control
        // topic so attached hardware sees them.
        if let Err(e) = self
            .broker
            .publish(device.command_control_topic(), status.as_bytes().to_vec())
            .await
        {
            debug!(device = %device, error = %e, "control command not forwarded");
        }

        // Brightness commands also leave a light-control history row, as an
        // explicit recording step rather than the old status-string match.
        if device == Device::Lighting && action.is_brightness() {
            self.record_lighting_sample(status).await;
        }

        Ok(status.to_string())
    }

    async fn record_lighting_sample(&self, status: &str) {
        let intensity = {
            let mut rng = rand::thread_rng();
            rng.gen_range(100.0..800.0)
        };
        let sample = TelemetrySample::LightControl {
            intensity,
            status: status.to_lowercase(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        if let Err(e) = self.telemetry.append(&sample) {
            warn!(error = %e, "failed to record light-control sample");
        }
    }

    /// Switch a device between auto and manual mode. Touches only `mode`.
    pub async fn set_mode(&self, device: &str, mode: &str) -> GatewayResult<Mode> {
        let device = self.parse_device(device)?;
        let mode =
            Mode::parse(mode).ok_or_else(|| GatewayError::InvalidMode(mode.to_string()))?;

        let _guard = self.lock(device).await;
        let mut record = self.control.get(device)?;
        record.mode = mode;
        self.control.put(&mut record)?;
        Ok(mode)
    }

    /// Bulk save used by UI state restoration: both fields are required;
    /// the status is normalized to uppercase and the override takes the
    /// submitted mode flag.
    pub async fn save_state(
        &self,
        device: &str,
        status: Option<&str>,
        mode: Option<&str>,
    ) -> GatewayResult<()> {
        let status = status.ok_or(GatewayError::MissingField("status"))?;
        let mode = mode.ok_or(GatewayError::MissingField("mode"))?;
        let device = self.parse_device(device)?;
        let flag = OverrideFlag::parse(mode)
            .ok_or_else(|| GatewayError::InvalidMode(mode.to_string()))?;

        let _guard = self.lock(device).await;
        let mut record = self.control.get(device)?;
        record.status = status.to_uppercase();
        record.manual_override = flag;
        self.control.put(&mut record)?;
        Ok(())
    }

    /// Fleet-wide override switch: sets `manual_override` on every record,
    /// independent of prior per-device values.
    pub async fn toggle_global_override(&self, flag: OverrideFlag) -> GatewayResult<()> {
        for device in Device::ALL {
            let _guard = self.lock(device).await;
            let mut record = self.control.get(device)?;
            record.manual_override = flag;
            self.control.put(&mut record)?;
        }
        Ok(())
    }

    /// The message router's write path. Consults the policy gate; a `false`
    /// return means the write was blocked for a device in manual mode.
    pub async fn apply_bus_command(&self, device: Device, status: &str) -> GatewayResult<bool> {
        {
            let _guard = self.lock(device).await;
            let mut record = self.control.get(device)?;
            if !self.policy.allows_bus_write(record.mode) {
                debug!(device = %device, status, "bus command blocked by write policy");
                return Ok(false);
            }
            record.status = status.to_string();
            self.control.put(&mut record)?;
        }

        self.publish_status(device, status).await;
        Ok(true)
    }

    /// Read a device record.
    pub fn record(&self, device: &str) -> GatewayResult<DeviceRecord> {
        let device = self.parse_device(device)?;
        Ok(self.control.get(device)?)
    }

    /// All records, in fleet order.
    pub fn records(&self) -> GatewayResult<Vec<DeviceRecord>> {
        Ok(self.control.list()?)
    }
}
