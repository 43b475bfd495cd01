//! Shared server state.

use std::sync::Arc;

use homesync_devices::{BrokerClient, ControlGateway, TopicCache};
use homesync_storage::TelemetryStore;

/// State handed to every handler: the gateway for writes, the cache and
/// telemetry store for reads, the broker for health reporting.
#[derive(Clone)]
pub struct ServerState {
    pub gateway: Arc<ControlGateway>,
    pub telemetry: Arc<TelemetryStore>,
    pub cache: Arc<TopicCache>,
    pub broker: Arc<BrokerClient>,
}

impl ServerState {
    pub fn new(
        gateway: Arc<ControlGateway>,
        telemetry: Arc<TelemetryStore>,
        cache: Arc<TopicCache>,
        broker: Arc<BrokerClient>,
    ) -> Self {
        Self {
            gateway,
            telemetry,
            cache,
            broker,
        }
    }
}
