//! Device-facing components of HomeSync: the broker client adapter, the
//! message router with its bounded topic cache, the control gateway, and
//! the telemetry simulators.

pub mod cache;
pub mod client;
pub mod error;
pub mod mqtt;
pub mod router;
pub mod service;
pub mod simulator;

pub use cache::TopicCache;
pub use client::{BrokerClient, ConnectionStatus, InboundMessage};
pub use error::{AdapterError, AdapterResult, GatewayError, GatewayResult};
pub use mqtt::MqttConfig;
pub use router::MessageRouter;
pub use service::ControlGateway;
pub use simulator::Simulators;
