//! HTTP control surface for HomeSync.
//!
//! Thin axum handlers over the control gateway and the read-only query
//! layer (topic cache + telemetry history). Response bodies mirror the
//! dashboard's expectations; unknown-device reads return sentinel bodies
//! so the dashboard can always render a default view.

pub mod handlers;
pub mod server;

pub use server::{create_router, serve, ServerState};
