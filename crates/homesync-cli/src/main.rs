//! Command-line entry point for the HomeSync device state engine.

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use homesync_api::{serve, ServerState};
use homesync_devices::{
    BrokerClient, ControlGateway, MessageRouter, Simulators, TopicCache,
};
use homesync_storage::{DeviceControlStore, TelemetryStore};

use crate::config::AppConfig;

/// HomeSync - device state synchronization engine.
#[derive(Parser, Debug)]
#[command(name = "homesync")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the engine: broker client, router, simulators and HTTP surface.
    Serve {
        /// Host to bind to (overrides the config file).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (overrides the config file).
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable the telemetry simulators.
        #[arg(long)]
        no_simulators: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "homesync=debug,info"
    } else {
        "homesync=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = AppConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Serve {
            host,
            port,
            no_simulators,
        } => {
            if let Some(host) = host {
                config.http.host = host;
            }
            if let Some(port) = port {
                config.http.port = port;
            }
            if no_simulators {
                config.simulators.enabled = false;
            }
            run_serve(config).await
        }
    }
}

async fn run_serve(config: AppConfig) -> anyhow::Result<()> {
    let db = homesync_storage::open(&config.storage.path)
        .with_context(|| format!("opening database {}", config.storage.path.display()))?;
    let control = Arc::new(DeviceControlStore::new(db.clone())?);
    let telemetry = Arc::new(TelemetryStore::new(db)?);

    // The one broker connection for the whole process, shared by the
    // gateway, the router and every simulator.
    let broker = Arc::new(BrokerClient::connect(&config.broker));
    info!(broker = %config.broker.full_broker_addr(), "broker client started");

    let cache = Arc::new(TopicCache::default());
    let gateway = Arc::new(ControlGateway::new(
        control,
        telemetry.clone(),
        broker.clone(),
    ));

    let router = Arc::new(MessageRouter::new(
        gateway.clone(),
        telemetry.clone(),
        cache.clone(),
    ));
    let _router_task = router.spawn(broker.subscribe_inbound());

    if config.simulators.enabled {
        let simulators = Simulators::new(broker.clone(), telemetry.clone())
            .with_interval(Duration::from_secs(config.simulators.interval_secs));
        let tasks = simulators.spawn_all();
        info!(count = tasks.len(), "telemetry simulators started");
    }

    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .with_context(|| "invalid http host/port")?;
    let state = ServerState::new(gateway, telemetry, cache, broker);

    serve(state, addr).await?;
    Ok(())
}
