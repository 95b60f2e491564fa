//! homesimd — smart-home device simulator daemon.
//!
//! Composition root: loads configuration, fetches the initial device
//! population, connects to the broker and runs the tick driver and the
//! inbound dispatcher until SIGINT/SIGTERM.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing_subscriber::EnvFilter;

use homesim_adapter_http::{BootstrapConfig, HttpDeviceSource};
use homesim_adapter_mqtt::MqttTransport;
use homesim_app::ports::Transport;
use homesim_app::protocol::SenderId;
use homesim_app::router::Router;
use homesim_app::services::dispatcher::Dispatcher;
use homesim_app::services::driver::SimulationDriver;
use homesim_app::services::loader::DeviceLoader;
use homesim_app::services::share;
use homesim_domain::registry::Registry;

use crate::config::Config;

/// Startup failures that stop the daemon before any loop runs.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("no devices were loaded, refusing to start an empty simulation")]
    NoDevices,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    tracing::info!(
        broker = %config.mqtt.broker_host,
        api = %config.bootstrap.api_url,
        "starting homesimd"
    );

    let registry = bootstrap(&config.bootstrap).await?;
    tracing::info!(devices = registry.len(), ids = ?registry.ids(), "registry ready");
    let registry = share(registry);

    let router = Router::new(
        SenderId::new(config.mqtt.client_id.clone()),
        config.mqtt.topic_root.clone(),
    );

    let (inbound_tx, inbound_rx) = mpsc::channel(config.mqtt.channel_capacity);
    let transport = Arc::new(MqttTransport::connect(&config.mqtt, inbound_tx));
    transport
        .subscribe(&router.subscription())
        .await
        .context("failed to subscribe to the device topics")?;

    let dispatcher = Dispatcher::new(Arc::clone(&registry), router.clone()).spawn(inbound_rx);
    let driver = SimulationDriver::new(
        registry,
        router,
        Arc::clone(&transport),
        config.tick_interval(),
    )
    .spawn();

    shutdown_signal().await;
    tracing::info!("shutting down");

    driver.abort();
    dispatcher.abort();
    join_stopped("driver", driver).await;
    join_stopped("dispatcher", dispatcher).await;

    match Arc::try_unwrap(transport) {
        Ok(mut transport) => transport.disconnect().await,
        Err(_) => tracing::warn!("transport still shared, skipping clean disconnect"),
    }

    tracing::info!("homesimd stopped");
    Ok(())
}

/// Fetch the initial devices over HTTP and load them into a fresh registry.
async fn bootstrap(config: &BootstrapConfig) -> anyhow::Result<Registry> {
    let source = HttpDeviceSource::new(config).context("failed to build the bootstrap client")?;
    let loader = DeviceLoader::new(source);

    let mut registry = Registry::new();
    if let Err(err) = loader.load_into(&mut registry).await {
        tracing::error!(error = %err, "initial device fetch failed");
    }
    if registry.is_empty() {
        return Err(StartupError::NoDevices.into());
    }
    Ok(registry)
}

/// Wait for an aborted task and surface a panic it hit before the abort.
async fn join_stopped(task: &str, handle: JoinHandle<()>) -> Option<JoinError> {
    match handle.await {
        Err(err) if !err.is_cancelled() => {
            tracing::error!(task, error = %err, "task failed before shutdown");
            Some(err)
        }
        _ => None,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
