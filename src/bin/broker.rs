//! Broker executable.
//!
//! Binds the RPC endpoint and serves module registrations, subscriptions,
//! and message fan-out until interrupted. The endpoint address comes from
//! `RIGNET_BROKER_ADDR` or the command line (`broker <ip> <port>`), with a
//! loopback default. A bind failure is fatal: the process exits non-zero,
//! since the broker cannot function without its socket.

use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

use rignet::broker::{serve, Broker};
use rignet::config::BrokerConfig;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rignet=info".parse().expect("static directive")),
        )
        .init();

    let mut config = match BrokerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 3 {
        match format!("{}:{}", args[1], args[2]).parse() {
            Ok(addr) => config.listen = addr,
            Err(_) => {
                error!(ip = %args[1], port = %args[2], "Invalid listen address");
                return ExitCode::FAILURE;
            }
        }
    }

    let listener = match TcpListener::bind(config.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = %config.listen, error = %e, "Failed to bind RPC endpoint");
            return ExitCode::FAILURE;
        }
    };

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            info!("Received CTRL+C signal, shutting down");
            let _ = shutdown_tx.send(()).await;
        }
    });

    let broker = Arc::new(Broker::new());
    match serve(broker, listener, shutdown_rx).await {
        Ok(()) => {
            info!("Broker shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Broker terminated with error");
            ExitCode::FAILURE
        }
    }
}
