/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Standalone message router daemon: loads a JSON5 configuration, binds the
//! TCP listener, and serves peers until interrupted.

mod config;
mod transport;

use clap::Parser;
use config::Config;
use msgmux::{Router, Server};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transport::TcpTransportListener;

#[derive(Parser)]
#[command(version, about = "In-process pub/sub message router over TCP")]
struct ServerArgs {
    /// Path to a JSON5 configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen host from the configuration.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port from the configuration.
    #[arg(long)]
    port: Option<u16>,
}

fn load_config(args: &ServerArgs) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("unable to read {}: {err}", path.display()))?;
            json5::from_str(&raw)
                .map_err(|err| format!("unable to parse {}: {err}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(host) = &args.host {
        config.listen.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();
    let config = load_config(&args)?;

    let router = Router::new(config.router.to_router_config()).await;

    let listen = format!("{}:{}", config.listen.host, config.listen.port);
    let listener = TcpTransportListener::bind(&listen)
        .await
        .map_err(|err| format!("unable to bind {listen}: {err}"))?;
    info!(addr = %listener.local_addr()?, "listening for peers");

    let server = Server::new(router, Arc::new(listener));

    let stopper = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            stopper.stop();
        }
    });

    server.run().await;
    Ok(())
}
