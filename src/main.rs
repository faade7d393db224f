// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 the dv-router authors

//! Distance-vector routing daemon.
//!
//! Discovers directly reachable peers on a local IPv4 broadcast domain
//! via periodic HELLO beacons, and cooperatively computes shortest-hop
//! distances to every reachable node through periodic exchange of
//! distance vectors (RIP-style Bellman-Ford relaxation, no
//! split-horizon, no authentication, no OS route installation).
//!
//! # Usage
//!
//! ```bash
//! # Run with the default local identity
//! dv-router
//!
//! # Custom identity and port
//! dv-router 10.0.0.2 --port 5555
//! ```

use clap::Parser;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;
mod daemon;

pub use config::Config;
pub use daemon::Daemon;

/// Distance-vector routing daemon for a local broadcast domain.
#[derive(Parser, Debug)]
#[command(name = "dv-router")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Local IPv4 address identifying this node
    #[arg(default_value = "192.168.1.100")]
    local_ip: Ipv4Addr,

    /// UDP port for HELLO/DV traffic
    #[arg(short, long, default_value = "5555")]
    port: u16,

    /// Seconds between HELLO beacons
    #[arg(long, default_value = "5")]
    hello_interval_secs: u64,

    /// Neighbor liveness timeout, in seconds
    #[arg(long, default_value = "10")]
    neighbor_timeout_secs: u64,

    /// Optional JSON config file (overrides the flags above)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = if let Some(config_path) = args.config {
        info!("loading config from {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        Config {
            local_ip: args.local_ip,
            port: args.port,
            hello_interval_secs: args.hello_interval_secs,
            neighbor_timeout_secs: args.neighbor_timeout_secs,
        }
    };
    let local_ip = config.local_ip;

    info!("+----------------------------------------------------+");
    info!("|              dv-router v{}                     |", env!("CARGO_PKG_VERSION"));
    info!("+----------------------------------------------------+");
    info!("|  Node:  {:41} |", local_ip);
    info!("|  Port:  {:41} |", config.port);
    info!(
        "|  Hello: {:41} |",
        format!("{}s", config.hello_interval_secs)
    );
    info!(
        "|  Stale: {:41} |",
        format!("{}s", config.neighbor_timeout_secs)
    );
    info!("+----------------------------------------------------+");

    let daemon = match Daemon::new(local_ip, config) {
        Ok(daemon) => daemon,
        Err(e) => {
            error!("failed to start dv-router: {e}");
            std::process::exit(1);
        }
    };

    // Run until shutdown is signalled by either Ctrl-C or a line on stdin.
    let daemon_handle = daemon.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("ctrl-c received, shutting down...");
        daemon_handle.shutdown();
    });

    let daemon_handle = daemon.clone();
    tokio::task::spawn_blocking(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        info!("stop requested, shutting down...");
        daemon_handle.shutdown();
    });

    daemon.run().await?;

    info!("dv-router stopped");
    Ok(())
}
