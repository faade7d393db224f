// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 the dv-router authors

//! Distance-vector routing daemon core.
//!
//! Two long-lived tasks share one UDP broadcast socket: a periodic
//! task (HELLO beacon, stale sweep, conditional DV broadcast) and a
//! receive loop (decode + dispatch). Both are gated by a shared
//! shutdown signal.

pub mod codec;
pub mod distance;
pub mod neighbor;

use crate::config::Config;
use codec::Message;
use distance::DistanceTable;
use neighbor::NeighborTable;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, warn};

const RECV_BUF_LEN: usize = 512;
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Distance-vector routing daemon.
#[derive(Clone)]
pub struct Daemon {
    my_ip: Ipv4Addr,
    config: Arc<Config>,
    neighbors: Arc<Mutex<NeighborTable>>,
    routes: Arc<Mutex<DistanceTable>>,
    socket: Arc<UdpSocket>,
    broadcast_addr: SocketAddr,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
}

impl Daemon {
    /// Create a new daemon. Binds and configures the shared broadcast
    /// socket; failure here is startup-fatal.
    pub fn new(my_ip: Ipv4Addr, config: Config) -> Result<Self, DaemonError> {
        config
            .validate()
            .map_err(|e| DaemonError::Config(e.to_string()))?;

        let socket2 = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| DaemonError::Bind(e.to_string()))?;
        socket2
            .set_reuse_address(true)
            .map_err(|e| DaemonError::Bind(e.to_string()))?;
        socket2
            .set_broadcast(true)
            .map_err(|e| DaemonError::Bind(e.to_string()))?;
        let bind_addr: SocketAddr = format!("0.0.0.0:{}", config.port)
            .parse()
            .map_err(|e| DaemonError::Bind(format!("{e}")))?;
        socket2
            .bind(&bind_addr.into())
            .map_err(|e| DaemonError::Bind(e.to_string()))?;
        socket2
            .set_nonblocking(true)
            .map_err(|e| DaemonError::Bind(e.to_string()))?;

        let std_socket: std::net::UdpSocket = socket2.into();
        let socket = UdpSocket::from_std(std_socket).map_err(|e| DaemonError::Bind(e.to_string()))?;

        let broadcast_addr: SocketAddr = format!("255.255.255.255:{}", config.port)
            .parse()
            .map_err(|e| DaemonError::Bind(format!("{e}")))?;

        Ok(Self {
            my_ip,
            config: Arc::new(config),
            neighbors: Arc::new(Mutex::new(NeighborTable::new(my_ip.to_string()))),
            routes: Arc::new(Mutex::new(DistanceTable::new(my_ip.to_string()))),
            socket: Arc::new(socket),
            broadcast_addr,
            shutdown: Arc::new(Notify::new()),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Run the daemon until `shutdown` is signalled. Spawns the
    /// periodic and receive tasks and waits for both to finish.
    pub async fn run(&self) -> Result<(), DaemonError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(DaemonError::AlreadyRunning);
        }

        info!(
            "dv-router node={} listening on 0.0.0.0:{} (broadcast {})",
            self.my_ip, self.config.port, self.broadcast_addr
        );

        let periodic = self.clone();
        let receiver = self.clone();
        let (_, _) = tokio::join!(periodic.run_periodic(), receiver.run_receiver());

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Signal both tasks to stop.
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn neighbor_count(&self) -> usize {
        self.neighbors.lock().await.len()
    }

    pub async fn route_count(&self) -> usize {
        self.routes.lock().await.route_count()
    }

    /// Periodic task: HELLO, stale sweep, conditional DV broadcast.
    async fn run_periodic(self) {
        let mut ticker = tokio::time::interval(self.config.hello_interval());
        loop {
            tokio::select! {
                _ = ticker.tick() => self.periodic_tick().await,
                _ = self.shutdown.notified() => {
                    debug!("periodic task shutting down");
                    break;
                }
            }
        }
    }

    async fn periodic_tick(&self) {
        let (ip, seq) = {
            let mut neighbors = self.neighbors.lock().await;
            neighbors.next_hello()
        };
        let hello = Message::encode_hello(&ip, seq);
        if let Err(e) = self.socket.send_to(hello.as_bytes(), self.broadcast_addr).await {
            warn!("send HELLO failed: {e}");
        }

        let evicted = {
            let mut neighbors = self.neighbors.lock().await;
            neighbors.remove_stale(self.config.neighbor_timeout(), Instant::now())
        };
        for ip in &evicted {
            info!("neighbor {ip} expired");
        }

        let mut routes = self.routes.lock().await;
        for ip in &evicted {
            routes.remove_routes_via(ip);
        }
        if routes.is_dirty() {
            let dv = routes.get_distance_vector();
            match self.socket.send_to(dv.as_bytes(), self.broadcast_addr).await {
                Ok(_) => routes.dv_sent(),
                Err(e) => warn!("send DV failed: {e} (will retry next tick)"),
            }
        }
    }

    /// Receive task: decode + dispatch, silently dropping malformed
    /// datagrams. Transient errors back off briefly and retry.
    async fn run_receiver(self) {
        let mut buf = [0u8; RECV_BUF_LEN];
        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    match result {
                        Ok((n, _peer)) => self.handle_datagram(&buf[..n]).await,
                        Err(e) => {
                            warn!("recv error: {e}, backing off");
                            tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                        }
                    }
                }
                _ = self.shutdown.notified() => {
                    debug!("receive task shutting down");
                    break;
                }
            }
        }
    }

    async fn handle_datagram(&self, bytes: &[u8]) {
        let Ok(raw) = std::str::from_utf8(bytes) else {
            return;
        };
        match Message::parse(raw) {
            Some(Message::Hello { sender, seq }) => {
                let mut neighbors = self.neighbors.lock().await;
                if neighbors.process_hello(&sender, seq, Instant::now()) {
                    info!("neighbor {sender} up");
                }
            }
            Some(Message::Dv { .. }) => {
                let mut routes = self.routes.lock().await;
                routes.process_distance_vector(raw);
            }
            None => {}
        }
    }
}

/// Daemon error types.
#[derive(Debug)]
pub enum DaemonError {
    Config(String),
    Bind(String),
    AlreadyRunning,
    Io(String),
}

impl std::fmt::Display for DaemonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(s) => write!(f, "Configuration error: {s}"),
            Self::Bind(s) => write!(f, "Bind error: {s}"),
            Self::AlreadyRunning => write!(f, "Daemon already running"),
            Self::Io(s) => write!(f, "I/O error: {s}"),
        }
    }
}

impl std::error::Error for DaemonError {}

impl From<std::io::Error> for DaemonError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
