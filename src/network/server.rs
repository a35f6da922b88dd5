//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::error::{Result, SquirrelError};
use crate::handler::Handler;
use crate::protocol::{write_response, Response};
use crate::store::SquirrelRepository;

use super::Connection;

/// TCP server for SquirrelDB
pub struct Server<S> {
    /// Server configuration
    config: Config,

    /// Shared request handler
    handler: Handler<S>,

    /// Bound listener
    listener: TcpListener,

    /// Set once shutdown is requested
    shutdown: Arc<AtomicBool>,

    /// Connections currently being served
    active: Arc<AtomicUsize>,
}

/// Stops a running [`Server`] from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting and return from `run`
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);

        // Wake the blocking accept so it observes the flag
        let _ = TcpStream::connect(self.addr);
    }
}

impl<S: SquirrelRepository + 'static> Server<S> {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, handler: Handler<S>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            SquirrelError::Network(format!("Failed to bind {}: {}", config.listen_addr, e))
        })?;

        Ok(Self {
            config,
            handler,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Get a handle that can stop this server
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let mut addr = self.local_addr()?;

        // Connecting to an unspecified address is not portable
        if addr.ip().is_unspecified() {
            let loopback = match addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            };
            addr.set_ip(loopback);
        }

        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr,
        })
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    /// Serve one accepted stream on its own thread
    fn dispatch(&self, stream: TcpStream) {
        let previous = self.active.fetch_add(1, Ordering::SeqCst);
        let slot = ActiveSlot(Arc::clone(&self.active));

        if previous >= self.config.max_connections {
            tracing::warn!(
                "Rejecting connection: {} active (max {})",
                previous,
                self.config.max_connections
            );
            let mut stream = stream;
            let _ = write_response(&mut stream, &Response::service_unavailable());
            return;
        }

        let handler = self.handler.clone();
        let max_body_size = self.config.max_body_size;
        let read_timeout_ms = self.config.read_timeout_ms;
        let write_timeout_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name("squirreldb-conn".to_string())
            .spawn(move || {
                let _slot = slot;

                let result = Connection::new(stream, handler, max_body_size).and_then(|mut conn| {
                    conn.set_timeouts(read_timeout_ms, write_timeout_ms)?;
                    conn.handle()
                });

                if let Err(e) = result {
                    tracing::debug!("Connection ended with error: {}", e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn connection thread: {}", e);
        }
    }
}

/// Releases one active-connection slot when dropped
struct ActiveSlot(Arc<AtomicUsize>);

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
