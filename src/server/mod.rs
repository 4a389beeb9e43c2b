//! HTTP server: listener, per-request dispatch and shutdown.
//!
//! This module provides the [`Server`] type. Middleware, exception filters
//! and routes are registered on it before listening; once [`Server::listen`]
//! runs they are frozen into a shared, read-only [`Dispatcher`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_accounts::filter::HttpErrorFilter;
//! use tokio_accounts::middleware::json_body::JsonBodyMiddleware;
//! use tokio_accounts::server::{Server, ServerConfig};
//!
//! let mut server = Server::new(ServerConfig::default());
//! server
//!     .use_middleware(JsonBodyMiddleware)
//!     .use_filter(HttpErrorFilter)
//!     .use_controller(&users);
//!
//! let running = server.listen(3000).await?;
//! tokio::signal::ctrl_c().await?;
//! running.close().await?;
//! ```
//!
//! # Request flow
//!
//! ```text
//! accept → Request/Response → middleware 1..n → route lookup → handler
//!                                    │               │            │
//!                                    └───────────────┴────────────┴─→ filter chain (once)
//! ```
//!
//! # Graceful Shutdown
//!
//! [`RunningServer::close`] stops the accept loop, drops the listener and
//! waits for in-flight connections, bounded by the drain timeout.

mod access_log;
pub mod config;
pub mod connection;
pub mod routing;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use hyper_util::server::graceful::GracefulShutdown;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use config::ServerConfig;
pub use connection::Dispatcher;
pub use routing::{handler_fn, Controller, Handler, Router};

use crate::core::{Error, Result};
use crate::filter::{ExceptionFilter, FilterChain};
use crate::middleware::{Middleware, MiddlewareChain};

/// HTTP server under construction.
///
/// Registration order matters twice: middleware run in the order they are
/// added, and filters are consulted in the order they are added.
pub struct Server {
    config: ServerConfig,
    router: Router,
    middleware: MiddlewareChain,
    filters: FilterChain,
}

impl Server {
    /// Create a server with empty route, middleware and filter lists.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            middleware: MiddlewareChain::new(),
            filters: FilterChain::new(),
        }
    }

    /// Append a middleware.
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append an exception filter.
    pub fn use_filter<F: ExceptionFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Let a controller bind its routes.
    pub fn use_controller<C: Controller + ?Sized>(&mut self, controller: &C) -> &mut Self {
        controller.bind_routes(&mut self.router);
        self
    }

    /// Direct access to the route table.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Get the route table.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Get middleware names in execution order.
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middleware.names()
    }

    /// Get filter names in evaluation order.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.names()
    }

    /// Get the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Freeze registrations into a dispatcher without binding a socket.
    pub fn into_dispatcher(self) -> Dispatcher {
        Dispatcher::new(
            self.router,
            self.middleware,
            self.filters,
            self.config.pipeline_deadline,
            self.config.access_log,
        )
    }

    /// Start accepting connections on `0.0.0.0:port` (0 = any free port).
    pub async fn listen(self, port: u16) -> Result<RunningServer> {
        self.listen_with(port, |_| {}).await
    }

    /// Like [`Server::listen`], calling `on_ready` with the bound address
    /// before the first connection is accepted.
    pub async fn listen_with<F>(self, port: u16, on_ready: F) -> Result<RunningServer>
    where
        F: FnOnce(SocketAddr),
    {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = TcpListener::from_std(create_listener(addr)?)?;
        let local_addr = listener.local_addr()?;

        let header_timeout = self.config.header_timeout;
        let drain_timeout = self.config.drain_timeout;
        let dispatcher = Arc::new(self.into_dispatcher());

        for route in dispatcher.router().routes() {
            debug!(method = route.method(), pattern = route.pattern(), "route registered");
        }
        info!("Server listening on http://{}", local_addr);

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let accept_task = tokio::spawn(async move {
            let graceful = GracefulShutdown::new();

            loop {
                tokio::select! {
                    result = listener.accept() => {
                        let (stream, remote_addr) = match result {
                            Ok(conn) => conn,
                            Err(e) => {
                                error!("Accept error: {}", e);
                                continue;
                            }
                        };
                        connection::spawn_connection(
                            &dispatcher,
                            stream,
                            remote_addr,
                            header_timeout,
                            &graceful,
                        );
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("Shutdown signal received, stopping accept loop");
                        break;
                    }
                }
            }

            drop(listener);
            info!("Listener closed, draining connections");

            match tokio::time::timeout(drain_timeout, graceful.shutdown()).await {
                Ok(()) => debug!("All connections drained"),
                Err(_) => warn!(
                    "Drain timeout reached after {}s, abandoning open connections",
                    drain_timeout.as_secs()
                ),
            }
        });

        on_ready(local_addr);

        Ok(RunningServer {
            local_addr,
            shutdown_tx,
            accept_task,
        })
    }
}

/// Create the listening socket.
fn create_listener(addr: SocketAddr) -> std::io::Result<std::net::TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;

    Ok(socket.into())
}

/// Handle to a listening server.
///
/// Dropping the handle without calling [`RunningServer::close`] also stops
/// the accept loop, but nothing waits for the drain.
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl RunningServer {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, close the listener and wait for in-flight connections.
    ///
    /// Resolves once the listener is closed. Fails if the accept loop died.
    pub async fn close(self) -> Result<()> {
        let _ = self.shutdown_tx.send(true);

        self.accept_task.await.map_err(|e| {
            error!("Accept loop failed: {}", e);
            Error::Io(std::io::Error::other(e))
        })?;

        info!("Server closed");
        Ok(())
    }
}
