//! Service lifecycle.
//!
//! Binding, capped accept, and graceful drain of the HTTP listener.
//!
//! # Phases
//!
//! `Created` → `Listening` → `Draining` → `Stopped`. Transitions are one-way.
//! [`GatewayService::bind`] leaves the service `Created` with its socket
//! bound. [`GatewayService::run`] serves until the shutdown future resolves,
//! then stops accepting and gives open connections the drain deadline to
//! finish before closing them.
//!
//! Admission control is a semaphore permit taken *before* `accept`, so once
//! the cap is reached new connections wait in the kernel backlog.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use crate::config::GatewayConfig;

/// Pause after a failed `accept` (e.g. file descriptor exhaustion).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Lifecycle phase of a [`GatewayService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServicePhase {
    /// Socket bound, not yet serving.
    Created,
    /// Accepting connections.
    Listening,
    /// No longer accepting; open connections are finishing.
    Draining,
    /// All connections closed.
    Stopped,
}

/// How the drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every connection finished before the deadline.
    Graceful,
    /// The deadline passed and the remaining connections were closed.
    Forced,
}

/// Errors raised by the service lifecycle.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Socket error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOptions {
    /// Maximum concurrent connections, `None` for no cap.
    pub connection_limit: Option<usize>,
    /// HTTP/1 header read timeout.
    pub read_timeout: Duration,
    /// Time open connections get to finish after shutdown starts.
    pub drain_timeout: Duration,
}

impl From<&GatewayConfig> for ServeOptions {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            connection_limit: config.connection_cap(),
            read_timeout: config.read_timeout(),
            drain_timeout: config.drain_timeout(),
        }
    }
}

/// A bound HTTP listener serving a router.
pub struct GatewayService {
    listener: TcpListener,
    app: Router,
    options: ServeOptions,
    phase: watch::Sender<ServicePhase>,
}

impl GatewayService {
    /// Bind `addr`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Bind` if the address cannot be bound.
    pub async fn bind(
        addr: SocketAddr,
        app: Router,
        options: ServeOptions,
    ) -> Result<Self, ServiceError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServiceError::Bind { addr, source })?;
        let (phase, _) = watch::channel(ServicePhase::Created);

        Ok(Self {
            listener,
            app,
            options,
            phase,
        })
    }

    /// The bound address.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, ServiceError> {
        Ok(self.listener.local_addr()?)
    }

    /// Watch the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> watch::Receiver<ServicePhase> {
        self.phase.subscribe()
    }

    /// Serve until `shutdown` resolves, then drain.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's address cannot be read.
    pub async fn run<F>(self, shutdown: F) -> Result<DrainOutcome, ServiceError>
    where
        F: Future<Output = ()> + Send,
    {
        let Self {
            listener,
            app,
            options,
            phase,
        } = self;

        let addr = listener.local_addr()?;
        phase.send_replace(ServicePhase::Listening);
        tracing::info!(
            addr = %addr,
            connection_limit = ?options.connection_limit,
            "Listening"
        );

        let limiter = options.connection_limit.map(|n| Arc::new(Semaphore::new(n)));
        let (drain_tx, drain_rx) = watch::channel(false);

        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            while connections.try_join_next().is_some() {}

            let permit = match &limiter {
                Some(semaphore) => tokio::select! {
                    acquired = Arc::clone(semaphore).acquire_owned() => match acquired {
                        Ok(permit) => Some(permit),
                        Err(_) => break,
                    },
                    () = &mut shutdown => break,
                },
                None => None,
            };

            let (stream, remote) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        tracing::warn!(error = %err, "Accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                },
                () = &mut shutdown => break,
            };
            tracing::trace!(remote = %remote, "Accepted connection");

            let builder = connection_builder(options.read_timeout);
            let service = TowerToHyperService::new(app.clone());
            let mut drain = drain_rx.clone();

            connections.spawn(async move {
                let _permit = permit;
                let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
                tokio::pin!(conn);

                tokio::select! {
                    result = conn.as_mut() => {
                        if let Err(err) = result {
                            tracing::debug!(remote = %remote, error = %err, "Connection closed with error");
                        }
                        return;
                    }
                    _ = drain.changed() => {}
                }

                conn.as_mut().graceful_shutdown();
                if let Err(err) = conn.await {
                    tracing::debug!(remote = %remote, error = %err, "Connection closed with error");
                }
            });
        }

        phase.send_replace(ServicePhase::Draining);
        drop(listener);
        tracing::info!(open = connections.len(), "Draining connections");
        drain_tx.send_replace(true);

        let drained = tokio::time::timeout(options.drain_timeout, async {
            while connections.join_next().await.is_some() {}
        })
        .await;

        let outcome = if drained.is_ok() {
            DrainOutcome::Graceful
        } else {
            tracing::warn!(
                open = connections.len(),
                deadline = ?options.drain_timeout,
                "Drain deadline passed, closing connections"
            );
            connections.abort_all();
            while connections.join_next().await.is_some() {}
            DrainOutcome::Forced
        };

        phase.send_replace(ServicePhase::Stopped);
        tracing::info!(outcome = ?outcome, "Gateway stopped");
        Ok(outcome)
    }
}

fn connection_builder(read_timeout: Duration) -> auto::Builder<TokioExecutor> {
    let mut builder = auto::Builder::new(TokioExecutor::new());
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(read_timeout);
    builder
}
