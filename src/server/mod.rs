//! Development server: static files, file watching, live reload.
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router
//!                     ├─► GET /_reload   SSE stream (ReloadHub subscription)
//!                     └─► everything else ServeDir(dist/)
//!
//! notify ──► rebuild_loop ──► Rebuild::rebuild() ──► ReloadHub::broadcast()
//! ```
//!
//! ## States
//!
//! | State | Serving | Watching |
//! |---|---|---|
//! | startup | no, initial build runs first and must succeed | no |
//! | idle | last good output | yes |
//! | rebuilding | previous output, untouched until the build writes | events queue up |
//!
//! A failed rebuild is logged and leaves the server idle on the stale
//! output; the next change tries again. Builds write straight into `dist/`,
//! so a request racing a rebuild can see a half-written page.
//!
//! On Ctrl-C the server stops accepting connections and closes the
//! [`ReloadHub`], which ends every open event stream so the remaining
//! connections can drain.
//!
//! The server knows nothing about how a site is built: anything that
//! implements [`Rebuild`] can be served.

pub mod live_reload;
pub mod watcher;

use crate::templates::LIVE_RELOAD_PATH;
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;

pub use live_reload::{ReloadHub, Subscription};
pub use watcher::{DEFAULT_DEBOUNCE, RebuildOutcome};

/// A full site build the server can trigger.
pub trait Rebuild: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn rebuild(&self) -> Result<(), Self::Error>;
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("initial build failed: {0}")]
    InitialBuild(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid listen address {addr:?}: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a listen address. A bare `:port` means every interface.
pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr, ServerError> {
    let full = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    };
    full.parse().map_err(|source| ServerError::Addr {
        addr: addr.to_string(),
        source,
    })
}

/// Routes: the live-reload stream plus `dist_dir` as static files.
///
/// Unknown paths get [`ServeDir`]'s own 404.
pub fn router(dist_dir: &Path, hub: Arc<ReloadHub>) -> Router {
    Router::new()
        .route(LIVE_RELOAD_PATH, get(live_reload::sse_handler))
        .fallback_service(ServeDir::new(dist_dir))
        .with_state(hub)
}

/// Dev server wiring a [`Rebuild`] implementation to HTTP and the watcher.
pub struct DevServer<R: Rebuild> {
    builder: Arc<R>,
    dist_dir: PathBuf,
    watch_dirs: Vec<PathBuf>,
    hub: Arc<ReloadHub>,
    debounce: Duration,
}

impl<R: Rebuild> DevServer<R> {
    pub fn new(builder: R, dist_dir: PathBuf, watch_dirs: Vec<PathBuf>) -> Self {
        Self {
            builder: Arc::new(builder),
            dist_dir,
            watch_dirs,
            hub: Arc::new(ReloadHub::new()),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// The client registry, shared with the HTTP handlers.
    pub fn hub(&self) -> Arc<ReloadHub> {
        Arc::clone(&self.hub)
    }

    pub fn router(&self) -> Router {
        router(&self.dist_dir, self.hub())
    }

    /// Run the first build. The server must not start if this fails.
    pub async fn initial_build(&self) -> Result<(), ServerError> {
        let builder = Arc::clone(&self.builder);
        tokio::task::spawn_blocking(move || builder.rebuild())
            .await
            .map_err(|e| ServerError::InitialBuild(Box::new(e)))?
            .map_err(|e| ServerError::InitialBuild(Box::new(e)))
    }

    /// Build, start watching, and serve on `addr` until Ctrl-C.
    pub async fn run(self, addr: SocketAddr) -> Result<(), ServerError> {
        self.initial_build().await?;
        self.serve(addr).await
    }

    /// Start watching and serve on `addr` until Ctrl-C, without the initial
    /// build.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Start watching and serve on `listener` until `shutdown` resolves.
    ///
    /// Live-reload streams are closed as soon as `shutdown` fires; the call
    /// returns once every connection has finished.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(watcher::EVENT_BUFFER);
        // Dropping the watcher stops events, so it lives until serve returns.
        let _watcher = watcher::watch(&self.watch_dirs, tx)?;
        tokio::spawn(watcher::rebuild_loop(
            rx,
            Arc::clone(&self.builder),
            self.hub(),
            self.debounce,
        ));

        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, dist = %self.dist_dir.display(), "Serving");

        let hub = self.hub();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                hub.close();
            })
            .await?;
        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Wait for Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
