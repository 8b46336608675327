//! Daemon event loop.
//!
//! One task owns the IPC listener and the tick receiver and multiplexes
//! them with the shutdown signal. Each connection is served on its own
//! task; all of them share the controller behind a single lock, so ticks
//! and commands never interleave inside an engine transition.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Duration;

use crate::controller::TimerController;
use crate::engine::{SessionEngine, TickSignal, TokioTicker, TICK_PERIOD};
use crate::presenter::{TerminalFeedback, TracingPresenter};
use crate::store::{DefaultsStore, JsonDefaultsStore, MemoryDefaultsStore, MemoryPersistence};
use crate::types::IpcResponse;

use super::ipc::{IpcServer, RequestHandler};

// ============================================================================
// DaemonOptions
// ============================================================================

/// How to set up a daemon.
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    pub socket_path: PathBuf,
    /// Defaults file; `None` uses `~/.timerable/defaults.json`
    pub defaults_path: Option<PathBuf>,
    /// Keep defaults in memory only
    pub ephemeral: bool,
    /// Subjects registered at startup
    pub subjects: Vec<String>,
    /// Ring the terminal bell when a chunk completes
    pub bell: bool,
    pub tick_period: Duration,
}

impl DaemonOptions {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            defaults_path: None,
            ephemeral: false,
            subjects: Vec::new(),
            bell: true,
            tick_period: TICK_PERIOD,
        }
    }

    pub fn with_defaults_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.defaults_path = Some(path.into());
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bell(mut self, bell: bool) -> Self {
        self.bell = bell;
        self
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    fn open_defaults(&self) -> Result<Box<dyn DefaultsStore>> {
        if self.ephemeral {
            return Ok(Box::new(MemoryDefaultsStore::new()));
        }
        let store = match &self.defaults_path {
            Some(path) => JsonDefaultsStore::open(path),
            None => JsonDefaultsStore::open_default(),
        }
        .context("Failed to open defaults")?;
        tracing::debug!("using defaults at {:?}", store.path());
        Ok(Box::new(store))
    }
}

// ============================================================================
// Daemon
// ============================================================================

/// A bound daemon, ready to run.
pub struct Daemon {
    server: IpcServer,
    handler: RequestHandler,
    controller: Arc<Mutex<TimerController>>,
    tick_rx: mpsc::UnboundedReceiver<TickSignal>,
}

impl Daemon {
    /// Builds the engine stack and binds the socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be opened or the socket
    /// cannot be bound.
    pub fn bind(options: &DaemonOptions) -> Result<Self> {
        let defaults = options.open_defaults()?;
        let subjects = Arc::new(MemoryPersistence::with_subjects(&options.subjects));
        let (ticker, tick_rx) = TokioTicker::channel();
        let ticker = ticker.with_period(options.tick_period);

        let engine = SessionEngine::new(defaults, subjects.clone(), Box::new(ticker));
        let mut controller = TimerController::new(
            engine,
            Arc::new(TracingPresenter),
            Arc::new(TerminalFeedback::new(options.bell)),
        )
        .with_recorder(subjects.clone());

        if let Err(e) = controller.on_appear() {
            tracing::warn!("stored settings are unusable: {}", e);
        }

        let server = IpcServer::new(&options.socket_path)?;
        let controller = Arc::new(Mutex::new(controller));
        let handler = RequestHandler::new(controller.clone(), subjects);

        Ok(Self {
            server,
            handler,
            controller,
            tick_rx,
        })
    }

    pub fn socket_path(&self) -> &Path {
        self.server.socket_path()
    }

    /// Runs until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Runs until `shutdown` completes.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!("daemon listening on {:?}", self.server.socket_path());

        loop {
            tokio::select! {
                Some(signal) = self.tick_rx.recv() => {
                    self.controller.lock().await.handle_tick(signal);
                }
                accepted = self.server.accept() => match accepted {
                    Ok(stream) => {
                        let handler = self.handler.clone();
                        tokio::spawn(serve_connection(handler, stream));
                    }
                    Err(e) => tracing::warn!("{:#}", e),
                },
                () = &mut shutdown => {
                    tracing::info!("shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn serve_connection(handler: RequestHandler, mut stream: UnixStream) {
    let response = match IpcServer::receive_request(&mut stream).await {
        Ok(request) => handler.handle(request).await,
        Err(e) => {
            tracing::debug!("bad request: {:#}", e);
            IpcResponse::error(format!("{:#}", e))
        }
    };

    if let Err(e) = IpcServer::send_response(&mut stream, &response).await {
        tracing::debug!("failed to send response: {:#}", e);
    }
}

/// Binds and runs a daemon until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the daemon cannot be set up.
pub async fn run_daemon(options: DaemonOptions) -> Result<()> {
    Daemon::bind(&options)?.run().await
}
