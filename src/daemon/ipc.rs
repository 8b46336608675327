//! IPC Server for the Timerable daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for session commands
//! - Dispatch into the shared [`TimerController`]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};

use crate::controller::{ControllerError, StartStopOutcome, TimerController};
use crate::store::MemoryPersistence;
use crate::types::{IpcRequest, IpcResponse, ResponseData, SettingsParams};

// ============================================================================
// Constants
// ============================================================================

/// Default socket path, relative to the home directory
pub const DEFAULT_SOCKET_PATH: &str = ".timerable/timerable.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns `~/.timerable/timerable.sock`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_SOCKET_PATH))
        .context("home directory not found")
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// Client closed the connection before sending a request
    #[error("Connection closed by client")]
    ConnectionClosed,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        tracing::debug!("listening on {:?}", socket_path);

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Reads until the client shuts down its write half, with a read timeout
    /// and a size cap.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::with_capacity(512);
        let mut chunk = [0u8; 1024];

        loop {
            let read_result = timeout(
                Duration::from_secs(READ_TIMEOUT_SECS),
                stream.read(&mut chunk),
            )
            .await;

            let n = match read_result {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
                Err(_) => return Err(IpcError::Timeout.into()),
            };

            if n == 0 {
                break;
            }
            if buffer.len() + n > MAX_REQUEST_SIZE {
                return Err(IpcError::RequestTooLarge.into());
            }
            buffer.extend_from_slice(&chunk[..n]);

            // A complete JSON document may arrive without a shutdown
            if serde_json::from_slice::<serde_json::Value>(&buffer).is_ok() {
                break;
            }
        }

        if buffer.is_empty() {
            return Err(IpcError::ConnectionClosed.into());
        }

        let request: IpcRequest =
            serde_json::from_slice(&buffer).with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the controller.
#[derive(Clone)]
pub struct RequestHandler {
    /// Controller shared with the tick loop
    controller: Arc<Mutex<TimerController>>,
    /// Subject registry (the controller only reads it)
    subjects: Arc<MemoryPersistence>,
}

impl RequestHandler {
    pub fn new(controller: Arc<Mutex<TimerController>>, subjects: Arc<MemoryPersistence>) -> Self {
        Self {
            controller,
            subjects,
        }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        tracing::debug!(?request, "handling request");
        match request {
            IpcRequest::Start { subject } => self.handle_start(&subject).await,
            IpcRequest::Toggle => self.handle_toggle().await,
            IpcRequest::Pause => self.run("Session paused", TimerController::pause).await,
            IpcRequest::Resume => self.run("Session resumed", TimerController::resume).await,
            IpcRequest::Skip => self.run("Skipped to the next chunk", TimerController::skip).await,
            IpcRequest::Reset => self.run("Session reset", TimerController::reset).await,
            IpcRequest::Status => self.handle_status().await,
            IpcRequest::Subjects => self.handle_subjects().await,
            IpcRequest::AddSubject { name } => self.handle_add_subject(&name).await,
            IpcRequest::RemoveSubject { name } => self.handle_remove_subject(&name).await,
            IpcRequest::Configure { params } => self.handle_configure(params).await,
        }
    }

    /// Runs a controller operation and reports the resulting view.
    async fn run<F>(&self, message: &str, operation: F) -> IpcResponse
    where
        F: FnOnce(&mut TimerController) -> Result<(), ControllerError>,
    {
        let mut controller = self.controller.lock().await;
        match operation(&mut *controller) {
            Ok(()) => IpcResponse::success(
                message,
                Some(ResponseData::from_view_state(controller.view())),
            ),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_start(&self, subject: &str) -> IpcResponse {
        let mut controller = self.controller.lock().await;
        match controller.start_session(subject) {
            Ok(name) => IpcResponse::success(
                format!("Session started: {}", name),
                Some(ResponseData::from_view_state(controller.view())),
            ),
            Err(e @ ControllerError::UnknownSubject(_)) => {
                IpcResponse::error(e.to_string())
                    .with_data(ResponseData::from_subjects(&controller.subjects()))
            }
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_toggle(&self) -> IpcResponse {
        let mut controller = self.controller.lock().await;
        let message = match controller.start_stop() {
            Ok(StartStopOutcome::Started(name)) => format!("Session started: {}", name),
            Ok(StartStopOutcome::Paused) => "Session paused".to_string(),
            Ok(StartStopOutcome::Resumed) => "Session resumed".to_string(),
            Ok(StartStopOutcome::NeedsSubject(subjects)) => {
                let names: Vec<&str> = subjects.iter().map(|s| s.name.as_str()).collect();
                let message = if names.is_empty() {
                    "no subjects yet, add one with `subjects add NAME`".to_string()
                } else {
                    format!("choose a subject with `start --subject`: {}", names.join(", "))
                };
                return IpcResponse::error(message).with_data(ResponseData::from_subjects(&subjects));
            }
            Err(e) => return IpcResponse::error(e.to_string()),
        };
        IpcResponse::success(
            message,
            Some(ResponseData::from_view_state(controller.view())),
        )
    }

    async fn handle_status(&self) -> IpcResponse {
        let controller = self.controller.lock().await;
        IpcResponse::success("", Some(ResponseData::from_view_state(controller.view())))
    }

    async fn handle_subjects(&self) -> IpcResponse {
        let controller = self.controller.lock().await;
        IpcResponse::success("", Some(ResponseData::from_subjects(&controller.subjects())))
    }

    async fn handle_add_subject(&self, name: &str) -> IpcResponse {
        match self.subjects.add_subject(name) {
            Ok(subject) => {
                tracing::info!(name = %subject.name, "subject added");
                let controller = self.controller.lock().await;
                IpcResponse::success(
                    format!("Subject added: {}", subject.name),
                    Some(ResponseData::from_subjects(&controller.subjects())),
                )
            }
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_remove_subject(&self, name: &str) -> IpcResponse {
        match self.subjects.remove_subject(name) {
            Ok(subject) => {
                tracing::info!(name = %subject.name, "subject removed");
                let controller = self.controller.lock().await;
                IpcResponse::success(
                    format!("Subject removed: {}", subject.name),
                    Some(ResponseData::from_subjects(&controller.subjects())),
                )
            }
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_configure(&self, params: SettingsParams) -> IpcResponse {
        let mut controller = self.controller.lock().await;
        let current = controller.engine().settings();

        if params.is_empty() {
            let data = ResponseData::default().with_settings(current);
            return IpcResponse::success("", Some(data));
        }

        let updated = params.apply_to(current);
        match controller.update_settings(updated) {
            Ok(()) => {
                let data =
                    ResponseData::from_view_state(controller.view()).with_settings(updated);
                IpcResponse::success("Settings updated", Some(data))
            }
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
