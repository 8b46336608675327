//! IPC Client for communicating with the Timerable daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::daemon::default_socket_path;
use crate::types::{IpcRequest, IpcResponse, SettingsParams};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: u64 = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
    /// Base delay between attempts
    retry_delay: Duration,
}

impl IpcClient {
    /// Creates a new IPC client with the default socket path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_socket_path(default_socket_path()?))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }

    /// Uses `socket_path` if given, the default path otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is given and the home directory cannot be
    /// determined.
    pub fn for_socket(socket_path: Option<PathBuf>) -> Result<Self> {
        match socket_path {
            Some(path) => Ok(Self::with_socket_path(path)),
            None => Self::new(),
        }
    }

    /// Overrides the base retry delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Starts a session for `subject`.
    pub async fn start(&self, subject: &str) -> Result<IpcResponse> {
        self.request(&IpcRequest::Start {
            subject: subject.to_string(),
        })
        .await
    }

    pub async fn toggle(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Toggle).await
    }

    pub async fn pause(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Pause).await
    }

    pub async fn resume(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Resume).await
    }

    pub async fn skip(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Skip).await
    }

    pub async fn reset(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Reset).await
    }

    pub async fn status(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Status).await
    }

    pub async fn subjects(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Subjects).await
    }

    pub async fn add_subject(&self, name: &str) -> Result<IpcResponse> {
        self.request(&IpcRequest::AddSubject {
            name: name.to_string(),
        })
        .await
    }

    pub async fn remove_subject(&self, name: &str) -> Result<IpcResponse> {
        self.request(&IpcRequest::RemoveSubject {
            name: name.to_string(),
        })
        .await
    }

    /// Updates settings. Empty params only read them back.
    pub async fn configure(&self, params: SettingsParams) -> Result<IpcResponse> {
        self.request(&IpcRequest::Configure { params }).await
    }

    /// Sends a request and turns an error response into an `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable or reports a failure.
    pub async fn request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let response = self.send_request_with_retry(request).await?;
        if !response.is_success() {
            anyhow::bail!("{}", response.message);
        }
        Ok(response)
    }

    /// Sends a request to the daemon with retry logic.
    ///
    /// Only transport failures are retried; an error response from the
    /// daemon is returned as is.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut attempt = 1;
        loop {
            match self.send_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt >= MAX_RETRIES => return Err(e),
                Err(e) => {
                    tracing::warn!("request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    tokio::time::sleep(self.retry_delay * attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("connection timed out")?
            .with_context(|| {
                format!(
                    "cannot connect to the daemon at {:?}; start it with 'timerable daemon'",
                    self.socket_path
                )
            })?;

        let request_json = serde_json::to_vec(request).context("failed to serialize request")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(&request_json),
        )
        .await
        .context("write timed out")?
        .context("failed to send request")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("failed to shut down write half")?;

        let mut buffer = Vec::new();
        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            (&mut stream).take(MAX_RESPONSE_SIZE).read_to_end(&mut buffer),
        )
        .await
        .context("read timed out")?
        .context("failed to receive response")?;

        if buffer.is_empty() {
            anyhow::bail!("no response from the daemon");
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer).context("failed to parse response")?;

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
