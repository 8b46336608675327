//! Daemon module for Timerable.
//!
//! - `ipc`: Unix socket server and request dispatch
//! - `server`: the event loop tying ticks, connections and shutdown together

pub mod ipc;
pub mod server;

pub use ipc::{default_socket_path, IpcError, IpcServer, RequestHandler, DEFAULT_SOCKET_PATH};
pub use server::{run_daemon, Daemon, DaemonOptions};
