//! Timerable Library
//!
//! This library provides the core functionality for the Timerable CLI.
//! It includes:
//! - Session engine: status machine, chunk schedule, goals and events
//! - Stores for settings, timer status, subjects and daily completions
//! - Presentation seams and the timer controller
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities

pub mod cli;
pub mod controller;
pub mod daemon;
pub mod engine;
pub mod presenter;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use controller::{ControllerError, StartStopOutcome, TimerController};
pub use engine::{
    EngineError, GoalCounter, GoalProgress, Session, SessionEngine, SessionEvent, TickOutcome,
    TickSignal, Ticker, TokioTicker,
};
pub use presenter::{Feedback, Intent, IntentPresenter, ViewState};
pub use store::{DefaultsStore, Persistence, SessionRecorder, StoreError};
pub use types::{
    ChunkType, DailyGoal, IpcRequest, IpcResponse, ResponseData, SessionSettings, Subject,
    TimeChunk, TimerStatus,
};
