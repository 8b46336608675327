//! Session engine for Timerable.
//!
//! - `session`: schedule of work and break chunks
//! - `timer`: the state machine that drives a session
//! - `ticker`: one-second tick sources (tokio and mock)
//! - `events`: events pushed to presentation layers
//! - `goals`: session and daily goal counters

mod error;
mod events;
mod goals;
mod session;
mod ticker;
mod timer;

pub use error::EngineError;
pub use events::{EventBus, SessionEvent};
pub use goals::{session_goal, GoalCounter, GoalProgress};
pub use session::Session;
pub use ticker::{MockTicker, TickSignal, Ticker, TokioTicker, TICK_PERIOD};
pub use timer::{SessionEngine, TickOutcome};
