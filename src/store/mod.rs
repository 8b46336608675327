//! Collaborators the session engine reads from and writes to.
//!
//! - [`DefaultsStore`]: the single source of truth for settings, the timer
//!   status and the bound subject. The engine owns its store and mirrors
//!   every status change into it, so the status survives a restart.
//! - [`Persistence`]: read-only access to subjects and the daily count.
//! - [`SessionRecorder`]: where the application layer reports completed
//!   work chunks. The engine never writes completions itself.

mod defaults;
mod error;
mod persistence;

pub use defaults::{default_defaults_path, Defaults, JsonDefaultsStore, MemoryDefaultsStore};
pub use error::StoreError;
pub use persistence::{today, MemoryPersistence};

use crate::types::{DailyGoal, SessionSettings, Subject, TimerStatus};

/// Key/value configuration owned by the engine.
pub trait DefaultsStore: Send {
    fn timer_status(&self) -> TimerStatus;

    /// # Errors
    ///
    /// Returns an error if the value cannot be written to the backing store.
    fn set_timer_status(&mut self, status: TimerStatus) -> Result<(), StoreError>;

    /// Subject bound to the current (or last) session.
    fn subject(&self) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the value cannot be written to the backing store.
    fn set_subject(&mut self, subject: Option<&str>) -> Result<(), StoreError>;

    fn settings(&self) -> SessionSettings;

    /// # Errors
    ///
    /// Returns an error if the value cannot be written to the backing store.
    fn set_settings(&mut self, settings: SessionSettings) -> Result<(), StoreError>;

    fn number_of_sessions(&self) -> u32 {
        self.settings().number_of_sessions
    }

    fn daily_goal(&self) -> u32 {
        self.settings().daily_goal
    }
}

/// Read-only view of stored subjects and completions.
pub trait Persistence: Send + Sync {
    fn fetch_all_subjects(&self) -> Vec<Subject>;
    fn fetch_daily_goal(&self) -> DailyGoal;
}

/// Sink for completed work chunks.
pub trait SessionRecorder: Send + Sync {
    fn record_completed_session(&self, subject: Option<&str>);
}
