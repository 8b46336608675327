//! Session and daily goal accounting.

use serde::{Deserialize, Serialize};

use super::session::Session;

/// A count of completed work chunks against a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalCounter {
    pub current: u32,
    pub target: u32,
}

impl GoalCounter {
    pub fn new(current: u32, target: u32) -> Self {
        Self { current, target }
    }

    /// Progress towards the target, clamped to `0.0..=1.0`.
    ///
    /// A zero target yields 0.
    pub fn ratio(&self) -> f64 {
        if self.target == 0 {
            return 0.0;
        }
        (f64::from(self.current) / f64::from(self.target)).min(1.0)
    }

    pub fn is_reached(&self) -> bool {
        self.target > 0 && self.current >= self.target
    }
}

/// Snapshot of both goal counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub session: GoalCounter,
    pub daily: GoalCounter,
}

/// Work chunks finished in the current session against the session size.
///
/// Only `work` chunks count; the active chunk counts as not finished.
/// The target is the size the session was built with, so a settings change
/// mid-session does not skew the count. Without a session the count is 0
/// against the configured `number_of_sessions`.
pub fn session_goal(number_of_sessions: u32, session: Option<&Session>) -> GoalCounter {
    match session {
        Some(session) => {
            let total = session.work_chunks();
            GoalCounter::new(total.saturating_sub(session.remaining_work_chunks()), total)
        }
        None => GoalCounter::new(0, number_of_sessions),
    }
}
