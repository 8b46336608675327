//! Derived view state.

use serde::Serialize;

use crate::engine::{GoalCounter, GoalProgress, SessionEngine, SessionEvent};
use crate::types::{TimeChunk, TimerStatus};

/// Title shown when no session is running.
pub const IDLE_TITLE: &str = "Timer";

// ============================================================================
// Actions
// ============================================================================

/// Label of the start/stop control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimaryAction {
    Start,
    Pause,
    Resume,
}

impl PrimaryAction {
    pub fn for_status(status: TimerStatus) -> Self {
        match status {
            TimerStatus::Ready => PrimaryAction::Start,
            TimerStatus::Timing => PrimaryAction::Pause,
            TimerStatus::Paused => PrimaryAction::Resume,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::Start => "Start",
            PrimaryAction::Pause => "Pause",
            PrimaryAction::Resume => "Resume",
        }
    }
}

/// Commands a user can issue in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAction {
    /// Pause or resume
    Toggle,
    Reset,
    Skip,
    /// Manage subjects
    Subjects,
}

impl UserAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::Toggle => "toggle",
            UserAction::Reset => "reset",
            UserAction::Skip => "skip",
            UserAction::Subjects => "subjects",
        }
    }
}

/// Actions offered in `status`. Subject management is always available.
pub fn available_actions(status: TimerStatus) -> Vec<UserAction> {
    let mut actions = Vec::with_capacity(4);
    if status.is_in_session() {
        actions.extend([UserAction::Toggle, UserAction::Reset, UserAction::Skip]);
    }
    actions.push(UserAction::Subjects);
    actions
}

/// Formats seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ============================================================================
// ViewState
// ============================================================================

/// Everything a front end needs to draw the timer.
///
/// Built once from the engine, then kept current by feeding it engine
/// events and goal snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub status: TimerStatus,
    pub subject: Option<String>,
    pub chunk: Option<TimeChunk>,
    pub session_goal: GoalCounter,
    pub daily_goal: GoalCounter,
}

impl ViewState {
    /// Snapshot of the engine as it is right now.
    pub fn from_engine(engine: &SessionEngine) -> Self {
        let goals = engine.goal_progress();
        Self {
            status: engine.status(),
            subject: engine.subject().map(str::to_string),
            chunk: engine.current_chunk().ok(),
            session_goal: goals.session,
            daily_goal: goals.daily,
        }
    }

    /// Applies one engine event.
    ///
    /// `GoalsChanged` carries no values; callers follow it with
    /// [`ViewState::set_goals`].
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::ChunkChanged(chunk) | SessionEvent::ChunkCompleted(chunk) => {
                self.chunk = Some(*chunk);
            }
            SessionEvent::SessionFinished => {
                self.status = TimerStatus::Ready;
                self.subject = None;
                self.chunk = None;
            }
            SessionEvent::StatusChanged { status, subject } => {
                self.status = *status;
                self.subject = subject.clone();
            }
            SessionEvent::GoalsChanged => {}
        }
    }

    pub fn set_goals(&mut self, goals: GoalProgress) {
        self.session_goal = goals.session;
        self.daily_goal = goals.daily;
    }

    /// Subject name while a session runs, otherwise "Timer".
    pub fn title(&self) -> &str {
        match (&self.subject, self.status.is_in_session()) {
            (Some(subject), true) => subject,
            _ => IDLE_TITLE,
        }
    }

    pub fn primary_action(&self) -> PrimaryAction {
        PrimaryAction::for_status(self.status)
    }

    pub fn reset_visible(&self) -> bool {
        self.status.is_in_session()
    }

    pub fn skip_enabled(&self) -> bool {
        self.status.is_in_session()
    }

    pub fn chunk_label(&self) -> Option<&'static str> {
        self.chunk.map(|c| c.chunk_type.label())
    }

    /// Remaining time of the shown chunk as `MM:SS`.
    pub fn remaining_text(&self) -> String {
        format_clock(self.chunk.map_or(0, |c| c.remaining()))
    }

    pub fn progress(&self) -> f64 {
        self.chunk.map_or(0.0, |c| c.progress())
    }

    pub fn available_actions(&self) -> Vec<UserAction> {
        available_actions(self.status)
    }
}
