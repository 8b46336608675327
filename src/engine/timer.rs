//! Session engine.
//!
//! This module provides the core timer functionality:
//! - State transitions (Ready → Timing ⇄ Paused → Ready)
//! - Chunk sequencing and per-tick countdown
//! - Goal accounting
//! - Event publishing for presentation layers

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::store::{DefaultsStore, Persistence};
use crate::types::{SessionSettings, TimeChunk, TimerStatus};

use super::error::EngineError;
use super::events::{EventBus, SessionEvent};
use super::goals::{session_goal, GoalCounter, GoalProgress};
use super::session::Session;
use super::ticker::{TickSignal, Ticker};

// ============================================================================
// TickOutcome
// ============================================================================

/// What a delivered tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not timing, or the signal came from a stopped ticker run
    Ignored,
    /// The active chunk counted one second
    Progressed,
    /// The active chunk completed and the next one became active
    ChunkAdvanced,
    /// The last chunk completed and the session ended
    Finished,
}

// ============================================================================
// SessionEngine
// ============================================================================

/// Owns the timer status, the current session and the ticker.
///
/// The engine is not internally synchronised. Callers that deliver ticks
/// from one task and user operations from another must put it behind a
/// single lock, which makes every transition atomic with respect to ticks.
pub struct SessionEngine {
    status: TimerStatus,
    session: Option<Session>,
    subject: Option<String>,
    defaults: Box<dyn DefaultsStore>,
    persistence: Arc<dyn Persistence>,
    ticker: Box<dyn Ticker>,
    events: EventBus,
}

impl SessionEngine {
    /// Creates an engine on top of its collaborators.
    ///
    /// If the store says a session was timing or paused when the process
    /// last ran, a fresh session is rebuilt and the engine comes up paused
    /// with the stored subject. Chunk progress itself is not restored.
    pub fn new(
        defaults: Box<dyn DefaultsStore>,
        persistence: Arc<dyn Persistence>,
        ticker: Box<dyn Ticker>,
    ) -> Self {
        let mut engine = Self {
            status: TimerStatus::Ready,
            session: None,
            subject: None,
            defaults,
            persistence,
            ticker,
            events: EventBus::new(),
        };
        engine.restore();
        engine
    }

    fn restore(&mut self) {
        let stored = self.defaults.timer_status();
        if !stored.is_in_session() {
            return;
        }

        match Session::build(&self.defaults.settings()) {
            Ok(session) => {
                self.session = Some(session);
                self.subject = self.defaults.subject();
                self.status = TimerStatus::Paused;
                tracing::info!(
                    previous = %stored,
                    subject = self.subject.as_deref().unwrap_or("-"),
                    "restored interrupted session as paused"
                );
            }
            Err(e) => {
                tracing::warn!("cannot restore session ({}), returning to ready", e);
                self.status = TimerStatus::Ready;
            }
        }
        self.mirror_status();
    }

    /// Registers a new event subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    /// Subject bound to the running session.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> SessionSettings {
        self.defaults.settings()
    }

    pub fn defaults(&self) -> &dyn DefaultsStore {
        self.defaults.as_ref()
    }

    pub fn persistence(&self) -> &Arc<dyn Persistence> {
        &self.persistence
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    /// The active chunk.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoActiveChunk`] if there is no session or it
    /// is exhausted.
    pub fn current_chunk(&self) -> Result<TimeChunk, EngineError> {
        self.session
            .as_ref()
            .and_then(Session::current)
            .copied()
            .ok_or(EngineError::NoActiveChunk)
    }

    /// First chunk a session started now would have.
    ///
    /// Does not touch the current session. `None` if the settings are
    /// invalid.
    pub fn preview_chunk(&self) -> Option<TimeChunk> {
        Session::build(&self.defaults.settings())
            .ok()
            .and_then(|session| session.current().copied())
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Starts a new session for `subject`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not ready or the settings cannot
    /// produce a session.
    pub fn start_session(&mut self, subject: &str) -> Result<(), EngineError> {
        if self.status != TimerStatus::Ready {
            return Err(EngineError::transition("start a session", self.status));
        }

        let session = Session::build(&self.defaults.settings())?;
        let first = session
            .current()
            .copied()
            .ok_or(EngineError::NoActiveChunk)?;

        self.session = Some(session);
        self.subject = Some(subject.to_string());
        if let Err(e) = self.defaults.set_subject(Some(subject)) {
            tracing::warn!("failed to store subject: {}", e);
        }

        self.set_status(TimerStatus::Timing);
        self.ticker.start();
        tracing::info!(subject, "session started");

        self.events.publish(SessionEvent::ChunkChanged(first));
        self.events.publish(SessionEvent::GoalsChanged);
        Ok(())
    }

    /// Pauses the countdown, keeping the elapsed time.
    ///
    /// # Errors
    ///
    /// Returns an error unless the engine is timing.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        if self.status != TimerStatus::Timing {
            return Err(EngineError::transition("pause", self.status));
        }

        self.ticker.stop();
        self.set_status(TimerStatus::Paused);
        Ok(())
    }

    /// Resumes a paused countdown from where it stopped.
    ///
    /// # Errors
    ///
    /// Returns an error unless the engine is paused.
    pub fn resume(&mut self) -> Result<(), EngineError> {
        if self.status != TimerStatus::Paused {
            return Err(EngineError::transition("resume", self.status));
        }

        self.set_status(TimerStatus::Timing);
        self.ticker.start();
        Ok(())
    }

    /// Abandons the active chunk and starts the next one.
    ///
    /// A paused session starts timing again. Skipping the last chunk ends
    /// the session. Skipped chunks do not count as completed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoActiveChunk`] if no session is in progress.
    pub fn skip(&mut self) -> Result<(), EngineError> {
        if !self.status.is_in_session() {
            return Err(EngineError::NoActiveChunk);
        }

        let next = self
            .session
            .as_mut()
            .ok_or(EngineError::NoActiveChunk)?
            .advance()
            .copied();

        match next {
            Some(chunk) => {
                tracing::debug!(chunk = chunk.chunk_type.as_str(), "chunk skipped");
                if self.status == TimerStatus::Paused {
                    self.set_status(TimerStatus::Timing);
                }
                // Restart so the new chunk gets a full first second
                self.ticker.stop();
                self.ticker.start();
                self.events.publish(SessionEvent::ChunkChanged(chunk));
                self.events.publish(SessionEvent::GoalsChanged);
            }
            None => self.finish(),
        }
        Ok(())
    }

    /// Discards the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is in progress.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        if !self.status.is_in_session() {
            return Err(EngineError::transition("reset", self.status));
        }

        self.ticker.stop();
        self.session = None;
        self.subject = None;
        self.set_status(TimerStatus::Ready);
        tracing::info!("session reset");

        self.events.publish(SessionEvent::SessionFinished);
        self.events.publish(SessionEvent::GoalsChanged);
        Ok(())
    }

    /// Counts one second of the active chunk.
    ///
    /// Outside `Timing` the tick is ignored. When the chunk reaches its
    /// duration, `ChunkCompleted` fires followed by either `ChunkChanged`
    /// for the next chunk or `SessionFinished`.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != TimerStatus::Timing {
            return TickOutcome::Ignored;
        }

        let (chunk, completed) = match self.session.as_mut().and_then(Session::current_mut) {
            Some(chunk) => {
                let completed = chunk.advance();
                (*chunk, completed)
            }
            None => return TickOutcome::Ignored,
        };

        if !completed {
            self.events.publish(SessionEvent::ChunkChanged(chunk));
            return TickOutcome::Progressed;
        }

        tracing::debug!(chunk = chunk.chunk_type.as_str(), "chunk completed");
        self.events.publish(SessionEvent::ChunkCompleted(chunk));

        let next = self
            .session
            .as_mut()
            .and_then(|session| session.advance().copied());

        match next {
            Some(next) => {
                self.events.publish(SessionEvent::ChunkChanged(next));
                self.events.publish(SessionEvent::GoalsChanged);
                TickOutcome::ChunkAdvanced
            }
            None => {
                self.finish();
                TickOutcome::Finished
            }
        }
    }

    /// Delivers a ticker signal.
    ///
    /// Signals from a ticker run that has since been stopped are ignored,
    /// so a tick already in flight cannot leak into a session that was
    /// paused, skipped, reset or restarted in the meantime.
    pub fn accept_tick(&mut self, signal: TickSignal) -> TickOutcome {
        if !self.ticker.is_running() || signal.generation != self.ticker.generation() {
            tracing::trace!(
                generation = signal.generation,
                current = self.ticker.generation(),
                "dropping stale tick"
            );
            return TickOutcome::Ignored;
        }
        self.tick()
    }

    // ------------------------------------------------------------------------
    // Settings and goals
    // ------------------------------------------------------------------------

    /// Rebuilds the upcoming session from the stored settings.
    ///
    /// # Errors
    ///
    /// Returns an error unless the engine is ready, or if the settings are
    /// invalid.
    pub fn refresh_settings(&mut self) -> Result<(), EngineError> {
        if self.status != TimerStatus::Ready {
            return Err(EngineError::transition("refresh settings", self.status));
        }

        let session = Session::build(&self.defaults.settings())?;
        let first = session
            .current()
            .copied()
            .ok_or(EngineError::NoActiveChunk)?;
        self.session = Some(session);

        self.events.publish(SessionEvent::ChunkChanged(first));
        self.events.publish(SessionEvent::GoalsChanged);
        Ok(())
    }

    /// Validates and stores new settings.
    ///
    /// A running session keeps its schedule; the settings apply to the next
    /// one. When ready, the upcoming session is rebuilt right away.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] for invalid settings.
    pub fn update_settings(&mut self, settings: SessionSettings) -> Result<(), EngineError> {
        settings
            .validate()
            .map_err(EngineError::InvalidConfiguration)?;

        if let Err(e) = self.defaults.set_settings(settings) {
            tracing::warn!("failed to store settings: {}", e);
        }

        if self.status == TimerStatus::Ready {
            self.refresh_settings()
        } else {
            self.events.publish(SessionEvent::GoalsChanged);
            Ok(())
        }
    }

    /// Current session and daily goal counters.
    pub fn goal_progress(&self) -> GoalProgress {
        let daily = self.persistence.fetch_daily_goal();
        GoalProgress {
            session: session_goal(self.defaults.number_of_sessions(), self.session.as_ref()),
            daily: GoalCounter::new(daily.sessions_completed, self.defaults.daily_goal()),
        }
    }

    /// Asks subscribers to recompute goals and returns the fresh values.
    pub fn refresh_goals(&mut self) -> GoalProgress {
        self.events.publish(SessionEvent::GoalsChanged);
        self.goal_progress()
    }

    /// Work chunks finished in the current session.
    pub fn session_count(&self) -> u32 {
        self.goal_progress().session.current
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Ends an exhausted session. The session is kept for accounting.
    fn finish(&mut self) {
        self.ticker.stop();
        self.subject = None;
        self.set_status(TimerStatus::Ready);
        tracing::info!("session finished");

        self.events.publish(SessionEvent::SessionFinished);
        self.events.publish(SessionEvent::GoalsChanged);
    }

    fn set_status(&mut self, status: TimerStatus) {
        tracing::debug!(from = %self.status, to = %status, "status transition");
        self.status = status;
        self.mirror_status();
        self.events.publish(SessionEvent::StatusChanged {
            status,
            subject: self.subject.clone(),
        });
    }

    fn mirror_status(&mut self) {
        if let Err(e) = self.defaults.set_timer_status(self.status) {
            tracing::warn!("failed to store timer status: {}", e);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
