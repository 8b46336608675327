//! Timer controller.
//!
//! Sits between a front end and the [`SessionEngine`]: forwards user
//! operations, keeps a [`ViewState`] current from engine events, plays
//! feedback and records completed work chunks.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::engine::{EngineError, SessionEngine, SessionEvent, TickOutcome, TickSignal};
use crate::presenter::{Feedback, Intent, IntentPresenter, ViewState};
use crate::store::SessionRecorder;
use crate::types::{SessionSettings, Subject, TimerStatus};

/// Controller errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The requested subject is not registered.
    #[error("unknown subject '{0}'")]
    UnknownSubject(String),
}

/// Result of the start/stop control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartStopOutcome {
    /// A session started for the chosen subject
    Started(String),
    Paused,
    Resumed,
    /// No subject was chosen; these are the candidates
    NeedsSubject(Vec<Subject>),
}

pub struct TimerController {
    engine: SessionEngine,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    view: ViewState,
    presenter: Arc<dyn IntentPresenter>,
    feedback: Arc<dyn Feedback>,
    recorder: Option<Arc<dyn SessionRecorder>>,
}

impl TimerController {
    pub fn new(
        mut engine: SessionEngine,
        presenter: Arc<dyn IntentPresenter>,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        let events = engine.subscribe();
        let view = ViewState::from_engine(&engine);
        Self {
            engine,
            events,
            view,
            presenter,
            feedback,
            recorder: None,
        }
    }

    /// Records every completed work chunk into `recorder`.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn SessionRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn subjects(&self) -> Vec<Subject> {
        self.engine.persistence().fetch_all_subjects()
    }

    /// Prepares the view when it is first shown.
    ///
    /// When ready, the upcoming session is rebuilt from the current settings
    /// so the first chunk can be previewed.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored settings are invalid.
    pub fn on_appear(&mut self) -> Result<(), ControllerError> {
        if self.engine.status() == TimerStatus::Ready {
            self.engine.refresh_settings()?;
        }
        self.engine.refresh_goals();
        self.pump_events();
        Ok(())
    }

    /// The start/stop control.
    ///
    /// When ready the presenter is asked for a subject; timing pauses and
    /// paused resumes.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen subject is unknown or the engine
    /// rejects the operation.
    pub fn start_stop(&mut self) -> Result<StartStopOutcome, ControllerError> {
        match self.engine.status() {
            TimerStatus::Ready => {
                let subjects = self.subjects();
                match self.presenter.present_subject_picker(&subjects) {
                    Some(name) => {
                        let subject = self.start_session(&name)?;
                        Ok(StartStopOutcome::Started(subject))
                    }
                    None => Ok(StartStopOutcome::NeedsSubject(subjects)),
                }
            }
            TimerStatus::Timing => {
                self.pause()?;
                Ok(StartStopOutcome::Paused)
            }
            TimerStatus::Paused => {
                self.resume()?;
                Ok(StartStopOutcome::Resumed)
            }
        }
    }

    /// Starts a session for a registered subject (matched case-insensitively).
    ///
    /// Returns the subject's stored name.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::UnknownSubject`] if no subject matches, or
    /// the engine's error if it is not ready.
    pub fn start_session(&mut self, name: &str) -> Result<String, ControllerError> {
        let wanted = name.trim();
        let subject = self
            .subjects()
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ControllerError::UnknownSubject(wanted.to_string()))?;

        self.engine.start_session(&subject.name)?;
        self.presenter.donate(&Intent::StartSession {
            subject: subject.name.clone(),
        });
        self.pump_events();
        Ok(subject.name)
    }

    /// # Errors
    ///
    /// Returns an error unless a session is timing.
    pub fn pause(&mut self) -> Result<(), ControllerError> {
        self.engine.pause()?;
        self.presenter.donate(&Intent::Pause);
        self.pump_events();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error unless a session is paused.
    pub fn resume(&mut self) -> Result<(), ControllerError> {
        self.engine.resume()?;
        self.presenter.donate(&Intent::Resume);
        self.pump_events();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if no session is in progress.
    pub fn skip(&mut self) -> Result<(), ControllerError> {
        self.engine.skip()?;
        self.presenter.donate(&Intent::Skip);
        self.pump_events();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if no session is in progress.
    pub fn reset(&mut self) -> Result<(), ControllerError> {
        self.engine.reset()?;
        self.presenter.donate(&Intent::Reset);
        self.pump_events();
        Ok(())
    }

    /// Stores new settings and refreshes the view.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid.
    pub fn update_settings(&mut self, settings: SessionSettings) -> Result<(), ControllerError> {
        self.engine.update_settings(settings)?;
        self.pump_events();
        Ok(())
    }

    /// Delivers a ticker signal to the engine.
    pub fn handle_tick(&mut self, signal: TickSignal) -> TickOutcome {
        let outcome = self.engine.accept_tick(signal);
        if outcome != TickOutcome::Ignored {
            self.pump_events();
        }
        outcome
    }

    /// Applies every pending engine event. Returns how many were handled.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            tracing::trace!(event = event.name(), "applying event");
            match &event {
                SessionEvent::ChunkCompleted(chunk) => {
                    self.feedback.chunk_completed(chunk);
                    if !chunk.chunk_type.is_break() {
                        if let Some(recorder) = &self.recorder {
                            recorder.record_completed_session(self.view.subject.as_deref());
                        }
                    }
                }
                SessionEvent::GoalsChanged => {
                    self.view.set_goals(self.engine.goal_progress());
                }
                _ => {}
            }
            self.view.apply(&event);
            if matches!(event, SessionEvent::SessionFinished) {
                // Ready always previews the next session's first chunk
                self.view.chunk = self.engine.preview_chunk();
            }
            handled += 1;
        }
        handled
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockTicker;
    use crate::presenter::{MockFeedback, MockIntentPresenter};
    use crate::store::{MemoryDefaultsStore, MemoryPersistence};
    use crate::types::{ChunkType, TimeChunk};

    struct Fixture {
        controller: TimerController,
        ticker: MockTicker,
        presenter: Arc<MockIntentPresenter>,
        feedback: Arc<MockFeedback>,
        persistence: Arc<MemoryPersistence>,
    }

    fn create_controller_with(settings: SessionSettings, presenter: MockIntentPresenter) -> Fixture {
        let ticker = MockTicker::new();
        let persistence = Arc::new(MemoryPersistence::with_subjects(["Math", "Physics"]));
        let engine = SessionEngine::new(
            Box::new(MemoryDefaultsStore::with_settings(settings)),
            persistence.clone(),
            Box::new(ticker.clone()),
        );
        let presenter = Arc::new(presenter);
        let feedback = Arc::new(MockFeedback::new());
        let controller = TimerController::new(engine, presenter.clone(), feedback.clone())
            .with_recorder(persistence.clone());
        Fixture {
            controller,
            ticker,
            presenter,
            feedback,
            persistence,
        }
    }

    fn create_controller() -> Fixture {
        create_controller_with(SessionSettings::default(), MockIntentPresenter::new())
    }

    fn short_settings() -> SessionSettings {
        SessionSettings::default()
            .with_number_of_sessions(2)
            .with_work_seconds(2)
            .with_short_break_seconds(1)
            .with_long_break_seconds(1)
    }

    fn tick(f: &mut Fixture) -> TickOutcome {
        let signal = f.ticker.signal();
        f.controller.handle_tick(signal)
    }

    mod appear_tests {
        use super::*;

        #[test]
        fn test_on_appear_previews_first_chunk() {
            let mut f = create_controller();

            f.controller.on_appear().unwrap();

            let view = f.controller.view();
            assert_eq!(view.title(), "Timer");
            assert_eq!(view.primary_action().label(), "Start");
            assert_eq!(view.chunk_label(), Some("Work"));
            assert_eq!(view.remaining_text(), "25:00");
            assert_eq!(view.session_goal.current, 0);
            assert_eq!(view.session_goal.target, 4);
            assert_eq!(view.daily_goal.target, 8);
            assert!(!view.reset_visible());
        }

        #[test]
        fn test_on_appear_with_invalid_settings_fails() {
            let mut f = create_controller_with(
                SessionSettings::default().with_long_break_seconds(0),
                MockIntentPresenter::new(),
            );
            let err = f.controller.on_appear().unwrap_err();
            assert!(matches!(err, ControllerError::Engine(e) if e.is_invalid_configuration()));
        }
    }

    mod start_stop_tests {
        use super::*;

        #[test]
        fn test_ready_without_choice_needs_subject() {
            let mut f = create_controller();

            let outcome = f.controller.start_stop().unwrap();

            match outcome {
                StartStopOutcome::NeedsSubject(subjects) => assert_eq!(subjects.len(), 2),
                other => panic!("unexpected outcome: {:?}", other),
            }
            assert_eq!(f.presenter.picker_calls(), 1);
            assert_eq!(f.controller.engine().status(), TimerStatus::Ready);
        }

        #[test]
        fn test_ready_with_choice_starts() {
            let mut f = create_controller_with(
                SessionSettings::default(),
                MockIntentPresenter::choosing("physics"),
            );

            let outcome = f.controller.start_stop().unwrap();

            assert_eq!(outcome, StartStopOutcome::Started("Physics".to_string()));
            assert_eq!(f.controller.view().title(), "Physics");
            assert_eq!(f.controller.view().primary_action().label(), "Pause");
            assert!(f.controller.view().reset_visible());
            assert!(f.controller.view().skip_enabled());
        }

        #[test]
        fn test_toggle_cycles_pause_and_resume() {
            let mut f = create_controller();
            f.controller.start_session("Math").unwrap();

            assert_eq!(f.controller.start_stop().unwrap(), StartStopOutcome::Paused);
            assert_eq!(f.controller.view().primary_action().label(), "Resume");

            assert_eq!(f.controller.start_stop().unwrap(), StartStopOutcome::Resumed);
            assert_eq!(f.controller.view().primary_action().label(), "Pause");

            assert_eq!(
                f.presenter.donated(),
                vec![
                    Intent::StartSession {
                        subject: "Math".to_string()
                    },
                    Intent::Pause,
                    Intent::Resume,
                ]
            );
        }

        #[test]
        fn test_unknown_subject_is_rejected() {
            let mut f = create_controller();
            let err = f.controller.start_session("Chemistry").unwrap_err();
            assert_eq!(err, ControllerError::UnknownSubject("Chemistry".to_string()));
            assert!(f.presenter.donated().is_empty());
        }
    }

    mod operation_tests {
        use super::*;

        #[test]
        fn test_skip_updates_view_and_goals() {
            let mut f = create_controller();
            f.controller.start_session("Math").unwrap();

            f.controller.skip().unwrap();

            let view = f.controller.view();
            assert_eq!(view.chunk_label(), Some("Short Break"));
            assert_eq!(view.remaining_text(), "05:00");
            assert_eq!(view.session_goal.current, 1);
            // Skipped work is not recorded
            assert_eq!(view.daily_goal.current, 0);
            assert_eq!(f.feedback.play_count(), 0);
        }

        #[test]
        fn test_reset_returns_view_to_idle() {
            let mut f = create_controller();
            f.controller.start_session("Math").unwrap();

            f.controller.reset().unwrap();

            let view = f.controller.view();
            assert_eq!(view.title(), "Timer");
            assert_eq!(view.primary_action().label(), "Start");
            assert!(!view.reset_visible());
            assert!(!view.skip_enabled());
            assert_eq!(view.session_goal.current, 0);
            assert_eq!(view.chunk_label(), Some("Work"));
            assert_eq!(view.remaining_text(), "25:00");
        }

        #[test]
        fn test_skip_from_ready_is_error() {
            let mut f = create_controller();
            let err = f.controller.skip().unwrap_err();
            assert_eq!(err, ControllerError::Engine(EngineError::NoActiveChunk));
        }

        #[test]
        fn test_update_settings_refreshes_preview() {
            let mut f = create_controller();
            f.controller.on_appear().unwrap();

            f.controller
                .update_settings(SessionSettings::default().with_work_seconds(50 * 60))
                .unwrap();

            assert_eq!(f.controller.view().remaining_text(), "50:00");
        }
    }

    mod tick_tests {
        use super::*;

        #[test]
        fn test_tick_updates_remaining_time() {
            let mut f = create_controller();
            f.controller.start_session("Math").unwrap();

            assert_eq!(tick(&mut f), TickOutcome::Progressed);

            assert_eq!(f.controller.view().remaining_text(), "24:59");
        }

        #[test]
        fn test_completed_work_plays_feedback_and_records() {
            let mut f = create_controller_with(short_settings(), MockIntentPresenter::new());
            f.controller.start_session("Math").unwrap();

            tick(&mut f);
            assert_eq!(tick(&mut f), TickOutcome::ChunkAdvanced);

            assert_eq!(f.feedback.play_count(), 1);
            let mut done = TimeChunk::new(ChunkType::Work, 2);
            done.elapsed = 2;
            assert_eq!(f.feedback.completed(), vec![done]);

            let view = f.controller.view();
            assert_eq!(view.chunk_label(), Some("Short Break"));
            assert_eq!(view.session_goal.current, 1);
            assert_eq!(view.daily_goal.current, 1);
        }

        #[test]
        fn test_full_session_records_every_work_chunk() {
            let mut f = create_controller_with(short_settings(), MockIntentPresenter::new());
            f.controller.start_session("Math").unwrap();

            let mut outcome = TickOutcome::Progressed;
            for _ in 0..6 {
                outcome = tick(&mut f);
            }

            assert_eq!(outcome, TickOutcome::Finished);
            // Two work chunks and two breaks
            assert_eq!(f.feedback.play_count(), 4);
            assert_eq!(
                crate::store::Persistence::fetch_daily_goal(f.persistence.as_ref())
                    .sessions_completed,
                2
            );

            let view = f.controller.view();
            assert_eq!(view.title(), "Timer");
            assert_eq!(view.session_goal.current, 2);
            assert_eq!(view.daily_goal.current, 2);
            // The next session is previewed from the start
            let chunk = view.chunk.unwrap();
            assert_eq!(chunk.chunk_type, ChunkType::Work);
            assert_eq!(chunk.elapsed, 0);
            assert_eq!(view.remaining_text(), "00:02");
            // The engine keeps the finished session for accounting
            assert_eq!(f.controller.engine().session_count(), 2);
        }

        #[test]
        fn test_stale_tick_leaves_view_untouched() {
            let mut f = create_controller();
            f.controller.start_session("Math").unwrap();
            let stale = f.ticker.signal();
            f.controller.pause().unwrap();
            let before = f.controller.view().clone();

            assert_eq!(f.controller.handle_tick(stale), TickOutcome::Ignored);
            assert_eq!(f.controller.view(), &before);
        }
    }
}
