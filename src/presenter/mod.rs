//! Presentation seams.
//!
//! The engine never talks to a user directly. Front ends plug in here:
//!
//! - [`ViewState`]: what to draw, derived from engine events
//! - [`IntentPresenter`]: subject selection and intent donation
//! - [`Feedback`]: the cue played when a chunk completes

mod view;

pub use view::{available_actions, format_clock, PrimaryAction, UserAction, ViewState, IDLE_TITLE};

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::types::{Subject, TimeChunk};

// ============================================================================
// IntentPresenter
// ============================================================================

/// User-initiated operations, reported to the presenter after they succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    StartSession { subject: String },
    Pause,
    Resume,
    Skip,
    Reset,
}

/// Front-end hooks for choosing a subject and recording user intents.
pub trait IntentPresenter: Send + Sync {
    /// Offers the known subjects. Returns the chosen name, or `None` if the
    /// choice is made elsewhere or was cancelled.
    fn present_subject_picker(&self, subjects: &[Subject]) -> Option<String>;

    /// Records an operation the user performed.
    fn donate(&self, intent: &Intent);
}

/// Presenter for headless front ends. Never picks a subject.
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl IntentPresenter for TracingPresenter {
    fn present_subject_picker(&self, subjects: &[Subject]) -> Option<String> {
        tracing::debug!(count = subjects.len(), "subject selection requested");
        None
    }

    fn donate(&self, intent: &Intent) {
        tracing::debug!(?intent, "intent");
    }
}

/// Mock presenter for testing.
#[derive(Debug, Default)]
pub struct MockIntentPresenter {
    choice: Mutex<Option<String>>,
    picker_calls: AtomicUsize,
    donated: Mutex<Vec<Intent>>,
}

impl MockIntentPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the picker return `subject`.
    #[must_use]
    pub fn choosing(subject: &str) -> Self {
        let presenter = Self::default();
        presenter.set_choice(Some(subject));
        presenter
    }

    pub fn set_choice(&self, subject: Option<&str>) {
        *self.choice.lock().unwrap() = subject.map(str::to_string);
    }

    #[must_use]
    pub fn picker_calls(&self) -> usize {
        self.picker_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn donated(&self) -> Vec<Intent> {
        self.donated.lock().unwrap().clone()
    }
}

impl IntentPresenter for MockIntentPresenter {
    fn present_subject_picker(&self, _subjects: &[Subject]) -> Option<String> {
        self.picker_calls.fetch_add(1, Ordering::SeqCst);
        self.choice.lock().unwrap().clone()
    }

    fn donate(&self, intent: &Intent) {
        self.donated.lock().unwrap().push(intent.clone());
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// Cue played when a chunk runs to completion.
pub trait Feedback: Send + Sync {
    fn chunk_completed(&self, chunk: &TimeChunk);
}

/// Rings the terminal bell on stderr and logs the completion.
#[derive(Debug)]
pub struct TerminalFeedback {
    bell: bool,
}

impl TerminalFeedback {
    pub fn new(bell: bool) -> Self {
        Self {
            bell,
        }
    }

    /// Feedback that only logs.
    pub fn silent() -> Self {
        Self::new(false)
    }

    pub fn is_bell_enabled(&self) -> bool {
        self.bell
    }
}

impl Default for TerminalFeedback {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Feedback for TerminalFeedback {
    fn chunk_completed(&self, chunk: &TimeChunk) {
        tracing::info!("{} complete", chunk.chunk_type.label());
        if self.is_bell_enabled() {
            let mut stderr = std::io::stderr();
            if let Err(e) = stderr.write_all(b"\x07").and_then(|()| stderr.flush()) {
                tracing::debug!("bell failed: {}", e);
            }
        }
    }
}

/// Mock feedback for testing.
#[derive(Debug, Default)]
pub struct MockFeedback {
    completed: Mutex<Vec<TimeChunk>>,
}

impl MockFeedback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.completed.lock().unwrap().len()
    }

    #[must_use]
    pub fn completed(&self) -> Vec<TimeChunk> {
        self.completed.lock().unwrap().clone()
    }
}

impl Feedback for MockFeedback {
    fn chunk_completed(&self, chunk: &TimeChunk) {
        self.completed.lock().unwrap().push(*chunk);
    }
}
