//! Core data types for Timerable.
//!
//! This module defines the data structures used for:
//! - Timer status and time chunks
//! - Session settings with validation
//! - Subjects and daily goal snapshots
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::presenter::ViewState;

// ============================================================================
// TimerStatus
// ============================================================================

/// Represents the current status of the session timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// No session is counting down
    #[default]
    Ready,
    /// A chunk is actively counting down
    Timing,
    /// A session exists but ticking is suspended
    Paused,
}

impl TimerStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Ready => "ready",
            TimerStatus::Timing => "timing",
            TimerStatus::Paused => "paused",
        }
    }

    /// Returns true if a session is in progress (timing or paused).
    pub fn is_in_session(&self) -> bool {
        matches!(self, TimerStatus::Timing | TimerStatus::Paused)
    }
}

impl std::fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ChunkType / TimeChunk
// ============================================================================

/// The kind of interval a chunk represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    /// Focused work
    Work,
    /// Break between two work chunks
    ShortBreak,
    /// Break that closes the session
    LongBreak,
}

impl ChunkType {
    /// Returns the string representation of the chunk type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Work => "work",
            ChunkType::ShortBreak => "short_break",
            ChunkType::LongBreak => "long_break",
        }
    }

    /// Returns the human-readable label shown next to the countdown.
    pub fn label(&self) -> &'static str {
        match self {
            ChunkType::Work => "Work",
            ChunkType::ShortBreak => "Short Break",
            ChunkType::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, ChunkType::Work)
    }
}

/// One scheduled interval of a session.
///
/// `duration` is fixed when the session is built. `elapsed` only grows
/// through [`TimeChunk::advance`], which the engine calls once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeChunk {
    /// Kind of interval
    #[serde(rename = "type")]
    pub chunk_type: ChunkType,
    /// Length of the chunk in seconds
    pub duration: u32,
    /// Seconds already counted down
    pub elapsed: u32,
}

impl TimeChunk {
    /// Creates a fresh chunk with nothing elapsed.
    pub fn new(chunk_type: ChunkType, duration: u32) -> Self {
        Self {
            chunk_type,
            duration,
            elapsed: 0,
        }
    }

    /// Seconds left before the chunk completes.
    pub fn remaining(&self) -> u32 {
        self.duration.saturating_sub(self.elapsed)
    }

    /// Fraction of the chunk already elapsed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.duration == 0 {
            return 1.0;
        }
        f64::from(self.elapsed) / f64::from(self.duration)
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Counts one second. Never moves past `duration`.
    ///
    /// Returns true if this call completed the chunk.
    pub(crate) fn advance(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.elapsed += 1;
        self.is_complete()
    }
}

// ============================================================================
// SessionSettings
// ============================================================================

/// Settings a session schedule is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Number of work chunks per session
    pub number_of_sessions: u32,
    /// Work chunk length in seconds
    pub work_seconds: u32,
    /// Short break length in seconds
    pub short_break_seconds: u32,
    /// Long break length in seconds (closes the session)
    pub long_break_seconds: u32,
    /// Target number of completed work chunks per day
    pub daily_goal: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            number_of_sessions: 4,
            work_seconds: 25 * 60,
            short_break_seconds: 5 * 60,
            long_break_seconds: 15 * 60,
            daily_goal: 8,
        }
    }
}

impl SessionSettings {
    /// Sets the number of work chunks per session.
    pub fn with_number_of_sessions(mut self, sessions: u32) -> Self {
        self.number_of_sessions = sessions;
        self
    }

    /// Sets the work chunk length in seconds.
    pub fn with_work_seconds(mut self, seconds: u32) -> Self {
        self.work_seconds = seconds;
        self
    }

    /// Sets the short break length in seconds.
    pub fn with_short_break_seconds(mut self, seconds: u32) -> Self {
        self.short_break_seconds = seconds;
        self
    }

    /// Sets the long break length in seconds.
    pub fn with_long_break_seconds(mut self, seconds: u32) -> Self {
        self.long_break_seconds = seconds;
        self
    }

    /// Sets the daily goal.
    pub fn with_daily_goal(mut self, goal: u32) -> Self {
        self.daily_goal = goal;
        self
    }

    /// Validates the settings.
    ///
    /// Returns an error message if a session could not be built from them.
    pub fn validate(&self) -> Result<(), String> {
        if self.number_of_sessions == 0 {
            return Err("a session needs at least one work chunk".to_string());
        }
        if self.work_seconds == 0 {
            return Err("work duration must be positive".to_string());
        }
        if self.short_break_seconds == 0 {
            return Err("short break duration must be positive".to_string());
        }
        if self.long_break_seconds == 0 {
            return Err("long break duration must be positive".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Subject / DailyGoal
// ============================================================================

/// Something a session is dedicated to ("Math", "Thesis", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
}

impl Subject {
    /// Creates a subject with a fresh identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Completed work chunks for the current day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGoal {
    pub sessions_completed: u32,
}

// ============================================================================
// IPC Types
// ============================================================================

/// Partial settings update sent with the configure command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_sessions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_break_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_break_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_goal: Option<u32>,
}

impl SettingsParams {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the set fields on top of `base`.
    pub fn apply_to(&self, base: SessionSettings) -> SessionSettings {
        SessionSettings {
            number_of_sessions: self.number_of_sessions.unwrap_or(base.number_of_sessions),
            work_seconds: self.work_seconds.unwrap_or(base.work_seconds),
            short_break_seconds: self.short_break_seconds.unwrap_or(base.short_break_seconds),
            long_break_seconds: self.long_break_seconds.unwrap_or(base.long_break_seconds),
            daily_goal: self.daily_goal.unwrap_or(base.daily_goal),
        }
    }
}

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start a session for the given subject
    Start {
        subject: String,
    },
    /// Start/pause/resume depending on the current status
    Toggle,
    /// Pause the current session
    Pause,
    /// Resume the paused session
    Resume,
    /// Skip to the next chunk
    Skip,
    /// Discard the current session
    Reset,
    /// Query the current status
    Status,
    /// List known subjects
    Subjects,
    /// Register a new subject
    AddSubject {
        name: String,
    },
    /// Remove a subject
    RemoveSubject {
        name: String,
    },
    /// Update session settings
    Configure {
        #[serde(flatten)]
        params: SettingsParams,
    },
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// Current timer status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Subject bound to the running session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Label of the current chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,
    /// Seconds left in the current chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    /// Length of the current chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_target: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_target: Option<u32>,
    /// Actions available in the current status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    /// Known subject names (subject listing and selection prompts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,
    /// Stored settings (configure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<SessionSettings>,
}

impl ResponseData {
    /// Creates response data from the derived view state.
    pub fn from_view_state(view: &ViewState) -> Self {
        Self {
            state: Some(view.status.as_str().to_string()),
            subject: view.subject.clone(),
            chunk: view.chunk.map(|c| c.chunk_type.label().to_string()),
            remaining_seconds: view.chunk.map(|c| c.remaining()),
            duration_seconds: view.chunk.map(|c| c.duration),
            session_count: Some(view.session_goal.current),
            session_target: Some(view.session_goal.target),
            daily_count: Some(view.daily_goal.current),
            daily_target: Some(view.daily_goal.target),
            actions: Some(
                view.available_actions()
                    .iter()
                    .map(|a| a.as_str().to_string())
                    .collect(),
            ),
            subjects: None,
            settings: None,
        }
    }

    /// Adds the stored settings.
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Creates response data that only lists subject names.
    pub fn from_subjects(subjects: &[Subject]) -> Self {
        Self {
            subjects: Some(subjects.iter().map(|s| s.name.clone()).collect()),
            ..Self::default()
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Attaches data, e.g. the candidates to an error asking for a choice.
    pub fn with_data(mut self, data: ResponseData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerStatus Tests
    // ------------------------------------------------------------------------

    mod timer_status_tests {
        use super::*;

        #[test]
        fn test_default_is_ready() {
            assert_eq!(TimerStatus::default(), TimerStatus::Ready);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(TimerStatus::Ready.as_str(), "ready");
            assert_eq!(TimerStatus::Timing.as_str(), "timing");
            assert_eq!(TimerStatus::Paused.as_str(), "paused");
        }

        #[test]
        fn test_is_in_session() {
            assert!(!TimerStatus::Ready.is_in_session());
            assert!(TimerStatus::Timing.is_in_session());
            assert!(TimerStatus::Paused.is_in_session());
        }

        #[test]
        fn test_serialize_deserialize() {
            let json = serde_json::to_string(&TimerStatus::Paused).unwrap();
            assert_eq!(json, "\"paused\"");

            let status: TimerStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, TimerStatus::Paused);
        }
    }

    // ------------------------------------------------------------------------
    // TimeChunk Tests
    // ------------------------------------------------------------------------

    mod time_chunk_tests {
        use super::*;

        #[test]
        fn test_new_chunk_has_nothing_elapsed() {
            let chunk = TimeChunk::new(ChunkType::Work, 1500);
            assert_eq!(chunk.elapsed, 0);
            assert_eq!(chunk.remaining(), 1500);
            assert!(!chunk.is_complete());
        }

        #[test]
        fn test_advance_completes_at_duration() {
            let mut chunk = TimeChunk::new(ChunkType::ShortBreak, 2);
            assert!(!chunk.advance());
            assert!(chunk.advance());
            assert!(chunk.is_complete());
            assert_eq!(chunk.remaining(), 0);
        }

        #[test]
        fn test_advance_never_exceeds_duration() {
            let mut chunk = TimeChunk::new(ChunkType::Work, 1);
            chunk.advance();
            assert!(!chunk.advance());
            assert_eq!(chunk.elapsed, 1);
        }

        #[test]
        fn test_progress() {
            let mut chunk = TimeChunk::new(ChunkType::Work, 4);
            chunk.advance();
            assert!((chunk.progress() - 0.25).abs() < f64::EPSILON);
        }

        #[test]
        fn test_labels() {
            assert_eq!(ChunkType::Work.label(), "Work");
            assert_eq!(ChunkType::ShortBreak.label(), "Short Break");
            assert_eq!(ChunkType::LongBreak.label(), "Long Break");
            assert!(ChunkType::LongBreak.is_break());
            assert!(!ChunkType::Work.is_break());
        }

        #[test]
        fn test_serialize_uses_type_key() {
            let chunk = TimeChunk::new(ChunkType::LongBreak, 900);
            let json = serde_json::to_string(&chunk).unwrap();
            assert!(json.contains("\"type\":\"long_break\""));
        }
    }

    // ------------------------------------------------------------------------
    // SessionSettings Tests
    // ------------------------------------------------------------------------

    mod session_settings_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let settings = SessionSettings::default();
            assert_eq!(settings.number_of_sessions, 4);
            assert_eq!(settings.work_seconds, 1500);
            assert_eq!(settings.short_break_seconds, 300);
            assert_eq!(settings.long_break_seconds, 900);
            assert_eq!(settings.daily_goal, 8);
        }

        #[test]
        fn test_builder_pattern() {
            let settings = SessionSettings::default()
                .with_number_of_sessions(2)
                .with_work_seconds(60)
                .with_short_break_seconds(10)
                .with_long_break_seconds(20)
                .with_daily_goal(3);

            assert_eq!(settings.number_of_sessions, 2);
            assert_eq!(settings.work_seconds, 60);
            assert_eq!(settings.short_break_seconds, 10);
            assert_eq!(settings.long_break_seconds, 20);
            assert_eq!(settings.daily_goal, 3);
        }

        #[test]
        fn test_validate_success() {
            assert!(SessionSettings::default().validate().is_ok());
        }

        #[test]
        fn test_validate_zero_sessions() {
            let settings = SessionSettings::default().with_number_of_sessions(0);
            assert!(settings.validate().is_err());
        }

        #[test]
        fn test_validate_zero_durations() {
            assert!(SessionSettings::default()
                .with_work_seconds(0)
                .validate()
                .is_err());
            assert!(SessionSettings::default()
                .with_short_break_seconds(0)
                .validate()
                .is_err());
            assert!(SessionSettings::default()
                .with_long_break_seconds(0)
                .validate()
                .is_err());
        }

        #[test]
        fn test_zero_daily_goal_is_allowed() {
            assert!(SessionSettings::default()
                .with_daily_goal(0)
                .validate()
                .is_ok());
        }

        #[test]
        fn test_deserialize_fills_missing_fields() {
            let settings: SessionSettings =
                serde_json::from_str(r#"{"number_of_sessions":2}"#).unwrap();
            assert_eq!(settings.number_of_sessions, 2);
            assert_eq!(settings.work_seconds, 1500);
        }
    }

    // ------------------------------------------------------------------------
    // IPC Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_start_request_serialize() {
            let request = IpcRequest::Start {
                subject: "Math".to_string(),
            };
            let json = serde_json::to_string(&request).unwrap();
            assert_eq!(json, r#"{"command":"start","subject":"Math"}"#);
        }

        #[test]
        fn test_unit_requests_serialize() {
            for (request, expected) in [
                (IpcRequest::Toggle, "toggle"),
                (IpcRequest::Pause, "pause"),
                (IpcRequest::Resume, "resume"),
                (IpcRequest::Skip, "skip"),
                (IpcRequest::Reset, "reset"),
                (IpcRequest::Status, "status"),
                (IpcRequest::Subjects, "subjects"),
            ] {
                let json = serde_json::to_string(&request).unwrap();
                assert_eq!(json, format!(r#"{{"command":"{}"}}"#, expected));
            }
        }

        #[test]
        fn test_add_subject_deserialize() {
            let request: IpcRequest =
                serde_json::from_str(r#"{"command":"addsubject","name":"Physics"}"#).unwrap();
            match request {
                IpcRequest::AddSubject { name } => assert_eq!(name, "Physics"),
                other => panic!("Expected AddSubject, got {:?}", other),
            }
        }

        #[test]
        fn test_remove_subject_serialize() {
            let request = IpcRequest::RemoveSubject {
                name: "Physics".to_string(),
            };
            assert_eq!(
                serde_json::to_string(&request).unwrap(),
                r#"{"command":"removesubject","name":"Physics"}"#
            );
        }

        #[test]
        fn test_configure_flattens_params() {
            let request: IpcRequest =
                serde_json::from_str(r#"{"command":"configure","workSeconds":600}"#).unwrap();
            match request {
                IpcRequest::Configure { params } => {
                    assert_eq!(params.work_seconds, Some(600));
                    assert_eq!(params.number_of_sessions, None);
                }
                other => panic!("Expected Configure, got {:?}", other),
            }
        }

        #[test]
        fn test_settings_params_apply_to() {
            let params = SettingsParams {
                number_of_sessions: Some(2),
                daily_goal: Some(5),
                ..SettingsParams::default()
            };
            let settings = params.apply_to(SessionSettings::default());
            assert_eq!(settings.number_of_sessions, 2);
            assert_eq!(settings.daily_goal, 5);
            assert_eq!(settings.work_seconds, 1500);
            assert!(!params.is_empty());
            assert!(SettingsParams::default().is_empty());
        }

        #[test]
        fn test_response_data_from_subjects() {
            let subjects = vec![Subject::new("Math"), Subject::new("Art")];
            let data = ResponseData::from_subjects(&subjects);
            assert_eq!(
                data.subjects,
                Some(vec!["Math".to_string(), "Art".to_string()])
            );
            assert_eq!(data.state, None);
        }

        #[test]
        fn test_ipc_response_success_and_error() {
            let ok = IpcResponse::success("done", None);
            assert!(ok.is_success());
            let err = IpcResponse::error("nope");
            assert!(!err.is_success());
            assert_eq!(err.message, "nope");
        }

        #[test]
        fn test_ipc_response_skips_empty_data() {
            let json = serde_json::to_string(&IpcResponse::success("ok", None)).unwrap();
            assert!(!json.contains("data"));
        }
    }
}
