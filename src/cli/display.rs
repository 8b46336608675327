//! Display utilities for the Timerable CLI.
//!
//! This module provides formatted output for:
//! - Success messages
//! - Error messages
//! - Status display
//! - Subject lists and settings

use crate::presenter::{format_clock, PrimaryAction, IDLE_TITLE};
use crate::types::{IpcResponse, ResponseData, SessionSettings, TimerStatus};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the message of a state-changing command and the current chunk.
    pub fn show_action(response: &IpcResponse) {
        println!("* {}", response.message);
        if let Some(data) = &response.data {
            if let Some(line) = Self::chunk_line(data) {
                println!("  {}", line);
            }
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        for line in Self::status_lines(response) {
            println!("{}", line);
        }
    }

    /// Shows the known subjects.
    pub fn show_subjects(response: &IpcResponse) {
        if !response.message.is_empty() {
            println!("* {}", response.message);
        }
        let subjects = response
            .data
            .as_ref()
            .and_then(|d| d.subjects.as_deref())
            .unwrap_or_default();
        if subjects.is_empty() {
            println!("No subjects yet. Add one with 'timerable subjects add NAME'.");
            return;
        }
        for name in subjects {
            println!("  - {}", name);
        }
    }

    /// Shows the stored settings.
    pub fn show_settings(response: &IpcResponse) {
        if !response.message.is_empty() {
            println!("* {}", response.message);
        }
        if let Some(settings) = response.data.as_ref().and_then(|d| d.settings) {
            for line in Self::settings_lines(&settings) {
                println!("  {}", line);
            }
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn status_lines(response: &IpcResponse) -> Vec<String> {
        let Some(data) = &response.data else {
            return vec!["The timer is not running".to_string()];
        };

        let status = match data.state.as_deref() {
            Some("timing") => TimerStatus::Timing,
            Some("paused") => TimerStatus::Paused,
            _ => TimerStatus::Ready,
        };
        let title = match (&data.subject, status.is_in_session()) {
            (Some(subject), true) => subject.as_str(),
            _ => IDLE_TITLE,
        };

        let mut lines = vec![
            title.to_string(),
            "─────────────────────────────".to_string(),
            format!("Status: {}", status),
        ];
        if let Some(line) = Self::chunk_line(data) {
            lines.push(line);
        }
        if let (Some(count), Some(target)) = (data.session_count, data.session_target) {
            lines.push(format!("Session: {}/{}", count, target));
        }
        if let (Some(count), Some(target)) = (data.daily_count, data.daily_target) {
            lines.push(format!("Today: {}/{}", count, target));
        }
        lines.push(format!(
            "Next: {}",
            PrimaryAction::for_status(status).label()
        ));
        lines
    }

    /// "Work 24:59 / 25:00"
    fn chunk_line(data: &ResponseData) -> Option<String> {
        let chunk = data.chunk.as_deref()?;
        let remaining = data.remaining_seconds?;
        Some(match data.duration_seconds {
            Some(duration) => format!(
                "{} {} / {}",
                chunk,
                format_clock(remaining),
                format_clock(duration)
            ),
            None => format!("{} {}", chunk, format_clock(remaining)),
        })
    }

    fn settings_lines(settings: &SessionSettings) -> Vec<String> {
        vec![
            format!("Sessions:    {}", settings.number_of_sessions),
            format!("Work:        {} min", settings.work_seconds / 60),
            format!("Short break: {} min", settings.short_break_seconds / 60),
            format!("Long break:  {} min", settings.long_break_seconds / 60),
            format!("Daily goal:  {}", settings.daily_goal),
        ]
    }
}

// ============================================================================
// Tests
// ============================================================================
