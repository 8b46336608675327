//! Command definitions for the Timerable CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::SettingsParams;

// ============================================================================
// CLI Structure
// ============================================================================

/// Timerable - a subject-based pomodoro timer
#[derive(Parser, Debug)]
#[command(
    name = "timerable",
    version,
    about = "Subject-based pomodoro timer",
    long_about = "Work in chunks: focused work followed by short breaks, with a long\n\
                  break closing each session. A background daemon keeps time; this\n\
                  command talks to it over a Unix socket.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket (defaults to ~/.timerable/timerable.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a new session for a subject
    Start(StartArgs),

    /// Start, pause or resume depending on the current status
    Toggle,

    /// Pause the current session
    Pause,

    /// Resume a paused session
    Resume,

    /// Skip to the next chunk
    Skip,

    /// Discard the current session
    Reset,

    /// Show current timer status
    Status,

    /// List, add or remove subjects
    Subjects {
        #[command(subcommand)]
        action: Option<SubjectsAction>,
    },

    /// Show or change session settings
    Config(ConfigArgs),

    /// Run as daemon (background service)
    #[command(hide = true)]
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Subject management
#[derive(Subcommand, Debug, Clone)]
pub enum SubjectsAction {
    /// Register a new subject
    Add {
        #[arg(value_parser = validate_subject_name)]
        name: String,
    },

    /// Remove a subject
    Remove {
        #[arg(value_parser = validate_subject_name)]
        name: String,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Subject for this session
    #[arg(short, long, value_parser = validate_subject_name)]
    pub subject: String,
}

/// Arguments for the config command. Durations are in minutes.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Work chunks per session (1-12)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub sessions: Option<u32>,

    /// Work duration in minutes (1-120)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub work: Option<u32>,

    /// Short break duration in minutes (1-60)
    #[arg(short = 'b', long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub short_break: Option<u32>,

    /// Long break duration in minutes (1-60)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub long_break: Option<u32>,

    /// Completed work chunks to aim for per day (0-48)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=48))]
    pub daily_goal: Option<u32>,
}

impl ConfigArgs {
    /// Converts to a settings update, minutes to seconds.
    pub fn to_params(&self) -> SettingsParams {
        SettingsParams {
            number_of_sessions: self.sessions,
            work_seconds: self.work.map(minutes),
            short_break_seconds: self.short_break.map(minutes),
            long_break_seconds: self.long_break.map(minutes),
            daily_goal: self.daily_goal,
        }
    }
}

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Subject to register at startup (repeatable)
    #[arg(short, long = "subject", value_name = "NAME")]
    pub subjects: Vec<String>,

    /// Defaults file (defaults to ~/.timerable/defaults.json)
    #[arg(long, value_name = "PATH", conflicts_with = "ephemeral")]
    pub defaults: Option<PathBuf>,

    /// Keep settings and status in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Do not ring the terminal bell when a chunk completes
    #[arg(long)]
    pub no_bell: bool,
}

fn minutes(value: u32) -> u32 {
    value * 60
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates a subject name.
///
/// - Must not be blank
/// - Must not exceed 100 characters
fn validate_subject_name(s: &str) -> Result<String, String> {
    let name = s.trim();
    if name.is_empty() {
        return Err("subject name must not be empty".to_string());
    }
    if name.chars().count() > 100 {
        return Err("subject name must be at most 100 characters".to_string());
    }
    Ok(name.to_string())
}

// ============================================================================
// Tests
// ============================================================================
