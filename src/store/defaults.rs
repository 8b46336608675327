//! Defaults store implementations.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::types::{SessionSettings, TimerStatus};

use super::{DefaultsStore, StoreError};

/// Default location of the defaults file, relative to the home directory.
const DEFAULTS_FILE: &str = ".timerable/defaults.json";

/// Returns `~/.timerable/defaults.json`.
///
/// # Errors
///
/// Returns [`StoreError::HomeDirNotFound`] if there is no home directory.
pub fn default_defaults_path() -> Result<PathBuf, StoreError> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULTS_FILE))
        .ok_or(StoreError::HomeDirNotFound)
}

/// Every value the defaults store keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub timer_status: TimerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub settings: SessionSettings,
}

// ============================================================================
// JsonDefaultsStore
// ============================================================================

/// Defaults persisted as a JSON file, rewritten on every change.
#[derive(Debug)]
pub struct JsonDefaultsStore {
    path: PathBuf,
    data: Defaults,
}

impl JsonDefaultsStore {
    /// Opens the store at `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            tracing::debug!("no defaults file at {:?}, using defaults", path);
            Defaults::default()
        };

        Ok(Self { path, data })
    }

    /// Opens the store at [`default_defaults_path`].
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is unknown or the file is
    /// unreadable.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(default_defaults_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &Defaults {
        &self.data
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;

        // Rename is atomic on the same filesystem
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DefaultsStore for JsonDefaultsStore {
    fn timer_status(&self) -> TimerStatus {
        self.data.timer_status
    }

    fn set_timer_status(&mut self, status: TimerStatus) -> Result<(), StoreError> {
        self.data.timer_status = status;
        self.save()
    }

    fn subject(&self) -> Option<String> {
        self.data.subject.clone()
    }

    fn set_subject(&mut self, subject: Option<&str>) -> Result<(), StoreError> {
        self.data.subject = subject.map(str::to_string);
        self.save()
    }

    fn settings(&self) -> SessionSettings {
        self.data.settings
    }

    fn set_settings(&mut self, settings: SessionSettings) -> Result<(), StoreError> {
        self.data.settings = settings;
        self.save()
    }
}

// ============================================================================
// MemoryDefaultsStore
// ============================================================================

/// In-memory defaults. Clones share the same values.
#[derive(Debug, Clone, Default)]
pub struct MemoryDefaultsStore {
    data: Arc<Mutex<Defaults>>,
}

impl MemoryDefaultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `settings`.
    pub fn with_settings(settings: SessionSettings) -> Self {
        Self::from_defaults(Defaults {
            settings,
            ..Defaults::default()
        })
    }

    pub fn from_defaults(defaults: Defaults) -> Self {
        Self {
            data: Arc::new(Mutex::new(defaults)),
        }
    }

    /// Copy of the stored values.
    pub fn snapshot(&self) -> Defaults {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Defaults> {
        // Defaults stay consistent even if a holder panicked
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DefaultsStore for MemoryDefaultsStore {
    fn timer_status(&self) -> TimerStatus {
        self.lock().timer_status
    }

    fn set_timer_status(&mut self, status: TimerStatus) -> Result<(), StoreError> {
        self.lock().timer_status = status;
        Ok(())
    }

    fn subject(&self) -> Option<String> {
        self.lock().subject.clone()
    }

    fn set_subject(&mut self, subject: Option<&str>) -> Result<(), StoreError> {
        self.lock().subject = subject.map(str::to_string);
        Ok(())
    }

    fn settings(&self) -> SessionSettings {
        self.lock().settings
    }

    fn set_settings(&mut self, settings: SessionSettings) -> Result<(), StoreError> {
        self.lock().settings = settings;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
