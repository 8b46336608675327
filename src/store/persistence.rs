//! In-memory subjects and daily completions.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use crate::types::{DailyGoal, Subject};

use super::{Persistence, SessionRecorder, StoreError};

/// The user's calendar date, in the local time zone.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Debug)]
struct Inner {
    subjects: Vec<Subject>,
    day: NaiveDate,
    completed: u32,
}

/// Subjects and today's completion count, kept in memory.
///
/// The count resets when the date returned by the clock changes, i.e. at
/// local midnight.
#[derive(Debug)]
pub struct MemoryPersistence {
    inner: RwLock<Inner>,
    clock: fn() -> NaiveDate,
}

impl Default for MemoryPersistence {
    fn default() -> Self {
        Self::with_clock(today)
    }
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose notion of "today" comes from `clock`.
    pub fn with_clock(clock: fn() -> NaiveDate) -> Self {
        Self {
            inner: RwLock::new(Inner {
                subjects: Vec::new(),
                day: clock(),
                completed: 0,
            }),
            clock,
        }
    }

    /// Creates a store seeded with subjects, skipping blanks and duplicates.
    pub fn with_subjects<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let store = Self::new();
        for name in names {
            if let Err(e) = store.add_subject(name.as_ref()) {
                tracing::warn!("skipping subject: {}", e);
            }
        }
        store
    }

    /// Registers a subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or already taken
    /// (case-insensitive).
    pub fn add_subject(&self, name: &str) -> Result<Subject, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptySubjectName);
        }

        let mut inner = self.write();
        if inner
            .subjects
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(name))
        {
            return Err(StoreError::DuplicateSubject(name.to_string()));
        }

        let subject = Subject::new(name);
        inner.subjects.push(subject.clone());
        Ok(subject)
    }

    /// Removes a subject, matching the name case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSubject`] if no subject matches.
    pub fn remove_subject(&self, name: &str) -> Result<Subject, StoreError> {
        let name = name.trim();
        let mut inner = self.write();
        let index = inner
            .subjects
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| StoreError::UnknownSubject(name.to_string()))?;
        Ok(inner.subjects.remove(index))
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Persistence for MemoryPersistence {
    fn fetch_all_subjects(&self) -> Vec<Subject> {
        self.read().subjects.clone()
    }

    fn fetch_daily_goal(&self) -> DailyGoal {
        let inner = self.read();
        if inner.day != (self.clock)() {
            return DailyGoal::default();
        }
        DailyGoal {
            sessions_completed: inner.completed,
        }
    }
}

impl SessionRecorder for MemoryPersistence {
    fn record_completed_session(&self, subject: Option<&str>) {
        let today = (self.clock)();
        let mut inner = self.write();
        if inner.day != today {
            inner.day = today;
            inner.completed = 0;
        }
        inner.completed += 1;
        tracing::debug!(
            subject = subject.unwrap_or("-"),
            completed = inner.completed,
            "recorded completed work chunk"
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
