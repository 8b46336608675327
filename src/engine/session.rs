//! Session schedule.
//!
//! A [`Session`] is the ordered list of chunks for one full timer cycle.
//! It is built once from [`SessionSettings`] and then only consumed:
//! the active index moves forward until the schedule is exhausted.

use crate::types::{ChunkType, SessionSettings, TimeChunk};

use super::error::EngineError;

/// Ordered, non-empty sequence of chunks plus the index of the active one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    chunks: Vec<TimeChunk>,
    index: usize,
}

impl Session {
    /// Builds the schedule for `settings`.
    ///
    /// Every work chunk is followed by a short break, except the last one,
    /// which is followed by the long break.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if the settings have no
    /// work chunk or a zero duration.
    pub fn build(settings: &SessionSettings) -> Result<Self, EngineError> {
        settings
            .validate()
            .map_err(EngineError::InvalidConfiguration)?;

        let count = settings.number_of_sessions as usize;
        let mut chunks = Vec::with_capacity(count * 2);
        for i in 0..count {
            chunks.push(TimeChunk::new(ChunkType::Work, settings.work_seconds));
            if i + 1 < count {
                chunks.push(TimeChunk::new(
                    ChunkType::ShortBreak,
                    settings.short_break_seconds,
                ));
            } else {
                chunks.push(TimeChunk::new(
                    ChunkType::LongBreak,
                    settings.long_break_seconds,
                ));
            }
        }

        Ok(Self { chunks, index: 0 })
    }

    /// Total number of chunks in the schedule.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Never true for a built session.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Index of the active chunk. Equals `len()` once exhausted.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn chunks(&self) -> &[TimeChunk] {
        &self.chunks
    }

    pub fn current(&self) -> Option<&TimeChunk> {
        self.chunks.get(self.index)
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut TimeChunk> {
        self.chunks.get_mut(self.index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.chunks.len()
    }

    /// Moves to the next chunk.
    ///
    /// Returns the new active chunk, or `None` if the schedule is now
    /// exhausted.
    pub(crate) fn advance(&mut self) -> Option<&TimeChunk> {
        if !self.is_exhausted() {
            self.index += 1;
        }
        self.chunks.get(self.index)
    }

    /// Number of work chunks the session was built with.
    pub fn work_chunks(&self) -> u32 {
        self.chunks
            .iter()
            .filter(|c| c.chunk_type == ChunkType::Work)
            .count() as u32
    }

    /// Work chunks not yet finished, the active one included.
    pub fn remaining_work_chunks(&self) -> u32 {
        self.chunks
            .iter()
            .skip(self.index)
            .filter(|c| c.chunk_type == ChunkType::Work)
            .count() as u32
    }
}
