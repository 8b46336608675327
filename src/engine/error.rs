//! Session engine error types.
//!
//! Every rejected operation is reported to the caller as one of these.
//! The engine never retries and never coerces its state to make an
//! illegal operation succeed.

use thiserror::Error;

use crate::types::TimerStatus;

/// Errors returned by [`SessionEngine`](super::SessionEngine) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The operation is not legal from the current status.
    #[error("cannot {operation} while {status}")]
    InvalidStateTransition {
        /// Name of the rejected operation
        operation: &'static str,
        /// Status at the time of the call
        status: TimerStatus,
    },

    /// A session cannot be built from the configured settings.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// There is no chunk to query or skip.
    #[error("no session is in progress")]
    NoActiveChunk,
}

impl EngineError {
    pub(crate) fn transition(operation: &'static str, status: TimerStatus) -> Self {
        Self::InvalidStateTransition { operation, status }
    }

    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidStateTransition { .. })
    }

    #[must_use]
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }

    #[must_use]
    pub fn is_no_active_chunk(&self) -> bool {
        matches!(self, Self::NoActiveChunk)
    }
}
