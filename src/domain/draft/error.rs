use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::access_key::FieldErrors;
use crate::domain::DomainError;

/// Lifecycle of an editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No draft yet
    Uninitialized,
    /// Draft accepts field changes
    Editing,
    /// A request is in flight; the draft is frozen
    Submitting,
    /// The persistence layer accepted the request
    Submitted,
    /// The draft was dropped without submitting
    Discarded,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
            Self::Discarded => "discarded",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the draft controller
#[derive(Debug, Error)]
pub enum DraftError {
    /// One or more fields are invalid; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The persistence layer rejected the request, passed through unchanged
    #[error(transparent)]
    Collaborator(#[from] DomainError),

    /// The operation is not allowed in the current state (a caller bug)
    #[error("Cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

impl DraftError {
    pub fn invalid_state(operation: &'static str, state: SessionState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Field errors, if this is a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
