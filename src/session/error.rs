use crate::schema::SchemaError;
use std::fmt;
use thiserror::Error;

/// Whether a session was inside an edit when a call was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    NotEditing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Editing => f.write_str("being edited"),
            SessionState::NotEditing => f.write_str("not being edited"),
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{type_name} is {state}; cannot {operation}")]
    InvalidState {
        type_name: String,
        operation: &'static str,
        state: SessionState,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl EditError {
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, EditError::InvalidState { .. })
    }
}
