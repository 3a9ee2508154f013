use thiserror::Error;

/// Rejections raised by ledger operations.
///
/// Each variant names the field or goal that triggered it. A rejected
/// operation never changes the owner's collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GoalError {
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("A goal named '{0}' already exists")]
    DuplicateName(String),

    #[error("Goal '{0}' not found")]
    NotFound(String),

    /// Informational: the goal had already reached its target, nothing changed.
    #[error("Goal '{0}' is already complete")]
    AlreadyComplete(String),
}

impl GoalError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GoalError::InvalidInput { .. } => "INVALID_INPUT",
            GoalError::DuplicateName(_) => "DUPLICATE_NAME",
            GoalError::NotFound(_) => "NOT_FOUND",
            GoalError::AlreadyComplete(_) => "ALREADY_COMPLETE",
        }
    }
}
