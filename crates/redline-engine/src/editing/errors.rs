use thiserror::Error;

use crate::models::EditStatus;

/// Why a single edit request was not applied.
///
/// None of these abort a run: the orchestrator records them in the log and
/// moves on to the next request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Invalid edit request: {0}")]
    InvalidRequest(String),

    #[error("Contextual text not found in document")]
    NotFound,

    #[error("Contextual text occurs {occurrences} times in document")]
    Ambiguous { occurrences: usize },

    #[error("Specific text not found within contextual text: {0}")]
    OutOfContext(String),

    #[error("Structural failure: {0}")]
    StructuralFailure(String),
}

impl EditError {
    /// Log status this error maps to
    pub fn status(&self) -> EditStatus {
        match self {
            EditError::NotFound => EditStatus::SkippedNotFound,
            EditError::Ambiguous { .. } => EditStatus::SkippedAmbiguous,
            EditError::OutOfContext(_) => EditStatus::SkippedOutOfContext,
            EditError::InvalidRequest(_) | EditError::StructuralFailure(_) => EditStatus::Failed,
        }
    }

    pub(crate) fn structural(message: impl Into<String>) -> Self {
        EditError::StructuralFailure(message.into())
    }
}
