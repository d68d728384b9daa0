//! Error types for the workflow domain.

use std::fmt::{Display, Formatter};

/// Errors raised by the workflow state machine and its agents.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// Invalid phase transition attempted.
    InvalidTransition { from: String, to: String },
    /// An agent was invoked without its required inputs.
    MissingInput { agent: &'static str, what: &'static str },
    /// Writing the output artifact failed.
    StorageFailure { message: String },
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, to } => {
                write!(f, "invalid transition: {} -> {}", from, to)
            }
            Self::MissingInput { agent, what } => write!(f, "{} is missing {}", agent, what),
            Self::StorageFailure { message } => write!(f, "storage failure: {}", message),
        }
    }
}

impl std::error::Error for WorkflowError {}
