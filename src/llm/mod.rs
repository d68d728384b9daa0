//! Text generation seam shared by every agent.
//!
//! Agents only see [`TextGenerator`]; the HTTP client lives in [`ollama`].

pub mod ollama;
pub mod prompt;

pub use prompt::PromptRequest;

use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// The agent a generation request is made on behalf of.
///
/// Each role may be served by a different model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Manager,
    Archivist,
    Author,
    Auditor,
    Scribe,
}

impl AgentRole {
    pub const ALL: [AgentRole; 5] = [
        AgentRole::Manager,
        AgentRole::Archivist,
        AgentRole::Author,
        AgentRole::Auditor,
        AgentRole::Scribe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Manager => "manager",
            AgentRole::Archivist => "archivist",
            AgentRole::Author => "author",
            AgentRole::Auditor => "auditor",
            AgentRole::Scribe => "scribe",
        }
    }
}

impl Display for AgentRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors returned by a generation service.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The call did not finish before its deadline.
    Timeout,
    /// The service answered with a non-success HTTP status.
    Status(u16),
    /// Connection or IO failure.
    Transport(String),
    /// The response body was not in the expected shape.
    InvalidResponse(String),
    /// The service answered with no text.
    EmptyOutput,
}

impl Display for GenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "generation timed out"),
            Self::Status(code) => write!(f, "generation service returned HTTP {}", code),
            Self::Transport(message) => write!(f, "generation transport error: {}", message),
            Self::InvalidResponse(message) => {
                write!(f, "invalid generation response: {}", message)
            }
            Self::EmptyOutput => write!(f, "generation service returned empty output"),
        }
    }
}

impl std::error::Error for GenerationError {}

/// A service that turns a filled prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, role: AgentRole, request: PromptRequest)
        -> Result<String, GenerationError>;
}

/// Runs a generation call under a deadline. Expiry maps to [`GenerationError::Timeout`].
pub async fn generate_with_deadline(
    generator: &dyn TextGenerator,
    role: AgentRole,
    request: PromptRequest,
    deadline: Duration,
) -> Result<String, GenerationError> {
    match tokio::time::timeout(deadline, generator.generate(role, request)).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout),
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
