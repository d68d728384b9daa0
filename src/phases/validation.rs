//! Input guardrail and question routing.
//!
//! Both checks are pure and run before any collaborator is called.

use crate::config::PolicyConfig;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionCategory {
    Greeting,
    InvalidFormat,
}

impl RejectionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionCategory::Greeting => "GREETING",
            RejectionCategory::InvalidFormat => "INVALID_FORMAT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: String,
    pub category: RejectionCategory,
}

impl Rejection {
    /// User-facing message for a rejected input.
    pub fn user_message(&self) -> String {
        format!(
            "Guardrail Active: {}\n\nPlease provide a full User Story.",
            self.reason
        )
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.category.as_str(), self.reason)
    }
}

/// Rejects greetings and inputs too short to describe a feature.
pub fn validate_input(raw: &str, policy: &PolicyConfig) -> Result<(), Rejection> {
    let cleaned = raw.trim().to_lowercase();

    if policy.greetings.iter().any(|g| g.to_lowercase() == cleaned) {
        return Err(Rejection {
            reason: "Greeting detected. No functional requirement provided.".to_string(),
            category: RejectionCategory::Greeting,
        });
    }

    if cleaned.chars().count() < policy.min_input_chars {
        return Err(Rejection {
            reason: "Input is too short/vague to generate robust tests.".to_string(),
            category: RejectionCategory::InvalidFormat,
        });
    }

    Ok(())
}

/// True when the input asks for information instead of describing a story.
pub fn is_question(raw: &str, policy: &PolicyConfig) -> bool {
    if raw.contains('?') {
        return true;
    }
    let lowered = raw.to_lowercase();
    policy
        .question_phrases
        .iter()
        .any(|phrase| !phrase.is_empty() && lowered.contains(&phrase.to_lowercase()))
}
