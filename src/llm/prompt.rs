//! Prompt requests sent to the generation service.
//!
//! The Ollama generate endpoint takes the system prompt as its own field;
//! backends without one get it merged into the user prompt.

/// Represents a prompt request before backend-specific preparation.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    /// The main user prompt
    pub user_prompt: String,
    /// Optional system prompt to guide the model
    pub system_prompt: Option<String>,
}

impl PromptRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Single-string form for backends without a system prompt field.
    pub fn merged(&self) -> String {
        match &self.system_prompt {
            Some(sys) => format!(
                "<system-context>\n{}\n</system-context>\n\n{}",
                sys, self.user_prompt
            ),
            None => self.user_prompt.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/prompt_tests.rs"]
mod tests;
