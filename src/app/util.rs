use crate::domain::{OutcomeStatus, WorkflowOutcome};

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Human-readable rendering of an outcome for the terminal.
pub fn render_outcome(outcome: &WorkflowOutcome) -> String {
    let mut rendered = match outcome.status {
        OutcomeStatus::Success => outcome.message.clone(),
        OutcomeStatus::Rejected => format!("Rejected: {}", outcome.message),
    };
    if let Some(ref preview) = outcome.preview {
        rendered.push_str("\n\n--- PREVIEW ---\n");
        rendered.push_str(preview.trim_end());
    }
    rendered
}

#[cfg(test)]
#[path = "tests/util_tests.rs"]
mod tests;
