//! Splits the Manager's structured parse output into context and scenarios.

use crate::domain::fallback::GENERAL_CONTEXT;
use crate::domain::{Context, Scenario};

pub const CONTEXT_MARKER: &str = "--- CONTEXT ---";
pub const TASKS_MARKER: &str = "--- TASKS ---";

/// Parsed shape of a user story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub context: Context,
    pub scenarios: Vec<Scenario>,
    /// False when the response had no task marker and the raw input was split instead.
    pub structured: bool,
}

/// Interprets the generation output for `raw_input`.
///
/// With a task marker, text before it (minus the context label) is the
/// context and each non-blank line after it is a scenario. Without one,
/// every non-blank line of the raw input becomes a scenario. Anything after
/// a repeated task marker is ignored.
pub fn parse_structured_response(response: &str, raw_input: &str) -> ParsedInput {
    match response.split_once(TASKS_MARKER) {
        Some((head, tail)) => ParsedInput {
            context: Context(head.replace(CONTEXT_MARKER, "").trim().to_string()),
            scenarios: non_blank_lines(tail.split(TASKS_MARKER).next().unwrap_or_default()),
            structured: true,
        },
        None => ParsedInput {
            context: Context::from(GENERAL_CONTEXT),
            scenarios: non_blank_lines(raw_input),
            structured: false,
        },
    }
}

/// Non-blank trimmed lines, in order.
pub fn non_blank_lines(text: &str) -> Vec<Scenario> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Scenario::from)
        .collect()
}
