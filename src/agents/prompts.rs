//! Prompt templates for every agent role.

use crate::domain::{Context, Draft, Scenario, Task};
use crate::llm::PromptRequest;

const PARSER_SYSTEM: &str = "You are the QA Manager. Parse the user input into structured data.";

const PARSER_INSTRUCTIONS: &str = r#"INSTRUCTIONS:
1. Identify the Context (Feature, Description, Acceptance Criteria).
2. Identify the list of Scenarios.
   - Tolerate typos such as "Senerios".
   - Ignore empty lines and whitespace.
   - Extract only the actual scenario text lines.
   - Do not summarize. If there are 19 scenarios, list all 19.

OUTPUT FORMAT STRICTLY:
--- CONTEXT ---
(Context text here)
--- TASKS ---
(Scenario 1)
(Scenario 2)
..."#;

pub fn parser_prompt(input: &str) -> PromptRequest {
    PromptRequest::new(format!(
        "INPUT TEXT:\n{}\n\n{}",
        input, PARSER_INSTRUCTIONS
    ))
    .with_system_prompt(PARSER_SYSTEM)
}

const ARCHIVIST_SYSTEM: &str = "You are the Archivist. Your job is to prevent rework by \
determining whether an EXISTING test case covers a NEW scenario exactly.";

const ARCHIVIST_RULES: &str = r#"STRICT MATCHING RULES:
1. Compare functionality. Do not just look for an ID; read the description.
   - Legacy data "Verify Login" against new scenario "Search Book" is a MISMATCH. Output [NEW].
   - Legacy data "Test case not found" is a MISMATCH. Output [NEW].
   - Only output [MATCH] if the logic is identical.
2. Ignore requirement identifiers. IDs like "3.1.1", "REQ-01", "Page 5" are NOT test cases.
3. Decision format:
   - Exact functional match (e.g. TC_005 covers Search): [MATCH] | TC_005 | <scenario>
   - Different logic or no ID found: [NEW] | TC_NEW | <scenario>

OUTPUT (strictly one line):"#;

pub fn classify_prompt(
    scenario: &Scenario,
    context: &Context,
    legacy_data: &str,
    spec_data: &str,
) -> PromptRequest {
    PromptRequest::new(format!(
        "NEW SCENARIO: \"{}\"\nCONTEXT: \"{}\"\n\nRETRIEVED LEGACY DATA (Existing Tests):\n{}\n\nRETRIEVED SPECS (Requirements):\n{}\n\n{}",
        scenario, context.as_str(), legacy_data, spec_data, ARCHIVIST_RULES
    ))
    .with_system_prompt(ARCHIVIST_SYSTEM)
}

pub fn legacy_query(scenario: &Scenario) -> String {
    format!("legacy test case id and description for scenario: {}", scenario)
}

pub fn spec_query(scenario: &Scenario, context: &Context) -> String {
    format!(
        "functional requirement business rule for: {} context: {}",
        scenario,
        context.as_str()
    )
}

const AUTHOR_SYSTEM: &str = "You are 'The Author', a Senior QA Engineer.";

const AUTHOR_INSTRUCTIONS: &str = r#"INSTRUCTIONS:
1. Read the INPUT TASKS list line by line.
2. For EACH item, create exactly one Test Case.
3. Use the ID provided exactly (e.g. TC_504 or TC_NEW_001). DO NOT invent new IDs.
4. Use the RULES to fill in the Pre-conditions and Expected Results.
5. Output ALL test cases in one single block.

FORMAT:

Test Case ID: [ID from Input]
Title: [Scenario Name]
Pre-conditions: ...
Steps:
1. ...
Expected Result:
1. ..."#;

/// Prefix placed before Auditor feedback when the Author must revise.
pub const REVISION_DIRECTIVE_PREFIX: &str = "AUDITOR REJECTED DRAFT. FIX: ";

pub fn revision_directive(feedback: &str) -> String {
    format!("{}{}", REVISION_DIRECTIVE_PREFIX, feedback)
}

pub fn task_list(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(Task::prompt_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn author_prompt(
    tasks: &[Task],
    rules: &str,
    directive: Option<&str>,
    previous_draft: Option<&Draft>,
) -> PromptRequest {
    let mut prompt = format!(
        "--- INPUT TASKS (Strict List) ---\n{}\n(Format: \"ID: Scenario Name\")\n\n--- RULES (Context) ---\n{}\n\n{}",
        task_list(tasks),
        rules,
        AUTHOR_INSTRUCTIONS
    );
    if let Some(directive) = directive {
        prompt.push_str(&format!(
            "\n\n--- MANDATORY CORRECTION ---\n{}\n\n--- PREVIOUS DRAFT ---\n{}\n\nRewrite the previous draft so the correction is fully addressed.",
            directive,
            previous_draft.map(Draft::as_str).unwrap_or("None")
        ));
    }
    PromptRequest::new(prompt).with_system_prompt(AUTHOR_SYSTEM)
}

const AUDITOR_SYSTEM: &str = "You are 'The Auditor'. Verify Test Cases against the User Story.";

const AUDITOR_RULES: &str = r#"AUDIT RULES:
1. Check coverage: is there a test for every scenario?
2. Legacy vs. new logic:
   - EXISTING IDs (e.g. TC_006, TC_102) are legacy and already approved.
     Check that the Title matches the Scenario. If yes, APPROVE automatically; do not critique the steps.
   - NEW IDs (e.g. TC_NEW_001) are unverified.
     Check that Steps and Results match the Acceptance Criteria. Critique strictly and REJECT if logic is missing or wrong.
3. Avoid nitpicking. Do not reject for minor wording; reject only for logic failures.

FORMAT:

--- ANALYSIS ---
* (Coverage)
* (Legacy checks)
* (New checks)
--- END ANALYSIS ---

STATUS: [APPROVED or REJECTED]
FEEDBACK: (Only if REJECTED. Be specific.)"#;

pub fn auditor_prompt(requirement: &str, draft: &Draft) -> PromptRequest {
    PromptRequest::new(format!(
        "INPUTS:\n1. User Requirements:\n{}\n\n2. Draft Test Cases:\n{}\n\n{}",
        requirement,
        draft.as_str(),
        AUDITOR_RULES
    ))
    .with_system_prompt(AUDITOR_SYSTEM)
}

const SCRIBE_SYSTEM: &str = "You are 'The Scribe'. Convert test cases into a JSON list.";

const SCRIBE_INSTRUCTIONS: &str = r#"INSTRUCTIONS:
1. "title_merged": combine Feature + Scenario + Main Result.
2. "steps": a JSON array of strings, e.g. ["1. Step one", "2. Step two"].
3. "step_expected_results": a JSON array of strings, one per step.
4. "pre_conditions": a string.
5. "cleanup": a string.

REQUIRED JSON STRUCTURE:
[
  {
    "id": "TC_001",
    "title_merged": "Feature - Scenario - Result",
    "pre_conditions": "User is on page...",
    "steps": ["1. Step one", "2. Step two"],
    "step_expected_results": ["1. Result one", "2. Result two"],
    "cleanup": "Cleanup actions..."
  }
]"#;

pub fn scribe_prompt(draft: &Draft) -> PromptRequest {
    PromptRequest::new(format!(
        "INPUT TEXT:\n{}\n\n{}",
        draft.as_str(),
        SCRIBE_INSTRUCTIONS
    ))
    .with_system_prompt(SCRIBE_SYSTEM)
}

#[cfg(test)]
#[path = "tests/prompts_tests.rs"]
mod tests;
