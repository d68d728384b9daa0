//! The Author drafts one test case per task.

use super::log::AgentLog;
use super::prompts;
use super::Deadlines;
use crate::domain::{Draft, Task};
use crate::llm::{generate_with_deadline, AgentRole, GenerationError, TextGenerator};
use std::sync::Arc;

const AGENT: &str = "author";

pub struct Author {
    generator: Arc<dyn TextGenerator>,
    deadlines: Deadlines,
    log: AgentLog,
}

impl Author {
    pub fn new(generator: Arc<dyn TextGenerator>, deadlines: Deadlines, log: AgentLog) -> Self {
        Self {
            generator,
            deadlines,
            log,
        }
    }

    /// Drafts test cases for `tasks`.
    ///
    /// `rules` is the run context as shown to the Author. When `feedback` is
    /// present it is sent as a mandatory correction over `previous_draft`.
    /// The output is not validated here; that is the Auditor's job.
    pub async fn draft(
        &self,
        tasks: &[Task],
        rules: &str,
        feedback: Option<&str>,
        previous_draft: Option<&Draft>,
    ) -> Result<Draft, GenerationError> {
        let directive = feedback.map(prompts::revision_directive);
        let request = prompts::author_prompt(tasks, rules, directive.as_deref(), previous_draft);
        self.log.stream(AGENT, "prompt", &request.merged());

        let text = generate_with_deadline(
            self.generator.as_ref(),
            AgentRole::Author,
            request,
            self.deadlines.generation,
        )
        .await?;
        self.log.stream(AGENT, "response", &text);
        Ok(Draft(text))
    }
}
