//! The Auditor gates drafts before they are persisted.

use super::log::AgentLog;
use super::prompts;
use super::Deadlines;
use crate::domain::fallback::{self, CallSite};
use crate::domain::{Draft, Verdict, WorkflowError};
use crate::llm::{generate_with_deadline, AgentRole, TextGenerator};
use crate::phases::verdict::{split_audit_response, verdict_from_decision};
use crate::session_logger::{LogCategory, LogLevel};
use std::sync::Arc;

const AGENT: &str = "auditor";

pub struct Auditor {
    generator: Arc<dyn TextGenerator>,
    deadlines: Deadlines,
    log: AgentLog,
}

impl Auditor {
    pub fn new(generator: Arc<dyn TextGenerator>, deadlines: Deadlines, log: AgentLog) -> Self {
        Self {
            generator,
            deadlines,
            log,
        }
    }

    /// Reviews `draft` against `requirement` (context plus task list).
    ///
    /// Legacy ids are approved once their titles correspond; `TC_NEW_*`
    /// cases are critiqued strictly. A generation failure is a rejection
    /// with diagnostic feedback. Blank inputs are an error and no model
    /// call is made.
    pub async fn review(&self, requirement: &str, draft: &Draft) -> Result<Verdict, WorkflowError> {
        if requirement.trim().is_empty() {
            return Err(WorkflowError::MissingInput {
                agent: AGENT,
                what: "requirements",
            });
        }
        if draft.is_blank() {
            return Err(WorkflowError::MissingInput {
                agent: AGENT,
                what: "a draft",
            });
        }

        let request = prompts::auditor_prompt(requirement, draft);
        self.log.stream(AGENT, "prompt", &request.merged());
        let response = match generate_with_deadline(
            self.generator.as_ref(),
            AgentRole::Auditor,
            request,
            self.deadlines.generation,
        )
        .await
        {
            Ok(text) => text,
            Err(e) => {
                self.log.fallback(CallSite::Review, &e.to_string());
                return Ok(Verdict::Rejected {
                    feedback: fallback::audit_failed(&e),
                });
            }
        };
        self.log.stream(AGENT, "response", &response);

        let split = split_audit_response(&response);
        if let Some(ref analysis) = split.analysis {
            self.log.log(
                LogLevel::Info,
                LogCategory::Agent,
                &format!("[AUDITOR CHECK]\n{}", analysis),
            );
        }
        Ok(verdict_from_decision(&split.decision))
    }
}

#[cfg(test)]
#[path = "tests/auditor_tests.rs"]
mod tests;
