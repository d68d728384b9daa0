//! The Archivist: reconciles scenarios against legacy tests and answers questions.

use super::log::AgentLog;
use super::prompts;
use super::Deadlines;
use crate::domain::fallback::{self, CallSite};
use crate::domain::{Context, ReconciliationDecision, Scenario};
use crate::knowledge::{join_passages, retrieve_with_deadline, Passage, Retriever};
use crate::llm::{generate_with_deadline, AgentRole, TextGenerator};
use crate::phases::verdict::{parse_decision, IdGuard};
use crate::session_logger::{LogCategory, LogLevel};
use std::sync::Arc;

const AGENT: &str = "archivist";

pub struct Archivist {
    generator: Arc<dyn TextGenerator>,
    retriever: Option<Arc<dyn Retriever>>,
    guard: IdGuard,
    deadlines: Deadlines,
    log: AgentLog,
}

impl Archivist {
    /// `retriever` is `None` when knowledge base ingestion failed; every
    /// scenario is then classified NEW.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        retriever: Option<Arc<dyn Retriever>>,
        guard: IdGuard,
        deadlines: Deadlines,
        log: AgentLog,
    ) -> Self {
        Self {
            generator,
            retriever,
            guard,
            deadlines,
            log,
        }
    }

    pub fn has_knowledge_base(&self) -> bool {
        self.retriever.is_some()
    }

    /// Answers a free-form question from the knowledge base.
    pub async fn ask(&self, query: &str) -> String {
        let Some(ref retriever) = self.retriever else {
            return fallback::NO_KNOWLEDGE_BASE.to_string();
        };
        match retrieve_with_deadline(retriever.as_ref(), query, self.deadlines.retrieval).await {
            Ok(passages) if passages.is_empty() => fallback::NO_LEGACY_TESTS.to_string(),
            Ok(passages) => join_passages(&passages),
            Err(e) => {
                self.log.fallback(CallSite::Ask, &e.to_string());
                fallback::ask_failed(&e)
            }
        }
    }

    /// Decides whether an existing test case already covers `scenario`.
    ///
    /// Never fails: every collaborator failure degrades to NEW or to a
    /// placeholder lookup text.
    pub async fn classify(&self, scenario: &Scenario, context: &Context) -> ReconciliationDecision {
        let Some(ref retriever) = self.retriever else {
            self.log.log(
                LogLevel::Debug,
                LogCategory::Knowledge,
                "No knowledge base; scenario classified NEW",
            );
            return ReconciliationDecision::New;
        };

        let legacy_data = match retrieve_with_deadline(
            retriever.as_ref(),
            &prompts::legacy_query(scenario),
            self.deadlines.retrieval,
        )
        .await
        {
            Ok(passages) if passages.is_empty() => fallback::NO_LEGACY_TESTS.to_string(),
            Ok(passages) => join_lines(&passages),
            Err(e) => {
                self.log.fallback(CallSite::LegacyLookup, &e.to_string());
                fallback::LEGACY_LOOKUP_FAILED.to_string()
            }
        };

        let spec_data = match retrieve_with_deadline(
            retriever.as_ref(),
            &prompts::spec_query(scenario, context),
            self.deadlines.retrieval,
        )
        .await
        {
            Ok(passages) if passages.is_empty() => fallback::NO_REQUIREMENTS.to_string(),
            Ok(passages) => join_lines(&passages),
            Err(e) => {
                self.log.fallback(CallSite::SpecLookup, &e.to_string());
                fallback::NO_REQUIREMENTS.to_string()
            }
        };

        let request = prompts::classify_prompt(scenario, context, &legacy_data, &spec_data);
        self.log.stream(AGENT, "prompt", &request.merged());
        let response = match generate_with_deadline(
            self.generator.as_ref(),
            AgentRole::Archivist,
            request,
            self.deadlines.generation,
        )
        .await
        {
            Ok(text) => text,
            Err(e) => {
                self.log.fallback(CallSite::Classify, &e.to_string());
                return ReconciliationDecision::New;
            }
        };
        self.log.stream(AGENT, "response", &response);

        let decision = parse_decision(&response, &self.guard);
        if matches!(decision, ReconciliationDecision::New) && response.contains("[MATCH]") {
            self.log.log(
                LogLevel::Info,
                LogCategory::Guardrail,
                &format!("MATCH claim refused by id guard: {}", response.trim()),
            );
        }
        decision
    }

    /// Classifies `scenarios` in order; the result lines up with the input.
    pub async fn reconcile_scenarios(
        &self,
        context: &Context,
        scenarios: &[Scenario],
    ) -> Vec<ReconciliationDecision> {
        if self.has_knowledge_base() {
            self.log.progress(
                AGENT,
                &format!(
                    "Verifying {} scenarios against legacy data and specs",
                    scenarios.len()
                ),
            );
        } else {
            self.log.progress(
                AGENT,
                &format!("No knowledge base; {} scenarios will be NEW", scenarios.len()),
            );
        }
        let mut decisions = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            decisions.push(self.classify(scenario, context).await);
        }
        decisions
    }
}

fn join_lines(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "tests/archivist_tests.rs"]
mod tests;
