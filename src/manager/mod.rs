//! The Manager: validates input, reconciles scenarios and runs the
//! Author/Auditor loop until a draft is approved or the attempt budget is spent.

pub mod state;

pub use state::{RunContext, WorkflowPhase};

use crate::agents::prompts;
use crate::agents::{AgentLog, Archivist, Auditor, Author, Deadlines, SaveOutcome, Scribe};
use crate::app::util::truncate_chars;
use crate::config::{PolicyConfig, WorkflowConfig};
use crate::domain::fallback::{self, CallSite};
use crate::domain::{Context, Draft, Scenario, Task, Verdict, WorkflowError, WorkflowOutcome};
use crate::knowledge::Retriever;
use crate::llm::{generate_with_deadline, AgentRole, TextGenerator};
use crate::phases::parsing::{parse_structured_response, ParsedInput};
use crate::phases::validation::{is_question, validate_input};
use crate::phases::verdict::IdGuard;
use crate::session_logger::{LogCategory, LogLevel};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

const AGENT: &str = "manager";

pub const NO_SCENARIOS_MESSAGE: &str = "No scenarios found to process.";
pub const ANSWER_MESSAGE: &str = "Archivist retrieved information.";

pub struct Manager {
    generator: Arc<dyn TextGenerator>,
    archivist: Archivist,
    author: Author,
    auditor: Auditor,
    scribe: Scribe,
    policy: PolicyConfig,
    deadlines: Deadlines,
    log: AgentLog,
}

impl Manager {
    /// Builds the agent team. `retriever` is `None` when the knowledge base
    /// could not be ingested.
    pub fn new(
        config: &WorkflowConfig,
        generator: Arc<dyn TextGenerator>,
        retriever: Option<Arc<dyn Retriever>>,
        output_dir: PathBuf,
        log: AgentLog,
    ) -> Result<Self> {
        config.validate()?;
        let deadlines = Deadlines::from_config(config);
        let guard = IdGuard::from_config(&config.policy.id_guard)?;

        Ok(Self {
            archivist: Archivist::new(
                generator.clone(),
                retriever,
                guard,
                deadlines,
                log.clone(),
            ),
            author: Author::new(generator.clone(), deadlines, log.clone()),
            auditor: Auditor::new(generator.clone(), deadlines, log.clone()),
            scribe: Scribe::new(
                generator.clone(),
                deadlines,
                log.clone(),
                output_dir,
                config.output.excel_bom,
            ),
            generator,
            policy: config.policy.clone(),
            deadlines,
            log,
        })
    }

    /// Processes one user input end to end. Never panics on collaborator
    /// failure; every outcome is reported in the returned value.
    pub async fn process(&self, input: &str) -> WorkflowOutcome {
        if let Some(events) = self.log.events() {
            events.begin_run();
        }
        let mut run = RunContext::new(self.policy.max_attempts);

        let outcome = match self.process_run(&mut run, input).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.log
                    .log(LogLevel::Error, LogCategory::Workflow, &e.to_string());
                WorkflowOutcome::rejected(format!("Workflow error: {}", e))
            }
        };

        let status = if outcome.is_success() { "success" } else { "rejected" };
        if let Some(events) = self.log.events() {
            events.log_workflow_complete(status);
        }
        outcome
    }

    async fn process_run(
        &self,
        run: &mut RunContext,
        input: &str,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        if let Err(rejection) = validate_input(input, &self.policy) {
            self.log
                .log(LogLevel::Info, LogCategory::Guardrail, &rejection.to_string());
            self.advance(run, WorkflowPhase::Failed)?;
            return Ok(WorkflowOutcome::rejected(rejection.user_message()));
        }

        if is_question(input, &self.policy) {
            self.advance(run, WorkflowPhase::Answering)?;
            self.log.progress(AGENT, "Detected question. Routing to Archivist");
            let answer = self.archivist.ask(input).await;
            self.advance(run, WorkflowPhase::Done)?;
            return Ok(WorkflowOutcome::success(ANSWER_MESSAGE).with_preview(answer));
        }

        self.advance(run, WorkflowPhase::Parsing)?;
        let parsed = self.parse(input).await;
        self.log.progress(
            AGENT,
            &format!("Identified {} valid scenarios", parsed.scenarios.len()),
        );
        if parsed.scenarios.is_empty() {
            self.advance(run, WorkflowPhase::Failed)?;
            return Ok(WorkflowOutcome::rejected(NO_SCENARIOS_MESSAGE));
        }

        self.advance(run, WorkflowPhase::Reconciling)?;
        let tasks = self.build_tasks(run, &parsed.context, &parsed.scenarios).await;

        self.review_loop(run, &tasks, &parsed.context).await
    }

    /// Asks the generation service to split the input into context and scenarios.
    async fn parse(&self, input: &str) -> ParsedInput {
        let request = prompts::parser_prompt(input);
        self.log.stream(AGENT, "prompt", &request.merged());
        match generate_with_deadline(
            self.generator.as_ref(),
            AgentRole::Manager,
            request,
            self.deadlines.generation,
        )
        .await
        {
            Ok(response) => {
                self.log.stream(AGENT, "response", &response);
                let parsed = parse_structured_response(&response, input);
                if !parsed.structured {
                    self.log.log(
                        LogLevel::Warn,
                        LogCategory::Workflow,
                        "Parser output had no task marker; using raw input lines",
                    );
                }
                parsed
            }
            Err(e) => {
                self.log.fallback(CallSite::Parse, &e.to_string());
                ParsedInput {
                    context: Context::from(fallback::PARSE_FAILED_CONTEXT),
                    scenarios: Vec::new(),
                    structured: false,
                }
            }
        }
    }

    /// Classifies each scenario in order and assigns its task id.
    async fn build_tasks(
        &self,
        run: &mut RunContext,
        context: &Context,
        scenarios: &[Scenario],
    ) -> Vec<Task> {
        self.agent_started(AgentRole::Archivist, run.phase());
        let decisions = self.archivist.reconcile_scenarios(context, scenarios).await;
        self.agent_finished(AgentRole::Archivist, true);

        let mut tasks = Vec::with_capacity(scenarios.len());
        for (scenario, decision) in scenarios.iter().zip(&decisions) {
            let id = run.assign_id(decision);
            let legacy = !id.is_new();
            if legacy {
                self.log.progress(
                    AGENT,
                    &format!(
                        "Match: {} covers '{}'",
                        id,
                        truncate_chars(scenario.as_str(), 30)
                    ),
                );
            }
            if let Some(events) = self.log.events() {
                events.log_task_assigned(id.as_str(), legacy);
            }
            tasks.push(Task {
                id,
                scenario: scenario.clone(),
            });
        }
        tasks
    }

    async fn review_loop(
        &self,
        run: &mut RunContext,
        tasks: &[Task],
        context: &Context,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let rules = format!("RULES/AC:\n{}", context.as_str());
        let requirement = format!("{}\n\nTASKS:\n{}", rules, prompts::task_list(tasks));
        self.log
            .progress(AGENT, &format!("Handing off {} tasks to Author", tasks.len()));

        let mut feedback: Option<String> = None;
        let mut last_feedback = String::new();
        let mut previous: Option<Draft> = None;

        while let Some(attempt) = run.begin_attempt() {
            self.advance(run, WorkflowPhase::Authoring)?;
            self.log.progress(
                AGENT,
                &format!("Attempt {}/{}: authoring", attempt, run.max_attempts()),
            );

            self.agent_started(AgentRole::Author, run.phase());
            let directive = feedback.as_deref().filter(|f| !f.is_empty());
            let draft = match self
                .author
                .draft(tasks, &rules, directive, previous.as_ref())
                .await
            {
                Ok(draft) => {
                    self.agent_finished(AgentRole::Author, true);
                    draft
                }
                Err(e) => {
                    self.agent_finished(AgentRole::Author, false);
                    self.log.fallback(CallSite::Draft, &e.to_string());
                    last_feedback = format!("Author could not produce a draft: {}", e);
                    if let Some(events) = self.log.events() {
                        events.log_verdict(attempt, false);
                    }
                    continue;
                }
            };

            self.advance(run, WorkflowPhase::Auditing)?;
            self.agent_started(AgentRole::Auditor, run.phase());
            let verdict = match self.auditor.review(&requirement, &draft).await {
                Ok(verdict) => verdict,
                Err(e) => Verdict::Rejected {
                    feedback: e.to_string(),
                },
            };
            self.agent_finished(AgentRole::Auditor, true);
            if let Some(events) = self.log.events() {
                events.log_verdict(attempt, verdict.is_approved());
            }

            match verdict {
                Verdict::Approved => {
                    self.log.progress(AGENT, "Quality gate passed");
                    return self.persist(run, draft).await;
                }
                Verdict::Rejected { feedback: text } => {
                    self.log.progress(AGENT, "Auditor rejected the draft");
                    self.log.log(
                        LogLevel::Info,
                        LogCategory::Agent,
                        &format!("Auditor feedback (attempt {}): {}", attempt, text),
                    );
                    last_feedback = text.clone();
                    feedback = Some(text);
                    previous = Some(draft);
                }
            }
        }

        self.advance(run, WorkflowPhase::Failed)?;
        Ok(WorkflowOutcome::rejected(self.exhaustion_message(
            run.max_attempts(),
            &last_feedback,
        )))
    }

    async fn persist(
        &self,
        run: &mut RunContext,
        draft: Draft,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        self.advance(run, WorkflowPhase::Persisting)?;
        self.agent_started(AgentRole::Scribe, run.phase());
        match self.scribe.save(&draft).await {
            Ok(saved) => {
                self.agent_finished(AgentRole::Scribe, true);
                self.advance(run, WorkflowPhase::Done)?;
                let message = saved.message();
                let path = saved.path().to_path_buf();
                let outcome = WorkflowOutcome::success(message).with_file_path(path);
                Ok(match saved {
                    SaveOutcome::Saved { .. } => outcome.with_preview(draft.0),
                    SaveOutcome::RawBackup { .. } => outcome,
                })
            }
            Err(e) => {
                self.agent_finished(AgentRole::Scribe, false);
                self.log.fallback(CallSite::Persist, &e.to_string());
                self.advance(run, WorkflowPhase::Failed)?;
                Ok(WorkflowOutcome::rejected(format!("Error saving file: {}", e)))
            }
        }
    }

    fn exhaustion_message(&self, attempts: u32, feedback: &str) -> String {
        format!(
            "CRITICAL FAILURE: The team could not resolve the Auditor's requirements after {} attempts. Please check if your Requirements are clear.\nFeedback: {}...",
            attempts,
            truncate_chars(feedback, self.policy.feedback_snippet_chars)
        )
    }

    fn advance(&self, run: &mut RunContext, next: WorkflowPhase) -> Result<(), WorkflowError> {
        let previous = run.transition(next)?;
        self.log.log(
            LogLevel::Debug,
            LogCategory::Workflow,
            &format!("Phase {} -> {}", previous, next),
        );
        if let Some(events) = self.log.events() {
            events.log_phase_transition(previous.as_str(), next.as_str());
        }
        Ok(())
    }

    fn agent_started(&self, role: AgentRole, phase: WorkflowPhase) {
        if let Some(events) = self.log.events() {
            events.log_agent_invocation(role.as_str(), phase.as_str());
        }
    }

    fn agent_finished(&self, role: AgentRole, success: bool) {
        if let Some(events) = self.log.events() {
            events.log_agent_complete(role.as_str(), success);
        }
    }
}

#[cfg(test)]
#[path = "tests/manager_tests.rs"]
mod tests;
