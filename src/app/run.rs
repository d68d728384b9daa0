//! Wiring for a single CLI invocation.

use crate::agents::AgentLog;
use crate::app::cli::{Cli, Command};
use crate::app::scaffold::{self, CONFIG_FILE_NAME};
use crate::app::util::render_outcome;
use crate::config::WorkflowConfig;
use crate::domain::WorkflowOutcome;
use crate::knowledge::file_store::FileKnowledgeBase;
use crate::knowledge::Retriever;
use crate::llm::ollama::OllamaClient;
use crate::manager::Manager;
use crate::session_logger::{log_startup, LogCategory, LogLevel, SessionLogger};
use crate::structured_logger::StructuredLogger;
use crate::trace_paths::{resolve_dir, session_logs_dir, short_hash};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let working_dir = cli.working_dir()?;

    if let Some(Command::Init { force }) = cli.command {
        let config = load_config(cli.config.as_deref(), &working_dir)?;
        let report = scaffold::init(&working_dir, &config, force)?;
        println!("{}", report.summary());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = load_config(cli.config.as_deref(), &working_dir)?;
    apply_cli_overrides(&mut config, &cli)?;
    let story = cli.story_text()?;

    let session_id = uuid::Uuid::new_v4().to_string();
    log_startup(&format!(
        "Session {} starting (story {})",
        session_id,
        short_hash(story.as_bytes())
    ));
    let session = Arc::new(SessionLogger::new(&session_id)?);
    let events = Arc::new(StructuredLogger::new(
        &session_id,
        &session_logs_dir(&session_id)?,
    )?);
    let log = AgentLog::new(session, events).with_progress(!cli.quiet);
    log.log(
        LogLevel::Info,
        LogCategory::Workflow,
        &format!("Working directory: {}", working_dir.display()),
    );

    let retriever = open_knowledge_base(&config, &working_dir, &log);
    let output_dir = resolve_dir(&working_dir, &config.output.dir);
    let generator = Arc::new(OllamaClient::new(config.llm.clone()));
    let manager = Manager::new(&config, generator, retriever, output_dir, log)?;

    let outcome = manager.process(&story).await;
    print_outcome(&outcome, cli.json)?;

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Explicit `--config` wins, then `workflow.yaml` in the working directory,
/// then the built-in defaults.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<WorkflowConfig> {
    if let Some(path) = explicit {
        return WorkflowConfig::load(path);
    }
    let local = working_dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        WorkflowConfig::load(&local)
    } else {
        WorkflowConfig::default_config()
    }
}

pub fn apply_cli_overrides(config: &mut WorkflowConfig, cli: &Cli) -> Result<()> {
    if let Some(max_attempts) = cli.max_attempts {
        config.policy.max_attempts = max_attempts;
    }
    if let Some(ref kb_dir) = cli.kb_dir {
        config.knowledge_base.dir = kb_dir.clone();
    }
    config.validate().context("Invalid command-line override")
}

/// Ingests the knowledge base, or returns `None` (with a warning) so the
/// Archivist runs degraded.
pub fn open_knowledge_base(
    config: &WorkflowConfig,
    working_dir: &Path,
    log: &AgentLog,
) -> Option<Arc<dyn Retriever>> {
    let kb = &config.knowledge_base;
    let dir: PathBuf = resolve_dir(working_dir, &kb.dir);
    match FileKnowledgeBase::ingest(&dir, kb.chunk_chars, kb.top_k) {
        Ok(store) => {
            log.log(
                LogLevel::Info,
                LogCategory::Knowledge,
                &format!(
                    "Knowledge base loaded: {} chunks from {}",
                    store.chunk_count(),
                    dir.display()
                ),
            );
            let store: Arc<dyn Retriever> = Arc::new(store);
            Some(store)
        }
        Err(e) => {
            tracing::warn!("knowledge base unavailable: {:#}", e);
            log.log(
                LogLevel::Warn,
                LogCategory::Knowledge,
                &format!("Knowledge base unavailable, all scenarios will be NEW: {:#}", e),
            );
            log.progress(
                "archivist",
                &format!("Knowledge base unavailable ({}); continuing without it", dir.display()),
            );
            None
        }
    }
}

fn print_outcome(outcome: &WorkflowOutcome, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(outcome).context("Failed to serialize outcome")?;
        println!("{}", rendered);
    } else {
        println!("{}", render_outcome(outcome));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/run_tests.rs"]
mod tests;
