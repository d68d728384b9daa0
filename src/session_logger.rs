//! Unified session logging for trace-autogen runs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trace_autogen::session_logger::{SessionLogger, LogCategory, LogLevel};
//!
//! let logger = SessionLogger::new("abc123-session-id")?;
//! logger.log(LogLevel::Info, LogCategory::Workflow, "Reconciling 4 scenarios");
//! logger.log_agent_stream("auditor", "response", "STATUS: APPROVED");
//! ```
//!
//! ## Log Format
//!
//! ```text
//! [2026-01-15T14:30:00.123Z] [INFO] [WORKFLOW] Reconciling 4 scenarios
//! [2026-01-15T14:30:01.456Z][auditor][response] STATUS: APPROVED
//! ```

use crate::trace_paths;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Log verbosity levels, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    #[default]
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Returns the uppercase string representation for log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log categories for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    /// Manager phase transitions and decisions
    Workflow,
    /// Input validation and question routing
    Guardrail,
    /// Knowledge base ingestion and retrieval
    Knowledge,
    /// Archivist/Author/Auditor activity
    Agent,
    /// Artifact persistence
    Scribe,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Workflow => "WORKFLOW",
            LogCategory::Guardrail => "GUARDRAIL",
            LogCategory::Knowledge => "KNOWLEDGE",
            LogCategory::Agent => "AGENT",
            LogCategory::Scribe => "SCRIBE",
        }
    }
}

impl std::fmt::Display for LogCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A thread-safe session logger that writes to session-scoped log files.
///
/// Two files are kept in the logs directory:
/// - `session.log` - categorized workflow entries
/// - `agent-stream.log` - raw generation service output
pub struct SessionLogger {
    main_log: Arc<Mutex<File>>,
    agent_log: Arc<Mutex<File>>,
    log_level: LogLevel,
}

impl SessionLogger {
    /// Creates a logger under `~/.trace-autogen/sessions/<session-id>/logs/`.
    pub fn new(session_id: &str) -> Result<Self> {
        let logs_dir = trace_paths::session_logs_dir(session_id)?;
        let logger = Self::new_in(&logs_dir, session_id, LogLevel::Debug)?;
        if let Ok(mut main) = logger.main_log.lock() {
            merge_startup_logs(&mut main);
        }
        Ok(logger)
    }

    /// Creates a logger writing into an explicit directory.
    ///
    /// Messages below `log_level` are dropped.
    pub fn new_in(logs_dir: &Path, session_id: &str, log_level: LogLevel) -> Result<Self> {
        std::fs::create_dir_all(logs_dir)
            .with_context(|| format!("Failed to create logs directory: {}", logs_dir.display()))?;
        let main_log_path = logs_dir.join("session.log");
        let agent_log_path = logs_dir.join("agent-stream.log");

        let mut main = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&main_log_path)
            .with_context(|| format!("Failed to open session log: {}", main_log_path.display()))?;

        let mut agent = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&agent_log_path)
            .with_context(|| format!("Failed to open agent log: {}", agent_log_path.display()))?;

        let now = format_timestamp();
        let _ = writeln!(
            main,
            "\n=== Session log started at {} (session {}) ===",
            now, session_id
        );
        let _ = writeln!(
            agent,
            "\n=== Agent stream log started at {} (session {}) ===",
            now, session_id
        );

        Ok(Self {
            main_log: Arc::new(Mutex::new(main)),
            agent_log: Arc::new(Mutex::new(agent)),
            log_level,
        })
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.log_level
    }

    /// Logs a message with the specified level and category to the main session log.
    ///
    /// Format: `[YYYY-MM-DDTHH:MM:SS.mmmZ] [LEVEL] [CATEGORY] message`
    pub fn log(&self, level: LogLevel, category: LogCategory, message: &str) {
        if !self.should_log(level) {
            return;
        }
        if let Ok(mut file) = self.main_log.lock() {
            let _ = writeln!(
                file,
                "[{}] [{}] [{}] {}",
                format_timestamp(),
                level,
                category,
                message
            );
            let _ = file.flush();
        }
    }

    /// Logs raw generation output to the agent-stream log only.
    ///
    /// Agent stream output is always logged regardless of level.
    pub fn log_agent_stream(&self, agent_name: &str, kind: &str, text: &str) {
        if let Ok(mut file) = self.agent_log.lock() {
            let timestamp = format_timestamp();
            for line in text.lines() {
                let _ = writeln!(file, "[{}][{}][{}] {}", timestamp, agent_name, kind, line);
            }
            let _ = file.flush();
        }
    }
}

/// Formats the current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
fn format_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Merges startup lines for this PID into the session log, then truncates the startup log.
fn merge_startup_logs(session_log: &mut File) {
    let startup_path = match trace_paths::startup_log_path() {
        Ok(p) => p,
        Err(_) => return,
    };
    let startup_file = match File::open(&startup_path) {
        Ok(f) => f,
        Err(_) => return,
    };

    let pid_marker = format!("[PID:{}]", std::process::id());
    let mut merged_any = false;
    for line in BufReader::new(startup_file).lines().map_while(Result::ok) {
        if line.contains(&pid_marker) || !line.contains("[PID:") {
            if !merged_any {
                let _ = writeln!(session_log, "=== Merged startup logs ===");
                merged_any = true;
            }
            let _ = writeln!(session_log, "{}", line);
        }
    }

    if merged_any {
        let _ = writeln!(session_log, "=== End merged startup logs ===");
        let _ = session_log.flush();
    }
    let _ = std::fs::write(&startup_path, "");
}

/// Writes a message to the startup log (before a session exists).
///
/// Format: `[YYYY-MM-DDTHH:MM:SS.mmmZ][PID:12345] message`
pub fn log_startup(message: &str) {
    let startup_path = match trace_paths::startup_log_path() {
        Ok(p) => p,
        Err(_) => return,
    };

    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&startup_path)
    {
        let _ = writeln!(
            file,
            "[{}][PID:{}] {}",
            format_timestamp(),
            std::process::id(),
            message
        );
        let _ = file.flush();
    }
}

#[cfg(test)]
#[path = "tests/session_logger_tests.rs"]
mod tests;
