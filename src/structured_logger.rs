//! Structured JSONL logger for debugging and run reconstruction.
//!
//! This module provides machine-parseable logging with:
//! - Monotonic sequence numbers for ordering
//! - ISO 8601 timestamps with microsecond precision
//! - Session and run IDs for correlation
//! - Structured event data in JSON format

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Structured JSONL logger for debugging and run reconstruction.
pub struct StructuredLogger {
    session_id: String,
    run_id: AtomicU64,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Serialize, serde::Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence number (unique across entire session)
    pub seq: u64,
    /// ISO 8601 timestamp with microseconds
    pub ts: String,
    pub session_id: String,
    /// Run ID (one per processed input within the session)
    pub run_id: u64,
    /// Component that emitted the log
    pub component: String,
    pub event: Value,
}

impl StructuredLogger {
    /// Creates a new structured logger for the given session.
    ///
    /// Logs are written to `<logs_dir>/events.jsonl`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The logs directory cannot be created
    /// - The log file cannot be opened
    pub fn new(session_id: &str, logs_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let log_path = logs_dir.join("events.jsonl");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            session_id: session_id.to_string(),
            run_id: AtomicU64::new(0),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path,
        })
    }

    /// Starts a new run and returns its ID (1-based).
    pub fn begin_run(&self) -> u64 {
        self.run_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Logs a structured event as a single JSON line. Thread-safe.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            session_id: self.session_id.clone(),
            run_id: self.run_id.load(Ordering::SeqCst),
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    pub fn log_phase_transition(&self, from: &str, to: &str) {
        self.log(
            "Workflow",
            serde_json::json!({
                "type": "PhaseTransition",
                "from": from,
                "to": to
            }),
        );
    }

    pub fn log_agent_invocation(&self, agent: &str, phase: &str) {
        self.log(
            "Agent",
            serde_json::json!({
                "type": "Invocation",
                "agent": agent,
                "phase": phase
            }),
        );
    }

    pub fn log_agent_complete(&self, agent: &str, success: bool) {
        self.log(
            "Agent",
            serde_json::json!({
                "type": "Complete",
                "agent": agent,
                "success": success
            }),
        );
    }

    /// Logs a collaborator fallback taken at a call site.
    pub fn log_fallback(&self, call_site: &str, reason: &str) {
        self.log(
            "Fallback",
            serde_json::json!({
                "type": "FallbackApplied",
                "call_site": call_site,
                "reason": reason
            }),
        );
    }

    /// Logs an assigned task id and how it was obtained.
    pub fn log_task_assigned(&self, task_id: &str, legacy: bool) {
        self.log(
            "Workflow",
            serde_json::json!({
                "type": "TaskAssigned",
                "task_id": task_id,
                "legacy": legacy
            }),
        );
    }

    pub fn log_verdict(&self, attempt: u32, approved: bool) {
        self.log(
            "Auditor",
            serde_json::json!({
                "type": "Verdict",
                "attempt": attempt,
                "approved": approved
            }),
        );
    }

    pub fn log_workflow_complete(&self, status: &str) {
        self.log(
            "Workflow",
            serde_json::json!({
                "type": "WorkflowComplete",
                "status": status
            }),
        );
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
#[path = "tests/structured_logger_tests.rs"]
mod tests;
