use crate::domain::fallback::CallSite;
use crate::session_logger::{LogCategory, LogLevel, SessionLogger};
use crate::structured_logger::StructuredLogger;
use std::sync::Arc;

/// Log sinks shared by the Manager and its agents for one session.
///
/// Every sink is optional so agents can run without a session directory.
#[derive(Clone, Default)]
pub struct AgentLog {
    session: Option<Arc<SessionLogger>>,
    events: Option<Arc<StructuredLogger>>,
    progress: bool,
}

impl AgentLog {
    pub fn new(session: Arc<SessionLogger>, events: Arc<StructuredLogger>) -> Self {
        Self {
            session: Some(session),
            events: Some(events),
            progress: false,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Also echo progress lines as `[agent] message` on stderr.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn events(&self) -> Option<&StructuredLogger> {
        self.events.as_deref()
    }

    pub fn log(&self, level: LogLevel, category: LogCategory, message: &str) {
        if let Some(ref session) = self.session {
            session.log(level, category, message);
        }
    }

    /// Workflow-level progress, written to the session log and optionally the console.
    pub fn progress(&self, agent: &str, message: &str) {
        self.log(
            LogLevel::Info,
            LogCategory::Workflow,
            &format!("[{}] {}", agent, message),
        );
        if self.progress {
            eprintln!("[{}] {}", agent, message);
        }
    }

    pub fn stream(&self, agent: &str, kind: &str, text: &str) {
        if let Some(ref session) = self.session {
            session.log_agent_stream(agent, kind, text);
        }
    }

    /// Records that `site` failed and its fallback value is being used.
    pub fn fallback(&self, site: CallSite, reason: &str) {
        tracing::warn!(call_site = site.as_str(), reason, "collaborator fallback");
        self.log(
            LogLevel::Warn,
            LogCategory::Agent,
            &format!(
                "{} failed ({}); using fallback: {}",
                site.as_str(),
                reason,
                site.fallback()
            ),
        );
        if let Some(events) = self.events() {
            events.log_fallback(site.as_str(), reason);
        }
    }
}
