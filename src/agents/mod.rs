pub mod archivist;
pub mod auditor;
pub mod author;
pub mod log;
pub mod prompts;
pub mod scribe;

pub use archivist::Archivist;
pub use auditor::Auditor;
pub use author::Author;
pub use log::AgentLog;
pub use scribe::{SaveOutcome, Scribe};

use crate::config::WorkflowConfig;
use std::time::Duration;

/// Per-call deadlines for collaborator calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub generation: Duration,
    pub retrieval: Duration,
}

impl Deadlines {
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self {
            generation: Duration::from_secs(config.llm.timeout_secs),
            retrieval: Duration::from_secs(config.knowledge_base.timeout_secs),
        }
    }
}

impl Default for Deadlines {
    fn default() -> Self {
        Self::from_config(&WorkflowConfig::default())
    }
}
