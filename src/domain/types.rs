//! Strongly typed domain primitives for a test-case generation run.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One line of free text describing a single test intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario(pub String);

impl Scenario {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Scenario {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for Scenario {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Feature description and business rules shared by every agent in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context(pub String);

impl Context {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Context {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Prefix of ids minted for scenarios with no legacy counterpart.
pub const NEW_ID_PREFIX: &str = "TC_NEW_";

/// Test case identifier: a legacy id reused verbatim or a minted `TC_NEW_nnn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Mints the id for the `counter`-th NEW scenario of a run (1-based).
    pub fn minted(counter: u32) -> Self {
        Self(format!("{}{:03}", NEW_ID_PREFIX, counter))
    }

    pub fn is_new(&self) -> bool {
        self.0.starts_with(NEW_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub scenario: Scenario,
}

impl Task {
    /// `ID: scenario` line used in Author and Auditor prompts.
    pub fn prompt_line(&self) -> String {
        format!("{}: {}", self.id, self.scenario)
    }
}

/// Author output for a whole batch of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft(pub String);

impl Draft {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Outcome of reconciling one scenario against the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationDecision {
    /// The scenario is already covered by this legacy test case.
    Match(String),
    New,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected { feedback: String },
}

impl Verdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }
}
