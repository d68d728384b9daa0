//! Per-run state: workflow phase, attempt counter and id minting.

use crate::domain::{ReconciliationDecision, TaskId, WorkflowError};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowPhase {
    Validating,
    /// Question routed to the Archivist.
    Answering,
    Parsing,
    Reconciling,
    Authoring,
    Auditing,
    Persisting,
    Failed,
    Done,
}

impl WorkflowPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Validating => "Validating",
            WorkflowPhase::Answering => "Answering",
            WorkflowPhase::Parsing => "Parsing",
            WorkflowPhase::Reconciling => "Reconciling",
            WorkflowPhase::Authoring => "Authoring",
            WorkflowPhase::Auditing => "Auditing",
            WorkflowPhase::Persisting => "Persisting",
            WorkflowPhase::Failed => "Failed",
            WorkflowPhase::Done => "Done",
        }
    }

    pub fn can_transition_to(&self, next: WorkflowPhase) -> bool {
        use WorkflowPhase::*;
        matches!(
            (self, next),
            (Validating, Answering | Parsing | Failed)
                | (Answering, Done)
                | (Parsing, Reconciling | Failed)
                | (Reconciling, Authoring)
                | (Authoring, Auditing | Authoring | Failed)
                | (Auditing, Authoring | Persisting | Failed)
                | (Persisting, Done | Failed)
        )
    }
}

impl Display for WorkflowPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable state owned by a single `process` call.
#[derive(Debug)]
pub struct RunContext {
    phase: WorkflowPhase,
    attempt: u32,
    max_attempts: u32,
    next_new_id: u32,
    assigned: HashSet<String>,
}

impl RunContext {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            phase: WorkflowPhase::Validating,
            attempt: 0,
            max_attempts,
            next_new_id: 1,
            assigned: HashSet::new(),
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// Moves to `next`, returning the previous phase.
    pub fn transition(&mut self, next: WorkflowPhase) -> Result<WorkflowPhase, WorkflowError> {
        if !self.phase.can_transition_to(next) {
            return Err(WorkflowError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        let previous = self.phase;
        self.phase = next;
        Ok(previous)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Starts the next attempt, or returns `None` once the budget is spent.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        self.attempt += 1;
        Some(self.attempt)
    }

    /// Chooses the task id for a decision.
    ///
    /// A matched legacy id is reused verbatim unless an earlier scenario in
    /// this run already took it; everything else gets the next `TC_NEW_nnn`.
    pub fn assign_id(&mut self, decision: &ReconciliationDecision) -> TaskId {
        if let ReconciliationDecision::Match(id) = decision {
            if self.assigned.insert(id.clone()) {
                return TaskId(id.clone());
            }
        }
        let id = TaskId::minted(self.next_new_id);
        self.next_new_id += 1;
        self.assigned.insert(id.as_str().to_string());
        id
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
