//! Domain model for a test-case generation run.
//!
//! - **Types** (`types.rs`): scenarios, tasks, drafts, decisions and verdicts
//! - **Outcome** (`outcome.rs`): the serialized result of a run
//! - **Fallback** (`fallback.rs`): degraded value for every collaborator call site
//! - **Errors** (`errors.rs`): workflow error enum

pub mod errors;
pub mod fallback;
pub mod outcome;
pub mod types;

pub use errors::WorkflowError;
pub use outcome::{OutcomeStatus, WorkflowOutcome};
pub use types::{Context, Draft, ReconciliationDecision, Scenario, Task, TaskId, Verdict};

#[cfg(test)]
mod tests;
