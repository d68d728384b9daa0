//! Multi-agent pipeline that turns a user story into reviewed test cases.
//!
//! The [`manager::Manager`] validates and parses the story, has the
//! Archivist reconcile each scenario against the knowledge base, loops the
//! Author and Auditor until a draft is approved, and hands the approved
//! draft to the Scribe for CSV export.

pub mod agents;
pub mod app;
pub mod config;
pub mod domain;
pub mod knowledge;
pub mod llm;
pub mod manager;
pub mod phases;
pub mod session_logger;
pub mod structured_logger;
pub mod trace_paths;

#[cfg(test)]
mod testing;
