//! Pure text-processing steps of the workflow: input guardrail, story
//! parsing, and decision/verdict parsing.

pub mod parsing;
pub mod validation;
pub mod verdict;
