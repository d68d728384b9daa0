//! Degraded values used when a collaborator call fails.
//!
//! Every call site that talks to the generation service or the knowledge
//! base has exactly one fallback, listed in [`CallSite::fallback`].

/// Legacy lookup returned nothing. Also the `ask` answer for an empty result.
pub const NO_LEGACY_TESTS: &str = "Test case not found in the archives.";
pub const LEGACY_LOOKUP_FAILED: &str = "Error retrieving legacy tests.";
pub const NO_REQUIREMENTS: &str = "No specific requirements found.";
pub const NO_KNOWLEDGE_BASE: &str = "No Knowledge Base connection.";
/// Context used when the parser output has no task marker.
pub const GENERAL_CONTEXT: &str = "General Context";
/// Context used when parsing failed outright.
pub const PARSE_FAILED_CONTEXT: &str = "Context";

pub fn ask_failed(error: &dyn std::fmt::Display) -> String {
    format!("Error retrieving data: {}", error)
}

pub fn audit_failed(error: &dyn std::fmt::Display) -> String {
    format!("Auditor could not review the draft: {}", error)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    /// Input parser generation call.
    Parse,
    /// Archivist legacy test lookup.
    LegacyLookup,
    /// Archivist requirement lookup.
    SpecLookup,
    /// Archivist match/new classification call.
    Classify,
    /// Archivist question answering.
    Ask,
    /// Author drafting call.
    Draft,
    /// Auditor review call.
    Review,
    /// Scribe structuring call.
    Structure,
    /// Scribe file write.
    Persist,
}

impl CallSite {
    pub const ALL: [CallSite; 9] = [
        CallSite::Parse,
        CallSite::LegacyLookup,
        CallSite::SpecLookup,
        CallSite::Classify,
        CallSite::Ask,
        CallSite::Draft,
        CallSite::Review,
        CallSite::Structure,
        CallSite::Persist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallSite::Parse => "parse",
            CallSite::LegacyLookup => "legacy_lookup",
            CallSite::SpecLookup => "spec_lookup",
            CallSite::Classify => "classify",
            CallSite::Ask => "ask",
            CallSite::Draft => "draft",
            CallSite::Review => "review",
            CallSite::Structure => "structure",
            CallSite::Persist => "persist",
        }
    }

    /// What the workflow continues with when this call fails.
    pub fn fallback(&self) -> &'static str {
        match self {
            CallSite::Parse => "no scenarios, context \"Context\"",
            CallSite::LegacyLookup => LEGACY_LOOKUP_FAILED,
            CallSite::SpecLookup => NO_REQUIREMENTS,
            CallSite::Classify => "decision NEW",
            CallSite::Ask => "\"Error retrieving data: <error>\"",
            CallSite::Draft => "attempt counted as rejected",
            CallSite::Review => "verdict REJECTED with diagnostic feedback",
            CallSite::Structure => "raw draft saved as raw_backup_<timestamp>.txt",
            CallSite::Persist => "rejected outcome, nothing persisted",
        }
    }
}
