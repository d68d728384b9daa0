//! Parsing of Archivist decisions and Auditor verdicts.
//!
//! Raw model text is turned into [`ReconciliationDecision`] and [`Verdict`]
//! as soon as it is received; nothing downstream inspects the strings.

use crate::config::IdGuardConfig;
use crate::domain::types::NEW_ID_PREFIX;
use crate::domain::{ReconciliationDecision, Verdict};
use anyhow::{Context, Result};
use regex::Regex;

pub const MATCH_TAG: &str = "[MATCH]";
pub const NEW_TAG: &str = "[NEW]";
pub const ANALYSIS_START: &str = "--- ANALYSIS ---";
pub const ANALYSIS_END: &str = "--- END ANALYSIS ---";
pub const STATUS_APPROVED: &str = "STATUS: APPROVED";
pub const STATUS_REJECTED: &str = "STATUS: REJECTED";

/// Compiled form of [`IdGuardConfig`].
#[derive(Debug, Clone)]
pub struct IdGuard {
    reject_digit_leading: bool,
    max_phrase_len: usize,
    allow: Option<Regex>,
}

impl IdGuard {
    pub fn from_config(config: &IdGuardConfig) -> Result<Self> {
        let allow = match config.allow_pattern {
            Some(ref pattern) => Some(
                Regex::new(pattern)
                    .with_context(|| format!("Invalid id allow pattern: {}", pattern))?,
            ),
            None => None,
        };
        Ok(Self {
            reject_digit_leading: config.reject_digit_leading,
            max_phrase_len: config.max_phrase_len,
            allow,
        })
    }

    /// Whether `id` is plausible as an existing test case id.
    ///
    /// Rejects empty ids, requirement numbers such as `3.1.1` and long
    /// whitespace-bearing phrases.
    pub fn accepts(&self, id: &str) -> bool {
        let normalized = id.trim().to_uppercase();
        let Some(first) = normalized.chars().next() else {
            return false;
        };
        if self.reject_digit_leading && first.is_ascii_digit() {
            return false;
        }
        if normalized.chars().count() > self.max_phrase_len
            && normalized.chars().any(char::is_whitespace)
        {
            return false;
        }
        match self.allow {
            Some(ref re) => re.is_match(id.trim()),
            None => true,
        }
    }
}

impl Default for IdGuard {
    fn default() -> Self {
        Self {
            reject_digit_leading: true,
            max_phrase_len: 20,
            allow: None,
        }
    }
}

/// Parses a `[MATCH] | <id> | <scenario>` or `[NEW] | TC_NEW | <scenario>` response.
///
/// The first tagged line wins. Untagged output, a MATCH with no id, a
/// placeholder `TC_NEW*` id, or an id the guard refuses all become
/// [`ReconciliationDecision::New`].
pub fn parse_decision(response: &str, guard: &IdGuard) -> ReconciliationDecision {
    let tagged = response
        .lines()
        .map(str::trim)
        .find(|line| line.contains(MATCH_TAG) || line.contains(NEW_TAG));

    let Some(line) = tagged else {
        return ReconciliationDecision::New;
    };
    if !line.contains(MATCH_TAG) {
        return ReconciliationDecision::New;
    }

    let id = line.split('|').nth(1).map(str::trim).unwrap_or_default();
    if guard.accepts(id) && !is_placeholder_id(id) {
        ReconciliationDecision::Match(id.to_string())
    } else {
        ReconciliationDecision::New
    }
}

fn is_placeholder_id(id: &str) -> bool {
    let upper = id.to_uppercase();
    upper == "TC_NEW" || upper.starts_with(NEW_ID_PREFIX)
}

/// An Auditor response split into its analysis block and decision text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditResponse {
    pub analysis: Option<String>,
    pub decision: String,
}

pub fn split_audit_response(response: &str) -> AuditResponse {
    match response.split_once(ANALYSIS_END) {
        Some((analysis, decision)) => AuditResponse {
            analysis: Some(analysis.replace(ANALYSIS_START, "").trim().to_string()),
            decision: decision.trim().to_string(),
        },
        None => AuditResponse {
            analysis: None,
            decision: response.trim().to_string(),
        },
    }
}

/// `STATUS: APPROVED` anywhere in the decision approves; anything else
/// rejects with the decision text (status token removed) as feedback.
pub fn verdict_from_decision(decision: &str) -> Verdict {
    if decision.contains(STATUS_APPROVED) {
        Verdict::Approved
    } else {
        Verdict::Rejected {
            feedback: decision.replace(STATUS_REJECTED, "").trim().to_string(),
        }
    }
}

#[cfg(test)]
#[path = "tests/verdict_tests.rs"]
mod tests;
