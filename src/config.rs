use crate::llm::AgentRole;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `llm.base_url`.
pub const OLLAMA_BASE_URL_ENV: &str = "OLLAMA_BASE_URL";

const DEFAULT_WORKFLOW_YAML: &str = include_str!("../workflow.yaml");

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Generation service connection and per-role model selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Per-role model overrides. Roles left unset use `default_model`.
    #[serde(default)]
    pub models: RoleModels,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            models: RoleModels::default(),
            timeout_secs: default_llm_timeout_secs(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RoleModels {
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub archivist: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub auditor: Option<String>,
    #[serde(default)]
    pub scribe: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KnowledgeBaseConfig {
    /// Directory of `.txt`, `.md` and `.csv` files, relative to the working directory.
    #[serde(default = "default_kb_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,
    #[serde(default = "default_kb_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            dir: default_kb_dir(),
            top_k: default_top_k(),
            chunk_chars: default_chunk_chars(),
            timeout_secs: default_kb_timeout_secs(),
        }
    }
}

fn default_kb_dir() -> PathBuf {
    PathBuf::from("knowledge")
}

fn default_top_k() -> usize {
    3
}

fn default_chunk_chars() -> usize {
    800
}

fn default_kb_timeout_secs() -> u64 {
    10
}

/// Guardrail and retry policy for a run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Author/Auditor attempts before the run fails. Default: 3
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Inputs shorter than this (after trimming) are rejected. Default: 12
    #[serde(default = "default_min_input_chars")]
    pub min_input_chars: usize,
    #[serde(default = "default_greetings")]
    pub greetings: Vec<String>,
    /// Lower-case phrases that route input to question answering.
    #[serde(default = "default_question_phrases")]
    pub question_phrases: Vec<String>,
    /// Characters of auditor feedback quoted in the exhaustion message. Default: 150
    #[serde(default = "default_feedback_snippet_chars")]
    pub feedback_snippet_chars: usize,
    #[serde(default)]
    pub id_guard: IdGuardConfig,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            min_input_chars: default_min_input_chars(),
            greetings: default_greetings(),
            question_phrases: default_question_phrases(),
            feedback_snippet_chars: default_feedback_snippet_chars(),
            id_guard: IdGuardConfig::default(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_min_input_chars() -> usize {
    12
}

fn default_greetings() -> Vec<String> {
    ["hi", "hello", "hey", "greetings", "test", "start", "demo"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_question_phrases() -> Vec<String> {
    vec!["what is".to_string()]
}

fn default_feedback_snippet_chars() -> usize {
    150
}

/// Rules that demote implausible `[MATCH]` ids to NEW.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdGuardConfig {
    /// Reject ids whose first character is a digit (requirement/section numbers).
    #[serde(default = "default_true")]
    pub reject_digit_leading: bool,
    /// Ids longer than this that contain whitespace are treated as phrases.
    #[serde(default = "default_max_phrase_len")]
    pub max_phrase_len: usize,
    /// When set, a MATCH id must also match this regex.
    #[serde(default)]
    pub allow_pattern: Option<String>,
}

impl Default for IdGuardConfig {
    fn default() -> Self {
        Self {
            reject_digit_leading: true,
            max_phrase_len: default_max_phrase_len(),
            allow_pattern: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_phrase_len() -> usize {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Artifact directory, relative to the working directory unless absolute.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Prefix CSV files with a UTF-8 byte order mark for spreadsheet tools.
    #[serde(default)]
    pub excel_bom: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            excel_bom: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/outputs")
}

impl WorkflowConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Returns the embedded default configuration (`workflow.yaml`).
    pub fn default_config() -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(DEFAULT_WORKFLOW_YAML)
            .context("Failed to parse embedded workflow.yaml")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Raw text of the embedded default configuration.
    pub fn default_yaml() -> &'static str {
        DEFAULT_WORKFLOW_YAML
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(OLLAMA_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.llm.base_url = url.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.policy.max_attempts == 0 {
            anyhow::bail!("policy.max_attempts must be at least 1");
        }

        if self.llm.default_model.trim().is_empty() {
            anyhow::bail!("llm.default_model must not be empty");
        }

        for role in AgentRole::ALL {
            if let Some(model) = self.llm.models.get(role) {
                if model.trim().is_empty() {
                    anyhow::bail!("llm.models.{} must not be empty when set", role.as_str());
                }
            }
        }

        if let Some(ref pattern) = self.policy.id_guard.allow_pattern {
            Regex::new(pattern)
                .with_context(|| format!("Invalid policy.id_guard.allow_pattern: {}", pattern))?;
        }

        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be at least 1");
        }

        let kb = &self.knowledge_base;
        if kb.top_k == 0 {
            anyhow::bail!("knowledge_base.top_k must be at least 1");
        }
        if kb.chunk_chars == 0 {
            anyhow::bail!("knowledge_base.chunk_chars must be at least 1");
        }
        if kb.timeout_secs == 0 {
            anyhow::bail!("knowledge_base.timeout_secs must be at least 1");
        }

        Ok(())
    }

    /// Model used for the given role.
    pub fn model_for(&self, role: AgentRole) -> &str {
        self.llm.model_for(role)
    }
}

impl LlmConfig {
    pub fn model_for(&self, role: AgentRole) -> &str {
        self.models
            .get(role)
            .unwrap_or(self.default_model.as_str())
    }
}

impl RoleModels {
    pub fn get(&self, role: AgentRole) -> Option<&str> {
        let model = match role {
            AgentRole::Manager => &self.manager,
            AgentRole::Archivist => &self.archivist,
            AgentRole::Author => &self.author,
            AgentRole::Auditor => &self.auditor,
            AgentRole::Scribe => &self.scribe,
        };
        model.as_deref()
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
