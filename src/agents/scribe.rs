//! The Scribe turns an approved draft into a CSV test-case sheet.
//!
//! The draft is structured by the model as a JSON list of records. Each
//! record becomes a block of rows under the `ID, Title, Action, Expected Result`
//! header:
//!
//! ```text
//! "TC_NEW_001","Cart - Add item - Item listed","",""
//! "","","Pre-conditions:\nUser is logged in",""
//! "","","1. Open product","1. Product page shown"
//! "","","2. Click add",""
//! "","","Cleanup:\nEmpty cart",""
//! ```
//!
//! When the model output is not valid JSON the draft text is saved as a
//! `raw_backup_<timestamp>.txt` file instead.

use super::log::AgentLog;
use super::prompts;
use super::Deadlines;
use crate::domain::fallback::CallSite;
use crate::domain::{Draft, WorkflowError};
use crate::llm::{generate_with_deadline, AgentRole, TextGenerator};
use crate::session_logger::{LogCategory, LogLevel};
use csv::{QuoteStyle, WriterBuilder};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

const AGENT: &str = "scribe";

pub const CSV_HEADERS: [&str; 4] = ["ID", "Title", "Action", "Expected Result"];

/// One structured test case as produced by the model.
///
/// Missing and `null` fields both take the default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestCaseRecord {
    #[serde(default = "default_id", deserialize_with = "id_or_default")]
    pub id: String,
    #[serde(default = "default_title", deserialize_with = "title_or_default")]
    pub title_merged: String,
    #[serde(default = "default_na", deserialize_with = "text_or_na")]
    pub pre_conditions: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub steps: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub step_expected_results: Vec<String>,
    #[serde(default = "default_na", deserialize_with = "text_or_na")]
    pub cleanup: String,
}

fn default_id() -> String {
    "TC_XX".to_string()
}

fn default_title() -> String {
    "Untitled".to_string()
}

fn default_na() -> String {
    "N/A".to_string()
}

fn id_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_id))
}

fn title_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_title))
}

fn text_or_na<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_na))
}

/// Accepts a JSON array of strings, a single newline-separated string, or `null`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        Some(StringOrList::One(text)) => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        Some(StringOrList::Many(items)) => items,
        None => Vec::new(),
    })
}

/// Where the Scribe put the approved draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { path: PathBuf, records: usize },
    /// Structuring failed; the draft text was written verbatim.
    RawBackup { path: PathBuf },
}

impl SaveOutcome {
    pub fn path(&self) -> &Path {
        match self {
            SaveOutcome::Saved { path, .. } | SaveOutcome::RawBackup { path } => path,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SaveOutcome::Saved { path, records } => format!(
                "Success. {} test cases saved: {}",
                records,
                path.display()
            ),
            SaveOutcome::RawBackup { path } => format!(
                "Formatting error. Approved draft saved as text backup: {}",
                path.display()
            ),
        }
    }
}

pub struct Scribe {
    generator: Arc<dyn TextGenerator>,
    deadlines: Deadlines,
    log: AgentLog,
    output_dir: PathBuf,
    excel_bom: bool,
}

impl Scribe {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        deadlines: Deadlines,
        log: AgentLog,
        output_dir: PathBuf,
        excel_bom: bool,
    ) -> Self {
        Self {
            generator,
            deadlines,
            log,
            output_dir,
            excel_bom,
        }
    }

    /// Structures and persists an approved draft. Called at most once per run.
    pub async fn save(&self, draft: &Draft) -> Result<SaveOutcome, WorkflowError> {
        if draft.is_blank() {
            return Err(WorkflowError::MissingInput {
                agent: AGENT,
                what: "an approved draft",
            });
        }
        std::fs::create_dir_all(&self.output_dir).map_err(|e| storage_error(&self.output_dir, e))?;

        let request = prompts::scribe_prompt(draft);
        self.log.stream(AGENT, "prompt", &request.merged());
        let structured = generate_with_deadline(
            self.generator.as_ref(),
            AgentRole::Scribe,
            request,
            self.deadlines.generation,
        )
        .await;

        let records = match structured {
            Ok(text) => {
                self.log.stream(AGENT, "response", &text);
                match parse_records(&text) {
                    Ok(records) => Some(records),
                    Err(e) => {
                        self.log.fallback(CallSite::Structure, &e.to_string());
                        None
                    }
                }
            }
            Err(e) => {
                self.log.fallback(CallSite::Structure, &e.to_string());
                None
            }
        };

        let stamp = timestamp();
        let outcome = match records {
            Some(records) => {
                let path = unique_path(&self.output_dir, &format!("TestCases_{}", stamp), "csv");
                write_csv(&path, &records, self.excel_bom).map_err(|e| storage_error(&path, e))?;
                SaveOutcome::Saved {
                    path,
                    records: records.len(),
                }
            }
            None => {
                let path = unique_path(&self.output_dir, &format!("raw_backup_{}", stamp), "txt");
                write_new_file(&path, |file| Ok(file.write_all(draft.as_str().as_bytes())?))
                    .map_err(|e| storage_error(&path, e))?;
                SaveOutcome::RawBackup { path }
            }
        };

        self.log
            .log(LogLevel::Info, LogCategory::Scribe, &outcome.message());
        Ok(outcome)
    }
}

fn storage_error(path: &Path, e: impl std::fmt::Display) -> WorkflowError {
    WorkflowError::StorageFailure {
        message: format!("{}: {}", path.display(), e),
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S_%3f").to_string()
}

/// `<dir>/<stem>.<ext>`, with a numeric suffix if that file already exists.
fn unique_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.{}", stem, ext));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{}_{}.{}", stem, n, ext));
        n += 1;
    }
    path
}

fn json_array_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid JSON array regex"))
}

/// Pulls the JSON list out of a chatty model response.
///
/// Takes the outermost `[...]` span; without one, strips markdown code fences.
pub fn extract_json(response: &str) -> String {
    match json_array_re().find(response) {
        Some(m) => m.as_str().to_string(),
        None => response
            .replace("```json", "")
            .replace("```", "")
            .trim()
            .to_string(),
    }
}

pub fn parse_records(response: &str) -> Result<Vec<TestCaseRecord>, serde_json::Error> {
    serde_json::from_str(&extract_json(response))
}

/// Expands records into the four-column row layout.
pub fn render_rows(records: &[TestCaseRecord]) -> Vec<[String; 4]> {
    let mut rows = Vec::new();
    for record in records {
        rows.push([
            record.id.clone(),
            record.title_merged.clone(),
            String::new(),
            String::new(),
        ]);
        rows.push([
            String::new(),
            String::new(),
            format!("Pre-conditions:\n{}", record.pre_conditions),
            String::new(),
        ]);
        let step_rows = record.steps.len().max(record.step_expected_results.len());
        for i in 0..step_rows {
            rows.push([
                String::new(),
                String::new(),
                record.steps.get(i).cloned().unwrap_or_default(),
                record
                    .step_expected_results
                    .get(i)
                    .cloned()
                    .unwrap_or_default(),
            ]);
        }
        rows.push([
            String::new(),
            String::new(),
            format!("Cleanup:\n{}", record.cleanup),
            String::new(),
        ]);
    }
    rows
}

/// Creates `path`, refusing to replace an existing file, and fills it with
/// `write`. A file left behind by a failed `write` is removed.
fn write_new_file<F>(path: &Path, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut File) -> anyhow::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let result = write(&mut file);
    drop(file);
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("failed to remove partial file {}: {}", path.display(), e);
        }
    }
    result
}

fn write_csv(path: &Path, records: &[TestCaseRecord], excel_bom: bool) -> anyhow::Result<()> {
    write_new_file(path, |file| {
        if excel_bom {
            file.write_all("\u{feff}".as_bytes())?;
        }
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(file);
        writer.write_record(CSV_HEADERS)?;
        for row in render_rows(records) {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    })
}

#[cfg(test)]
#[path = "tests/scribe_tests.rs"]
mod tests;
