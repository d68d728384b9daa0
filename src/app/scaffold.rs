//! `trace init`: lays out a working directory for the workflow.

use crate::config::WorkflowConfig;
use crate::trace_paths::resolve_dir;
use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "workflow.yaml";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub created: Vec<PathBuf>,
    pub existing: Vec<PathBuf>,
}

impl ScaffoldReport {
    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = self
            .created
            .iter()
            .map(|p| format!("Created: {}", p.display()))
            .collect();
        lines.extend(
            self.existing
                .iter()
                .map(|p| format!("Exists:  {}", p.display())),
        );
        lines.push("Project structure is ready.".to_string());
        lines.join("\n")
    }
}

/// Creates the output and knowledge directories named by `config`, a starter
/// `workflow.yaml` and a `.gitignore` for generated files.
///
/// Existing entries are left untouched unless `force` is set, in which case
/// `workflow.yaml` is rewritten from the built-in defaults.
pub fn init(working_dir: &Path, config: &WorkflowConfig, force: bool) -> Result<ScaffoldReport> {
    let mut report = ScaffoldReport::default();

    for dir in [&config.output.dir, &config.knowledge_base.dir] {
        let path = resolve_dir(working_dir, dir);
        if path.is_dir() {
            report.existing.push(path);
        } else {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            report.created.push(path);
        }
    }

    let config_path = working_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        report.existing.push(config_path);
    } else {
        write_file(&config_path, WorkflowConfig::default_yaml())?;
        report.created.push(config_path);
    }

    let gitignore = working_dir.join(".gitignore");
    if gitignore.exists() {
        report.existing.push(gitignore);
    } else if let Some(entries) = gitignore_entries(working_dir, &config.output.dir) {
        write_file(&gitignore, &entries)?;
        report.created.push(gitignore);
    }

    Ok(report)
}

/// Ignore patterns for generated CSV files and raw backups, relative to
/// `working_dir`. `None` when the output directory lives outside it.
fn gitignore_entries(working_dir: &Path, output_dir: &Path) -> Option<String> {
    let relative = if output_dir.is_absolute() {
        output_dir.strip_prefix(working_dir).ok()?
    } else {
        output_dir
    };
    let prefix = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    if prefix.is_empty() {
        Some("*.csv\n*.txt\n".to_string())
    } else {
        Some(format!("{prefix}/*.csv\n{prefix}/*.txt\n"))
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
#[path = "tests/scaffold_tests.rs"]
mod tests;
