use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TRACE_AUTOGEN_GIT_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "trace")]
#[command(about = "Turns a user story into reviewed test cases exported as CSV")]
#[command(version, long_version = LONG_VERSION)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// The user story (all arguments are joined). Read from stdin when omitted.
    #[arg(trailing_var_arg = true)]
    pub story: Vec<String>,

    /// Read the user story from a file
    #[arg(short, long, conflicts_with = "story")]
    pub input_file: Option<PathBuf>,

    /// Workflow configuration (defaults to ./workflow.yaml, then the built-in config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Working directory (defaults to current directory)
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Override policy.max_attempts
    #[arg(short, long)]
    pub max_attempts: Option<u32>,

    /// Override knowledge_base.dir
    #[arg(long)]
    pub kb_dir: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress progress lines on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the output and knowledge directories and a starter workflow.yaml
    Init {
        /// Overwrite an existing workflow.yaml
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn working_dir(&self) -> Result<PathBuf> {
        match self.working_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to get current directory"),
        }
    }

    /// Resolves the story from `--input-file`, the positional words or stdin.
    pub fn story_text(&self) -> Result<String> {
        let story = if let Some(ref path) = self.input_file {
            read_story_file(path)?
        } else if !self.story.is_empty() {
            self.story.join(" ")
        } else if !std::io::stdin().is_terminal() {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read user story from stdin")?;
            buffer
        } else {
            String::new()
        };

        if story.trim().is_empty() {
            bail!("No user story provided. Pass it as arguments, with --input-file, or on stdin.");
        }
        Ok(story)
    }
}

fn read_story_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
