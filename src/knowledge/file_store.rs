//! In-memory knowledge base built from a directory of text files.
//!
//! Ingestion reads `.txt`, `.md` and `.csv` files (recursively), splits them
//! into paragraph chunks of at most `chunk_chars` characters and indexes the
//! lower-cased terms of each chunk. Retrieval ranks chunks by the number of
//! distinct query terms they contain.

use super::{Passage, RetrievalError, Retriever};
use crate::trace_paths::short_hash;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const INGESTED_EXTENSIONS: [&str; 3] = ["txt", "md", "csv"];

struct Chunk {
    passage: Passage,
    terms: HashSet<String>,
}

pub struct FileKnowledgeBase {
    chunks: Vec<Chunk>,
    top_k: usize,
}

impl FileKnowledgeBase {
    /// Ingests every supported file under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` does not exist or a file cannot be read.
    pub fn ingest(dir: &Path, chunk_chars: usize, top_k: usize) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Knowledge base directory not found: {}", dir.display());
        }

        let mut files = Vec::new();
        collect_files(dir, &mut files)?;
        files.sort();

        let mut chunks = Vec::new();
        for path in files {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read knowledge file: {}", path.display()))?;
            let source = path
                .strip_prefix(dir)
                .unwrap_or(&path)
                .display()
                .to_string();
            let is_csv = path.extension().is_some_and(|ext| ext == "csv");
            for content in chunk_text(&text, chunk_chars.max(1), is_csv) {
                let id = short_hash(format!("{}\n{}", source, content).as_bytes());
                chunks.push(Chunk {
                    terms: terms(&content),
                    passage: Passage {
                        id,
                        source: source.clone(),
                        content,
                    },
                });
            }
        }

        Ok(Self { chunks, top_k })
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns up to `top_k` chunks sharing at least one term with the query.
    pub fn search(&self, query: &str) -> Vec<Passage> {
        let query_terms = terms(query);
        let mut scored: Vec<(usize, &Chunk)> = self
            .chunks
            .iter()
            .map(|chunk| (chunk.terms.intersection(&query_terms).count(), chunk))
            .filter(|(score, _)| *score > 0)
            .collect();
        // Stable sort keeps ingestion order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(self.top_k)
            .map(|(_, chunk)| chunk.passage.clone())
            .collect()
    }
}

#[async_trait]
impl Retriever for FileKnowledgeBase {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::Query("empty query".to_string()));
        }
        Ok(self.search(query))
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list knowledge directory: {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| INGESTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Splits text into chunks of whole paragraphs, each at most `max_chars` long.
///
/// CSV rows are treated as paragraphs. A paragraph longer than `max_chars`
/// is cut on character boundaries.
pub(crate) fn chunk_text(text: &str, max_chars: usize, rows_as_paragraphs: bool) -> Vec<String> {
    let paragraphs: Vec<String> = if rows_as_paragraphs {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    } else {
        text.split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect()
    };

    let mut chunks = Vec::new();
    let mut current = String::new();
    for paragraph in paragraphs {
        for piece in split_long(&paragraph, max_chars) {
            let needed = current.chars().count() + piece.chars().count() + 2;
            if !current.is_empty() && needed > max_chars {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(&piece);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_long(paragraph: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = paragraph.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}

/// Lower-cased alphanumeric terms of at least two characters.
pub(crate) fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
#[path = "tests/file_store_tests.rs"]
mod tests;
