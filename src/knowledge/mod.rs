//! Knowledge retrieval seam used by the Archivist.

pub mod file_store;

pub use file_store::FileKnowledgeBase;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// One retrieved piece of knowledge-base text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passage {
    /// Stable content hash of the chunk.
    pub id: String,
    /// File the chunk was read from.
    pub source: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalError {
    Timeout,
    Query(String),
}

impl Display for RetrievalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "retrieval timed out"),
            Self::Query(message) => write!(f, "retrieval failed: {}", message),
        }
    }
}

impl std::error::Error for RetrievalError {}

/// Free-text query to a finite, possibly empty, list of passages.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError>;
}

pub async fn retrieve_with_deadline(
    retriever: &dyn Retriever,
    query: &str,
    deadline: Duration,
) -> Result<Vec<Passage>, RetrievalError> {
    match tokio::time::timeout(deadline, retriever.retrieve(query)).await {
        Ok(result) => result,
        Err(_) => Err(RetrievalError::Timeout),
    }
}

/// Joins passage texts with blank lines.
pub fn join_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.content.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
