//! Scripted collaborators for unit tests.

use crate::knowledge::{Passage, RetrievalError, Retriever};
use crate::llm::{AgentRole, GenerationError, PromptRequest, TextGenerator};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

type Scripted = Result<String, GenerationError>;

/// Generator that replays queued responses per role and records every prompt.
///
/// When a role's queue is empty its repeat response (if any) is returned,
/// otherwise the call fails with `InvalidResponse`.
#[derive(Default)]
pub struct ScriptedGenerator {
    queues: Mutex<HashMap<AgentRole, VecDeque<Scripted>>>,
    repeat: Mutex<HashMap<AgentRole, Scripted>>,
    calls: Mutex<Vec<(AgentRole, PromptRequest)>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, role: AgentRole, text: &str) -> Self {
        self.push(role, Ok(text.to_string()))
    }

    pub fn fail(self, role: AgentRole, error: GenerationError) -> Self {
        self.push(role, Err(error))
    }

    pub fn always(self, role: AgentRole, text: &str) -> Self {
        self.repeat
            .lock()
            .expect("repeat lock")
            .insert(role, Ok(text.to_string()));
        self
    }

    pub fn always_fail(self, role: AgentRole, error: GenerationError) -> Self {
        self.repeat.lock().expect("repeat lock").insert(role, Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(self, role: AgentRole, response: Scripted) -> Self {
        self.queues
            .lock()
            .expect("queue lock")
            .entry(role)
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls_for(&self, role: AgentRole) -> usize {
        self.prompts_for(role).len()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    pub fn prompts_for(&self, role: AgentRole) -> Vec<PromptRequest> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, role: AgentRole, request: PromptRequest) -> Scripted {
        self.calls
            .lock()
            .expect("calls lock")
            .push((role, request));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let queued = self
            .queues
            .lock()
            .expect("queue lock")
            .get_mut(&role)
            .and_then(|q| q.pop_front());
        match queued {
            Some(response) => response,
            None => self
                .repeat
                .lock()
                .expect("repeat lock")
                .get(&role)
                .cloned()
                .unwrap_or_else(|| {
                    Err(GenerationError::InvalidResponse(format!(
                        "no scripted response for {}",
                        role
                    )))
                }),
        }
    }
}

/// Retriever answering from fixed rules keyed by a query substring.
#[derive(Default)]
pub struct StaticRetriever {
    rules: Vec<(String, Vec<Passage>)>,
    failure: Option<RetrievalError>,
    queries: Mutex<Vec<String>>,
}

impl StaticRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries containing `needle` return `texts` as passages.
    pub fn on(mut self, needle: &str, texts: &[&str]) -> Self {
        let passages = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Passage {
                id: format!("p{}", i),
                source: "static".to_string(),
                content: text.to_string(),
            })
            .collect();
        self.rules.push((needle.to_string(), passages));
        self
    }

    pub fn failing(mut self, error: RetrievalError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.to_string());
        if let Some(ref error) = self.failure {
            return Err(error.clone());
        }
        Ok(self
            .rules
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, passages)| passages.clone())
            .unwrap_or_default())
    }
}
