//! In-memory backend serving canned responses to unit tests.
//!
//! SELECT and ASK answers are keyed by the entity bound to a named
//! parameter (e.g. `item = Q42`), so tests never depend on query text.
//! Queries are still rendered, so unbound or malformed parameters fail
//! the same way they would against a live endpoint.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::query::{render, Params, Term};
use crate::graph::row::{Binding, Row, RowStream};
use crate::graph::traits::{ContentFetcher, EntitySearcher, SparqlExecutor};
use crate::models::{Candidate, EntityId};

type Key = (String, EntityId);

#[derive(Default)]
pub struct MockGraph {
    candidates: Vec<Candidate>,
    search_error: bool,
    rows: HashMap<Key, Vec<Row>>,
    answers: HashMap<Key, bool>,
    failing: HashSet<EntityId>,
    delays: HashMap<EntityId, Duration>,
    extracts: HashMap<String, String>,
    failing_extracts: HashSet<String>,
    queried: Mutex<Vec<EntityId>>,
    search_limits: Mutex<Vec<usize>>,
}

impl MockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upstream search results, in relevance order.
    pub fn with_candidates(mut self, candidates: Vec<Candidate>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_search_error(mut self) -> Self {
        self.search_error = true;
        self
    }

    /// Type closure rows for `item = id`.
    pub fn with_types(self, id: &str, types: &[(&str, &str)]) -> Self {
        let rows = types
            .iter()
            .map(|(tid, label)| {
                Row::from_pairs([
                    ("type", Binding::uri(EntityId::from(*tid).uri())),
                    ("typeLabel", Binding::lang_literal(*label, "en")),
                ])
            })
            .collect();
        self.with_rows("item", id, rows)
    }

    /// Arbitrary rows for queries binding `param = id`.
    pub fn with_rows(mut self, param: &str, id: &str, rows: Vec<Row>) -> Self {
        self.rows
            .insert((param.to_string(), EntityId::from(id)), rows);
        self
    }

    pub fn with_answer(mut self, param: &str, id: &str, answer: bool) -> Self {
        self.answers
            .insert((param.to_string(), EntityId::from(id)), answer);
        self
    }

    /// Any query binding this id fails with a transport error.
    pub fn with_failure(mut self, id: &str) -> Self {
        self.failing.insert(EntityId::from(id));
        self
    }

    /// Queries binding this id complete only after `millis`.
    pub fn with_delay(mut self, id: &str, millis: u64) -> Self {
        self.delays
            .insert(EntityId::from(id), Duration::from_millis(millis));
        self
    }

    pub fn with_extract(mut self, title: &str, text: &str) -> Self {
        self.extracts.insert(title.to_string(), text.to_string());
        self
    }

    pub fn with_failing_extract(mut self, title: &str) -> Self {
        self.failing_extracts.insert(title.to_string());
        self
    }

    /// Entities queried so far, in call order.
    pub fn queried(&self) -> Vec<EntityId> {
        self.queried.lock().unwrap().clone()
    }

    pub fn search_limits(&self) -> Vec<usize> {
        self.search_limits.lock().unwrap().clone()
    }

    async fn lookup(&self, params: &Params) -> Result<Option<Key>, AppError> {
        for (name, term) in params {
            if let Term::Entity(id) = term {
                self.queried.lock().unwrap().push(id.clone());
                if let Some(delay) = self.delays.get(id) {
                    tokio::time::sleep(*delay).await;
                }
                if self.failing.contains(id) {
                    return Err(AppError::transport("mock", format!("{} unavailable", id)));
                }
                return Ok(Some((name.clone(), id.clone())));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl SparqlExecutor for MockGraph {
    async fn execute_sparql(
        &self,
        sparql: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        render(sparql, &params)?;
        let rows = match self.lookup(&params).await? {
            Some(key) => self.rows.get(&key).cloned().unwrap_or_default(),
            None => Vec::new(),
        };
        Ok(Box::pin(futures::stream::iter(rows.into_iter().map(Ok::<Row, AppError>))))
    }

    async fn ask_sparql(&self, sparql: &str, params: Params) -> Result<bool, AppError> {
        render(sparql, &params)?;
        Ok(match self.lookup(&params).await? {
            Some(key) => self.answers.get(&key).copied().unwrap_or(false),
            None => false,
        })
    }
}

#[async_trait]
impl EntitySearcher for MockGraph {
    async fn search_entities(&self, _text: &str, limit: usize) -> Result<Vec<Candidate>, AppError> {
        self.search_limits.lock().unwrap().push(limit);
        if self.search_error {
            return Err(AppError::transport("mock-search", "connection refused"));
        }
        Ok(self.candidates.iter().take(limit).cloned().collect())
    }
}

#[async_trait]
impl ContentFetcher for MockGraph {
    async fn fetch_extract(&self, title_or_url: &str) -> Result<Option<String>, AppError> {
        if self.failing_extracts.contains(title_or_url) {
            return Err(AppError::transport("mock-wiki", "timed out"));
        }
        Ok(self.extracts.get(title_or_url).cloned())
    }
}
