//! Search orchestration: upstream search, type resolution, classification.

use std::collections::HashSet;

use clap::ValueEnum;
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{Candidate, EntityId, Hit, TypePolicy};
use crate::repositories::TypeRepository;
use crate::services::classifier::{classify, Classification};

/// Upper bound on concurrent type-resolution requests.
pub const MAX_CONCURRENCY: usize = 16;

/// What a search does when one candidate's types cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Fail the whole search with the first error, in upstream order.
    #[default]
    Abort,
    /// Log the error and drop the candidate.
    Skip,
}

/// Per-call search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Candidates requested from the upstream search.
    pub limit: usize,
    pub resolution: ResolutionMode,
    /// Concurrent type resolutions, clamped to `1..=MAX_CONCURRENCY`.
    pub concurrency: usize,
    /// Keep accepted candidates with no required or allowed type. Off by
    /// default: with a non-empty allow-list, a hit must carry one of its types.
    pub keep_unmatched: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl SearchOptions {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            limit: config.limit,
            resolution: config.on_error,
            concurrency: config.concurrency,
            keep_unmatched: config.keep_unmatched,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_resolution(mut self, resolution: ResolutionMode) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_keep_unmatched(mut self, keep_unmatched: bool) -> Self {
        self.keep_unmatched = keep_unmatched;
        self
    }

    fn width(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }
}

/// Service running policy-filtered entity searches.
#[derive(FromContext, Clone)]
pub struct SearchService {
    graph: AppGraph,
    types: TypeRepository,
}

impl SearchService {
    /// Searches for entities matching `query` and keeps those the policy accepts.
    ///
    /// Hits come back in upstream relevance order with duplicates removed
    /// (first occurrence wins). Candidates are deduplicated before any type
    /// resolution starts; resolutions then run concurrently and are
    /// reassembled in order. Dropping the returned future abandons every
    /// in-flight request and yields nothing.
    pub async fn search(
        &self,
        query: &str,
        policy: &TypePolicy,
        options: &SearchOptions,
    ) -> Result<Vec<Hit>, AppError> {
        if options.limit == 0 {
            return Ok(Vec::new());
        }

        let candidates = self.graph.search_entities(query, options.limit).await?;
        let total = candidates.len();

        let mut seen = HashSet::new();
        let unique: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();
        let duplicates = total - unique.len();

        let types = &self.types;
        let mut resolved = stream::iter(unique)
            .map(|candidate| async move {
                let result = types.resolve_types(&candidate.id).await;
                (candidate, result)
            })
            .buffered(options.width());

        let mut hits = Vec::new();
        let mut rejected = 0usize;
        let mut unmatched = 0usize;
        let mut skipped = 0usize;
        let needs_match = !options.keep_unmatched && !policy.allow().is_empty();

        while let Some((candidate, result)) = resolved.next().await {
            let resolved_types = match (result, options.resolution) {
                (Ok(types), _) => types,
                (Err(err), ResolutionMode::Abort) => return Err(err),
                (Err(err), ResolutionMode::Skip) => {
                    tracing::warn!(id = %candidate.id, error = %err, "Skipping unresolved candidate");
                    skipped += 1;
                    continue;
                }
            };

            match classify(&resolved_types, policy) {
                Classification::Accepted(matched) if needs_match && matched.is_empty() => {
                    tracing::debug!(id = %candidate.id, label = %candidate.label, "No allowed type matched");
                    unmatched += 1;
                }
                Classification::Accepted(matched) => hits.push(Hit::new(candidate, matched)),
                Classification::Rejected => {
                    tracing::debug!(id = %candidate.id, label = %candidate.label, "Rejected by type policy");
                    rejected += 1;
                }
            }
        }

        tracing::info!(
            query,
            candidates = total,
            duplicates,
            rejected,
            unmatched,
            skipped,
            hits = hits.len(),
            "Search complete"
        );

        Ok(hits)
    }

    /// Resolves and classifies a single known entity.
    pub async fn classify_entity(
        &self,
        id: &EntityId,
        policy: &TypePolicy,
    ) -> Result<Classification, AppError> {
        let types = self.types.resolve_types(id).await?;
        Ok(classify(&types, policy))
    }
}
