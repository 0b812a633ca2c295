//! Vector index over catalog records.
//!
//! The index mirrors each `MovieRecord` alongside its embedding so that
//! semantic hits carry full records even when the attribute store is down.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::{cosine_similarity, Embedder};
use crate::catalog::MovieRecord;
use crate::core::errors::AgentError;

#[derive(Debug, Clone, Serialize)]
pub struct SemanticHit {
    pub record: MovieRecord,
    /// Cosine similarity in [0, 1].
    pub score: f32,
}

#[async_trait]
pub trait EmbeddingIndex: Send + Sync {
    /// Top-k neighbors of the query text, score-descending. Zero-score
    /// entries are not semantic matches and are never returned.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SemanticHit>, AgentError>;

    async fn len(&self) -> Result<usize, AgentError>;
}

pub struct InMemoryVectorIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<(MovieRecord, Vec<f32>)>,
}

impl InMemoryVectorIndex {
    /// Embeds every record up front. Each vector corresponds to exactly one
    /// record; a duplicate id would orphan a vector and is rejected.
    pub fn build(
        embedder: Arc<dyn Embedder>,
        records: &[MovieRecord],
    ) -> Result<Self, AgentError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.id) {
                return Err(AgentError::BadRequest(format!(
                    "duplicate movie id {} in vector index",
                    record.id
                )));
            }
            let vector = embedder.embed(&record.embedding_text());
            entries.push((record.clone(), vector));
        }

        Ok(Self { embedder, entries })
    }
}

#[async_trait]
impl EmbeddingIndex for InMemoryVectorIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SemanticHit>, AgentError> {
        let query_vector = self.embedder.embed(query);

        let mut hits: Vec<SemanticHit> = self
            .entries
            .iter()
            .map(|(record, vector)| SemanticHit {
                record: record.clone(),
                score: cosine_similarity(&query_vector, vector),
            })
            .filter(|hit| hit.score > 0.0)
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.record.id.cmp(&b.record.id))
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn len(&self) -> Result<usize, AgentError> {
        Ok(self.entries.len())
    }
}
