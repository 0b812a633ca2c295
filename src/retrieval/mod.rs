//! Hybrid retrieval: semantic and attribute arms merged into one
//! deterministic ranking.
//!
//! Movies found by both arms get a configurable rank bonus on top of their
//! cosine score, capped at 1.0. Movies found only by the filter arm receive
//! a synthetic score strictly below the weakest semantic hit so they are
//! kept but never outrank a semantic match. Ties break by movie id.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{AttributeStore, MovieId, MovieRecord};
use crate::config::RetrievalConfig;
use crate::core::errors::AgentError;
use crate::embedding::{EmbeddingIndex, SemanticHit};
use crate::query::Intent;

/// Gap between the weakest semantic score and the synthetic score assigned
/// to filter-only candidates.
const FILTER_ONLY_GAP: f32 = 0.05;

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalCandidate {
    pub movie_id: MovieId,
    /// Cosine score in [0, 1]; `None` when the movie came from the filter
    /// arm alone.
    pub semantic_score: Option<f32>,
    pub filter_match: bool,
    /// Merged ranking score. Never exceeds 1.0.
    pub combined: f32,
}

#[derive(Debug, Default)]
pub struct RetrievalOutcome {
    /// Rank-ordered candidates, best first.
    pub candidates: Vec<RetrievalCandidate>,
    /// Record snapshots backing the candidates, keyed by id.
    pub records: BTreeMap<MovieId, MovieRecord>,
    pub semantic_degraded: bool,
    pub filter_degraded: bool,
}

pub struct HybridRetriever {
    index: Arc<dyn EmbeddingIndex>,
    store: Arc<dyn AttributeStore>,
    config: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(
        index: Arc<dyn EmbeddingIndex>,
        store: Arc<dyn AttributeStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self { index, store, config }
    }

    /// Runs both arms and merges. One arm failing degrades the result and
    /// sets the matching flag; both failing is a retrieval error.
    pub async fn retrieve(
        &self,
        query: &str,
        intent: &Intent,
    ) -> Result<RetrievalOutcome, AgentError> {
        let semantic_text = intent.params.title.as_deref().unwrap_or(query);

        let semantic = match self.index.search(semantic_text, self.config.semantic_k).await {
            Ok(hits) => Some(hits),
            Err(err) => {
                tracing::warn!("semantic arm unavailable: {}", err);
                None
            }
        };

        let filter = intent.params.to_filter();
        let filtered = if filter.is_empty() {
            Some(Vec::new())
        } else {
            match self.store.find(&filter, self.config.max_results).await {
                Ok(records) => Some(records),
                Err(err) => {
                    tracing::warn!("filter arm unavailable: {}", err);
                    None
                }
            }
        };

        if semantic.is_none() && filtered.is_none() {
            return Err(AgentError::Retrieval(
                "both retrieval arms unavailable".to_string(),
            ));
        }

        let semantic_degraded = semantic.is_none();
        let filter_degraded = filtered.is_none();
        let mut outcome = merge(
            semantic.unwrap_or_default(),
            filtered.unwrap_or_default(),
            &self.config,
        );
        outcome.semantic_degraded = semantic_degraded;
        outcome.filter_degraded = filter_degraded;

        tracing::debug!(
            "retrieved {} candidates (semantic_degraded={}, filter_degraded={})",
            outcome.candidates.len(),
            outcome.semantic_degraded,
            outcome.filter_degraded
        );
        Ok(outcome)
    }
}

fn merge(
    semantic: Vec<SemanticHit>,
    filtered: Vec<MovieRecord>,
    config: &RetrievalConfig,
) -> RetrievalOutcome {
    let mut records: BTreeMap<MovieId, MovieRecord> = BTreeMap::new();
    let mut semantic_scores: BTreeMap<MovieId, f32> = BTreeMap::new();

    for hit in semantic {
        let id = hit.record.id;
        semantic_scores.entry(id).or_insert(hit.score);
        records.entry(id).or_insert(hit.record);
    }

    let mut filter_ids: BTreeSet<MovieId> = BTreeSet::new();
    for record in filtered {
        filter_ids.insert(record.id);
        records.entry(record.id).or_insert(record);
    }

    let lowest_semantic = semantic_scores
        .values()
        .fold(None::<f32>, |low, s| match low {
            Some(l) => Some(l.min(*s)),
            None => Some(*s),
        });
    let synthetic = lowest_semantic
        .map(|low| (low - FILTER_ONLY_GAP).max(0.0))
        .unwrap_or(0.0);

    let mut candidates: Vec<RetrievalCandidate> = Vec::new();
    for (id, score) in &semantic_scores {
        let filter_match = filter_ids.contains(id);
        let combined = if filter_match {
            (score + config.filter_bonus).min(1.0)
        } else {
            *score
        };
        candidates.push(RetrievalCandidate {
            movie_id: *id,
            semantic_score: Some(*score),
            filter_match,
            combined,
        });
    }
    for id in &filter_ids {
        if semantic_scores.contains_key(id) {
            continue;
        }
        candidates.push(RetrievalCandidate {
            movie_id: *id,
            semantic_score: None,
            filter_match: true,
            combined: synthetic,
        });
    }

    candidates.sort_by(|a, b| {
        b.combined
            .partial_cmp(&a.combined)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.movie_id.cmp(&b.movie_id))
    });
    candidates.truncate(config.max_results);

    let keep: BTreeSet<MovieId> = candidates.iter().map(|c| c.movie_id).collect();
    records.retain(|id, _| keep.contains(id));

    RetrievalOutcome {
        candidates,
        records,
        semantic_degraded: false,
        filter_degraded: false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::MovieFilter;
    use crate::query::{IntentKind, QueryParams};

    fn make_movie(id: MovieId, title: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            year: 2000,
            genres: vec!["Action".to_string()],
            avg_rating: 4.0,
            plot: "test plot".to_string(),
        }
    }

    struct StubIndex {
        hits: Vec<SemanticHit>,
    }

    #[async_trait]
    impl EmbeddingIndex for StubIndex {
        async fn search(&self, _query: &str, k: usize) -> Result<Vec<SemanticHit>, AgentError> {
            let mut hits = self.hits.clone();
            hits.truncate(k);
            Ok(hits)
        }

        async fn len(&self) -> Result<usize, AgentError> {
            Ok(self.hits.len())
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl EmbeddingIndex for FailingIndex {
        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<SemanticHit>, AgentError> {
            Err(AgentError::unavailable("vector index"))
        }

        async fn len(&self) -> Result<usize, AgentError> {
            Err(AgentError::unavailable("vector index"))
        }
    }

    struct RecordingIndex {
        last_query: Mutex<Option<String>>,
    }

    #[async_trait]
    impl EmbeddingIndex for RecordingIndex {
        async fn search(&self, query: &str, _k: usize) -> Result<Vec<SemanticHit>, AgentError> {
            *self.last_query.lock().unwrap() = Some(query.to_string());
            Ok(Vec::new())
        }

        async fn len(&self) -> Result<usize, AgentError> {
            Ok(0)
        }
    }

    struct StubStore {
        movies: Vec<MovieRecord>,
    }

    #[async_trait]
    impl AttributeStore for StubStore {
        async fn find(
            &self,
            _filter: &MovieFilter,
            limit: usize,
        ) -> Result<Vec<MovieRecord>, AgentError> {
            let mut movies = self.movies.clone();
            movies.truncate(limit);
            Ok(movies)
        }

        async fn by_id(&self, id: MovieId) -> Result<Option<MovieRecord>, AgentError> {
            Ok(self.movies.iter().find(|m| m.id == id).cloned())
        }

        async fn titles(&self) -> Result<Vec<(MovieId, String)>, AgentError> {
            Ok(self.movies.iter().map(|m| (m.id, m.title.clone())).collect())
        }

        async fn count(&self) -> Result<usize, AgentError> {
            Ok(self.movies.len())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl AttributeStore for FailingStore {
        async fn find(
            &self,
            _filter: &MovieFilter,
            _limit: usize,
        ) -> Result<Vec<MovieRecord>, AgentError> {
            Err(AgentError::unavailable("attribute store"))
        }

        async fn by_id(&self, _id: MovieId) -> Result<Option<MovieRecord>, AgentError> {
            Err(AgentError::unavailable("attribute store"))
        }

        async fn titles(&self) -> Result<Vec<(MovieId, String)>, AgentError> {
            Err(AgentError::unavailable("attribute store"))
        }

        async fn count(&self) -> Result<usize, AgentError> {
            Err(AgentError::unavailable("attribute store"))
        }
    }

    fn semantic_hit(id: MovieId, title: &str, score: f32) -> SemanticHit {
        SemanticHit {
            record: make_movie(id, title),
            score,
        }
    }

    fn filtered_intent() -> Intent {
        Intent {
            kind: IntentKind::FilteredSearch,
            params: QueryParams {
                genres: vec!["Action".to_string()],
                ..Default::default()
            },
        }
    }

    fn plain_intent() -> Intent {
        Intent {
            kind: IntentKind::Unknown,
            params: QueryParams::default(),
        }
    }

    fn retriever(
        index: Arc<dyn EmbeddingIndex>,
        store: Arc<dyn AttributeStore>,
    ) -> HybridRetriever {
        HybridRetriever::new(index, store, RetrievalConfig::default())
    }

    #[tokio::test]
    async fn dual_matches_get_the_bonus_and_ties_break_by_id() {
        let index = Arc::new(StubIndex {
            hits: vec![semantic_hit(1, "A", 0.8), semantic_hit(2, "B", 0.5)],
        });
        let store = Arc::new(StubStore {
            movies: vec![make_movie(2, "B"), make_movie(3, "C")],
        });

        let outcome = retriever(index, store)
            .retrieve("action", &filtered_intent())
            .await
            .unwrap();

        let ids: Vec<MovieId> = outcome.candidates.iter().map(|c| c.movie_id).collect();
        // Movie 2 climbs to 0.8 with the bonus and ties movie 1; id breaks it.
        assert_eq!(ids, vec![1, 2, 3]);

        let dual = &outcome.candidates[1];
        assert!(dual.filter_match);
        assert!((dual.combined - 0.8).abs() < 1e-6);
        assert_eq!(dual.semantic_score, Some(0.5));

        let filter_only = &outcome.candidates[2];
        assert!(filter_only.semantic_score.is_none());
        assert!(filter_only.combined < 0.5);
    }

    #[tokio::test]
    async fn combined_rank_caps_at_one() {
        let index = Arc::new(StubIndex {
            hits: vec![semantic_hit(7, "High", 0.9)],
        });
        let store = Arc::new(StubStore {
            movies: vec![make_movie(7, "High")],
        });

        let outcome = retriever(index, store)
            .retrieve("high", &filtered_intent())
            .await
            .unwrap();

        assert!((outcome.candidates[0].combined - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn filter_only_candidates_rank_below_every_semantic_hit() {
        let index = Arc::new(StubIndex {
            hits: vec![semantic_hit(1, "A", 0.9), semantic_hit(2, "B", 0.1)],
        });
        let store = Arc::new(StubStore {
            movies: vec![make_movie(9, "F")],
        });

        let outcome = retriever(index, store)
            .retrieve("query", &filtered_intent())
            .await
            .unwrap();

        let last = outcome.candidates.last().unwrap();
        assert_eq!(last.movie_id, 9);
        assert!(last.combined < 0.1);
    }

    #[tokio::test]
    async fn identical_inputs_give_identical_orderings() {
        let index = Arc::new(StubIndex {
            hits: vec![
                semantic_hit(5, "E", 0.4),
                semantic_hit(3, "C", 0.4),
                semantic_hit(8, "H", 0.2),
            ],
        });
        let store = Arc::new(StubStore {
            movies: vec![make_movie(4, "D")],
        });
        let retriever = retriever(index, store);

        let first = retriever.retrieve("q", &filtered_intent()).await.unwrap();
        let second = retriever.retrieve("q", &filtered_intent()).await.unwrap();

        let ids: Vec<MovieId> = first.candidates.iter().map(|c| c.movie_id).collect();
        let ids_again: Vec<MovieId> = second.candidates.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, ids_again);
        // Equal scores order by id ascending.
        assert_eq!(&ids[..2], &[3, 5]);
    }

    #[tokio::test]
    async fn index_failure_degrades_to_filter_only() {
        let store = Arc::new(StubStore {
            movies: vec![make_movie(2, "B"), make_movie(1, "A")],
        });

        let outcome = retriever(Arc::new(FailingIndex), store)
            .retrieve("action", &filtered_intent())
            .await
            .unwrap();

        assert!(outcome.semantic_degraded);
        assert!(!outcome.filter_degraded);
        assert_eq!(outcome.candidates.len(), 2);
        assert!(outcome.candidates.iter().all(|c| c.semantic_score.is_none()));
        // No semantic floor to sit under; synthetic score bottoms out at zero.
        assert!(outcome.candidates.iter().all(|c| c.combined == 0.0));
        let ids: Vec<MovieId> = outcome.candidates.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_semantic_only() {
        let index = Arc::new(StubIndex {
            hits: vec![semantic_hit(1, "A", 0.6)],
        });

        let outcome = retriever(index, Arc::new(FailingStore))
            .retrieve("query", &filtered_intent())
            .await
            .unwrap();

        assert!(outcome.filter_degraded);
        assert!(!outcome.semantic_degraded);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].semantic_score, Some(0.6));
    }

    #[tokio::test]
    async fn both_arms_failing_is_a_retrieval_error() {
        let result = retriever(Arc::new(FailingIndex), Arc::new(FailingStore))
            .retrieve("query", &filtered_intent())
            .await;

        assert!(matches!(result, Err(AgentError::Retrieval(_))));
    }

    #[tokio::test]
    async fn empty_params_never_touch_the_store() {
        // The store fails on contact; with no filter params it must not be hit.
        let index = Arc::new(StubIndex {
            hits: vec![semantic_hit(1, "A", 0.3)],
        });

        let outcome = retriever(index, Arc::new(FailingStore))
            .retrieve("query", &plain_intent())
            .await
            .unwrap();

        assert!(!outcome.filter_degraded);
        assert_eq!(outcome.candidates.len(), 1);
    }

    #[tokio::test]
    async fn title_param_drives_the_semantic_query() {
        let index = Arc::new(RecordingIndex {
            last_query: Mutex::new(None),
        });
        let store = Arc::new(StubStore { movies: Vec::new() });
        let retriever = HybridRetriever::new(index.clone(), store, RetrievalConfig::default());

        let intent = Intent {
            kind: IntentKind::Lookup,
            params: QueryParams {
                title: Some("Inception".to_string()),
                ..Default::default()
            },
        };
        retriever
            .retrieve("what is the rating of Inception?", &intent)
            .await
            .unwrap();

        assert_eq!(
            index.last_query.lock().unwrap().as_deref(),
            Some("Inception")
        );
    }

    #[tokio::test]
    async fn results_truncate_to_max_results() {
        let hits: Vec<SemanticHit> = (1..=6)
            .map(|id| semantic_hit(id, "M", 0.9 - id as f32 * 0.1))
            .collect();
        let index = Arc::new(StubIndex { hits });
        let store = Arc::new(StubStore { movies: Vec::new() });

        let config = RetrievalConfig {
            max_results: 3,
            ..Default::default()
        };
        let retriever = HybridRetriever::new(index, store, config);

        let outcome = retriever.retrieve("q", &plain_intent()).await.unwrap();
        assert_eq!(outcome.candidates.len(), 3);
        assert_eq!(outcome.records.len(), 3);
    }
}
