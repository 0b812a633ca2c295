//! Service facade that wires the catalog, vector index, retriever,
//! orchestrator, and evaluation pipeline behind one API surface.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;

use crate::catalog::{
    seed_catalog, AttributeStore, InMemoryCatalog, MovieFilter, MovieId, MovieRecord,
};
use crate::config::AppConfig;
use crate::core::errors::AgentError;
use crate::embedding::{EmbeddingIndex, HashedEmbedder, InMemoryVectorIndex, SemanticHit};
use crate::eval::{EvaluationPipeline, EvaluationReport};
use crate::llm::{GenerationProvider, OllamaProvider};
use crate::query::QueryProcessor;
use crate::rag::{ChatOutcome, ChatRequest, RagOrchestrator};
use crate::retrieval::HybridRetriever;

/// Per-component reachability snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub attribute_store: bool,
    pub embedding_index: bool,
    pub generation: bool,
}

impl HealthStatus {
    pub fn healthy(&self) -> bool {
        self.attribute_store && self.embedding_index && self.generation
    }
}

pub struct MovieService {
    store: Arc<dyn AttributeStore>,
    index: Arc<dyn EmbeddingIndex>,
    provider: Arc<dyn GenerationProvider>,
    orchestrator: RagOrchestrator,
    config: AppConfig,
}

impl MovieService {
    /// Wires the embedded seed catalog, a hashed-embedding index over it,
    /// and the Ollama provider from `config`.
    pub fn seeded(config: AppConfig) -> Result<Self, AgentError> {
        let records = seed_catalog();
        let store = Arc::new(InMemoryCatalog::new(records.clone())?);
        let embedder = Arc::new(HashedEmbedder::new(config.retrieval.embedding_dim));
        let index = Arc::new(InMemoryVectorIndex::build(embedder, &records)?);
        let provider = Arc::new(OllamaProvider::new(&config.generation));
        let titles = records.iter().map(|m| m.title.clone()).collect();
        Ok(Self::new(store, index, provider, titles, config))
    }

    /// Assembles a service from injected collaborators.
    pub fn new(
        store: Arc<dyn AttributeStore>,
        index: Arc<dyn EmbeddingIndex>,
        provider: Arc<dyn GenerationProvider>,
        known_titles: Vec<String>,
        config: AppConfig,
    ) -> Self {
        let retriever =
            HybridRetriever::new(index.clone(), store.clone(), config.retrieval.clone());
        let orchestrator = RagOrchestrator::new(
            QueryProcessor::new(known_titles),
            retriever,
            provider.clone(),
            store.clone(),
            config.generation.clone(),
        );
        Self {
            store,
            index,
            provider,
            orchestrator,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Answer a chat turn.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome, AgentError> {
        self.orchestrator.chat(request).await
    }

    /// Answer a chat turn the caller can abandon by firing `cancel`.
    pub async fn chat_with_cancel(
        &self,
        request: ChatRequest,
        cancel: oneshot::Receiver<()>,
    ) -> Result<ChatOutcome, AgentError> {
        self.orchestrator.chat_with_cancel(request, cancel).await
    }

    /// Attribute-filtered catalog search, rating-descending.
    pub async fn search(
        &self,
        filter: &MovieFilter,
        limit: usize,
    ) -> Result<Vec<MovieRecord>, AgentError> {
        self.store.find(filter, limit).await
    }

    /// Raw semantic neighbors for a free-text query.
    pub async fn semantic(&self, text: &str, k: usize) -> Result<Vec<SemanticHit>, AgentError> {
        self.index.search(text, k).await
    }

    pub async fn movie(&self, id: MovieId) -> Result<Option<MovieRecord>, AgentError> {
        self.store.by_id(id).await
    }

    /// Runs the embedded ground-truth evaluation and returns the report.
    pub async fn evaluate(&self) -> Result<EvaluationReport, AgentError> {
        let pipeline = EvaluationPipeline::new(
            &self.orchestrator,
            self.store.clone(),
            self.config.evaluation.clone(),
        )
        .await?;
        pipeline.run().await
    }

    /// Component reachability. A provider probe failure reads as unhealthy,
    /// never as an error.
    pub async fn health(&self) -> HealthStatus {
        let attribute_store = self.store.count().await.is_ok();
        let embedding_index = self.index.len().await.is_ok();
        let generation = self.provider.health_check().await.unwrap_or(false);
        HealthStatus {
            attribute_store,
            embedding_index,
            generation,
        }
    }
}
