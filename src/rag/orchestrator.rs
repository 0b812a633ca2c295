// RAG orchestrator.
//
// Runs a chat turn through an explicit stage machine:
//
//   Parse -> Retrieve -> Generate -> Done
//                 \          \
//                  +-> Fallback -> Done
//
// Retrieve branches to Fallback when no context survives the merge;
// Generate branches to Fallback when the provider fails, times out, or
// returns an empty completion. Fallback always produces an answer from
// the retrieved records, so a chat turn only errors when retrieval
// itself collapses or the caller cancels.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::catalog::{AttributeStore, MovieId, MovieRecord};
use crate::config::GenerationConfig;
use crate::core::errors::AgentError;
use crate::llm::{build_prompt, GenerationProvider, GenerationRequest};
use crate::query::{Intent, IntentKind, QueryProcessor};
use crate::retrieval::HybridRetriever;

/// A single chat turn. `conversation_id` is minted when absent so callers
/// can correlate follow-up turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
        }
    }
}

/// How the response text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerPath {
    Generated,
    Fallback,
}

impl AnswerPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerPath::Generated => "generated",
            AnswerPath::Fallback => "fallback",
        }
    }
}

/// Degradations encountered while answering. An outcome can carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedMode {
    SemanticUnavailable,
    FilterUnavailable,
    GenerationUnavailable,
    NoContext,
}

impl DegradedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradedMode::SemanticUnavailable => "semantic_unavailable",
            DegradedMode::FilterUnavailable => "filter_unavailable",
            DegradedMode::GenerationUnavailable => "generation_unavailable",
            DegradedMode::NoContext => "no_context",
        }
    }
}

/// Completed chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub response: String,
    pub path: AnswerPath,
    pub intent: IntentKind,
    /// Movie ids that backed the answer, best first.
    pub context: Vec<MovieId>,
    pub degraded: Vec<DegradedMode>,
    pub conversation_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Parse,
    Retrieve,
    Generate,
    Fallback,
    Done,
}

impl Stage {
    fn as_str(&self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Retrieve => "retrieve",
            Stage::Generate => "generate",
            Stage::Fallback => "fallback",
            Stage::Done => "done",
        }
    }
}

/// Working state threaded through the stages of one turn.
struct ChatState {
    query: String,
    conversation_id: String,
    intent: Intent,
    context: Vec<MovieRecord>,
    degraded: Vec<DegradedMode>,
    response: Option<String>,
    path: AnswerPath,
}

impl ChatState {
    fn new(query: String, conversation_id: String) -> Self {
        Self {
            query,
            conversation_id,
            intent: Intent::default(),
            context: Vec::new(),
            degraded: Vec::new(),
            response: None,
            path: AnswerPath::Fallback,
        }
    }

    fn into_outcome(self) -> ChatOutcome {
        ChatOutcome {
            response: self.response.unwrap_or_default(),
            path: self.path,
            intent: self.intent.kind,
            context: self.context.iter().map(|record| record.id).collect(),
            degraded: self.degraded,
            conversation_id: self.conversation_id,
        }
    }
}

/// Drives one chat turn end to end. Holds the query processor, the hybrid
/// retriever, and the generation provider; the attribute store is kept
/// around to refresh context records just before prompting.
pub struct RagOrchestrator {
    processor: QueryProcessor,
    retriever: HybridRetriever,
    provider: Arc<dyn GenerationProvider>,
    store: Arc<dyn AttributeStore>,
    config: GenerationConfig,
}

impl RagOrchestrator {
    pub fn new(
        processor: QueryProcessor,
        retriever: HybridRetriever,
        provider: Arc<dyn GenerationProvider>,
        store: Arc<dyn AttributeStore>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            processor,
            retriever,
            provider,
            store,
            config,
        }
    }

    /// Answer a chat turn.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome, AgentError> {
        self.run(request, None).await
    }

    /// Answer a chat turn that the caller can abandon. Firing the sender
    /// cancels the turn; merely dropping it does not.
    pub async fn chat_with_cancel(
        &self,
        request: ChatRequest,
        cancel: oneshot::Receiver<()>,
    ) -> Result<ChatOutcome, AgentError> {
        self.run(request, Some(cancel)).await
    }

    async fn run(
        &self,
        request: ChatRequest,
        mut cancel: Option<oneshot::Receiver<()>>,
    ) -> Result<ChatOutcome, AgentError> {
        let conversation_id = request
            .conversation_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut state = ChatState::new(request.message, conversation_id);

        let mut stage = Stage::Parse;
        loop {
            tracing::debug!(stage = stage.as_str(), "chat stage");
            stage = match stage {
                Stage::Parse => self.parse(&mut state),
                Stage::Retrieve => self.retrieve(&mut state).await,
                Stage::Generate => self.generate(&mut state, &mut cancel).await?,
                Stage::Fallback => self.fallback(&mut state),
                Stage::Done => break,
            };
        }

        tracing::info!(
            intent = state.intent.kind.as_str(),
            path = state.path.as_str(),
            context = state.context.len(),
            "chat turn complete"
        );
        Ok(state.into_outcome())
    }

    fn parse(&self, state: &mut ChatState) -> Stage {
        state.intent = self.processor.process(&state.query);
        Stage::Retrieve
    }

    async fn retrieve(&self, state: &mut ChatState) -> Stage {
        let outcome = match self.retriever.retrieve(&state.query, &state.intent).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("retrieval failed, answering without context: {err}");
                state.degraded.push(DegradedMode::NoContext);
                return Stage::Fallback;
            }
        };

        if outcome.semantic_degraded {
            state.degraded.push(DegradedMode::SemanticUnavailable);
        }
        if outcome.filter_degraded {
            state.degraded.push(DegradedMode::FilterUnavailable);
        }
        if outcome.candidates.is_empty() {
            state.degraded.push(DegradedMode::NoContext);
            return Stage::Fallback;
        }

        // Refresh each context record from the attribute store so the prompt
        // sees current metadata; a stale index snapshot is still good enough
        // when the store is unreachable.
        let mut records = Vec::new();
        for candidate in outcome.candidates.iter().take(self.config.max_context) {
            let refreshed = self
                .store
                .by_id(candidate.movie_id)
                .await
                .ok()
                .flatten();
            match refreshed.or_else(|| outcome.records.get(&candidate.movie_id).cloned()) {
                Some(record) => records.push(record),
                None => {
                    tracing::warn!(movie_id = candidate.movie_id, "candidate has no backing record");
                }
            }
        }

        if records.is_empty() {
            state.degraded.push(DegradedMode::NoContext);
            return Stage::Fallback;
        }
        state.context = records;
        Stage::Generate
    }

    async fn generate(
        &self,
        state: &mut ChatState,
        cancel: &mut Option<oneshot::Receiver<()>>,
    ) -> Result<Stage, AgentError> {
        let request = GenerationRequest {
            prompt: build_prompt(&state.query, &state.context),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        let budget = self.config.timeout();

        let result = tokio::select! {
            _ = wait_cancelled(cancel) => {
                tracing::info!("chat turn cancelled by caller");
                return Err(AgentError::Cancelled);
            }
            result = tokio::time::timeout(budget, self.provider.generate(&request)) => result,
        };

        match result {
            Err(_) => {
                tracing::warn!("generation timed out after {budget:?}");
                state.degraded.push(DegradedMode::GenerationUnavailable);
                Ok(Stage::Fallback)
            }
            Ok(Err(err)) => {
                tracing::warn!("generation failed: {err}");
                state.degraded.push(DegradedMode::GenerationUnavailable);
                Ok(Stage::Fallback)
            }
            Ok(Ok(text)) if text.trim().is_empty() => {
                tracing::warn!("provider returned an empty completion");
                state.degraded.push(DegradedMode::GenerationUnavailable);
                Ok(Stage::Fallback)
            }
            Ok(Ok(text)) => {
                state.response = Some(text);
                state.path = AnswerPath::Generated;
                Ok(Stage::Done)
            }
        }
    }

    fn fallback(&self, state: &mut ChatState) -> Stage {
        state.response = Some(fallback_response(state.intent.kind, &state.context));
        state.path = AnswerPath::Fallback;
        Stage::Done
    }
}

/// Resolves only when the caller fires the cancel sender. A missing
/// receiver, or one whose sender was dropped without firing, never
/// resolves, so generation proceeds undisturbed.
async fn wait_cancelled(cancel: &mut Option<oneshot::Receiver<()>>) {
    match cancel {
        Some(rx) => match rx.await {
            Ok(()) => {}
            Err(_) => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

/// Template answer assembled from retrieved records when generation is
/// unavailable. Deterministic on purpose.
fn fallback_response(kind: IntentKind, records: &[MovieRecord]) -> String {
    let Some(best) = records.first() else {
        return "I couldn't find any movies matching your request. \
                Try a different title, genre, or year."
            .to_string();
    };

    match kind {
        IntentKind::Recommend | IntentKind::Compare => {
            let listed: Vec<String> = records
                .iter()
                .take(3)
                .map(|movie| format!("{} (rated {:.2})", movie.title, movie.avg_rating))
                .collect();
            format!("Based on your request, you might enjoy: {}.", listed.join(", "))
        }
        _ => format!(
            "{} ({}) is a {} movie with an average rating of {:.2}.",
            best.title,
            best.year,
            best.genres.join(", "),
            best.avg_rating
        ),
    }
}
