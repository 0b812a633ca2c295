//! Staged chat orchestration with a deterministic fallback path.

mod orchestrator;

pub use orchestrator::{
    AnswerPath, ChatOutcome, ChatRequest, DegradedMode, RagOrchestrator,
};
