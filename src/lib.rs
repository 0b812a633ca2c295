//! Retrieval-augmented chat over a movie catalog.
//!
//! Free-text questions are classified and mined for parameters, answered
//! from a hybrid of semantic and attribute retrieval, and grounded prompts
//! are sent to a local generation provider with a deterministic fallback.
//! An embedded ground-truth evaluation measures the whole loop.

pub mod catalog;
pub mod config;
pub mod core;
pub mod embedding;
pub mod eval;
pub mod llm;
pub mod logging;
pub mod query;
pub mod rag;
pub mod retrieval;
pub mod service;

pub use config::AppConfig;
pub use core::errors::AgentError;
pub use service::MovieService;
