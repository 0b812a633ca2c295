use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{0} unavailable")]
    Unavailable(String),
    #[error("retrieval failed: {0}")]
    Retrieval(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("cancelled")]
    Cancelled,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        AgentError::Internal(err.to_string())
    }

    pub fn unavailable(component: &str) -> Self {
        AgentError::Unavailable(component.to_string())
    }
}
