pub mod errors;

pub use errors::AgentError;
