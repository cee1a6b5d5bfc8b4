//! Error taxonomy for the ask pipeline
//!
//! Every variant of [`PipelineError`] is terminal for a request. Nothing is
//! retried and no partial result travels alongside an error.

use thiserror::Error;

use crate::safety::MutatingKeyword;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Query must not be empty")]
    EmptyUtterance,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Completion service unreachable: {0}")]
    Transport(String),

    #[error("Completion service rate limit reached: {0}")]
    RateLimited(String),

    #[error("Completion service rejected the request: {0}")]
    Api(String),

    #[error("Completion service did not answer within {0}s")]
    Timeout(u64),

    #[error("Completion service returned no usable content")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Error text reported by the data store, passed through verbatim
    #[error("{0}")]
    Database(String),

    #[error("Executor unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("Generated query is unsafe ({}): {query}", describe_unsafe(.keyword))]
    UnsafeQuery {
        query: String,
        keyword: Option<MutatingKeyword>,
    },

    #[error("{message}")]
    AmbiguousIntent {
        query: String,
        template: String,
        message: String,
    },

    #[error("SQL execution error: {0}")]
    Execution(#[from] ExecutorError),
}

impl PipelineError {
    /// Stable tag that lets callers tell the failure classes apart
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Input(_) => "input_error",
            PipelineError::Oracle(_) => "oracle_error",
            PipelineError::UnsafeQuery { .. } => "unsafe_query",
            PipelineError::AmbiguousIntent { .. } => "ambiguous_intent",
            PipelineError::Execution(_) => "execution_error",
        }
    }
}

fn describe_unsafe(keyword: &Option<MutatingKeyword>) -> String {
    match keyword {
        Some(kw) => format!("contains {}", kw),
        None => "not a SELECT statement".to_string(),
    }
}
