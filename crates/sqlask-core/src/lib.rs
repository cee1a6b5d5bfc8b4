//! sqlask core - natural language to SQL with safety gating
//!
//! Builds the prompt for a completion oracle, rewrites the oracle's answer
//! into single-line SQLite SQL, rejects anything that is not a read-only
//! SELECT, blocks catch-all queries the user did not ask for and renders the
//! executor's rows as an HTML table.

pub mod error;
pub mod executor;
pub mod intent;
pub mod normalize;
pub mod oracle;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod safety;
pub mod schema;

pub use error::{ExecutorError, InputError, OracleError, PipelineError};
pub use executor::QueryExecutor;
pub use intent::{IntentGuard, CLARIFICATION_MESSAGE};
pub use normalize::{NormalizedQuery, Normalizer};
pub use oracle::CompletionOracle;
pub use pipeline::{AskPipeline, AskResponse};
pub use prompt::{ChatMessage, GenerationSettings, Role, TranslationRequest};
pub use render::{render_html, ResultSet, Row, EMPTY_RESULT_HTML, MISSING_CELL};
pub use safety::{MutatingKeyword, SafetyValidator, Verdict};
pub use schema::{Column, Schema, Table};
