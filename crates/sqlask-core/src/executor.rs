//! Data store seam

use async_trait::async_trait;

use crate::error::ExecutorError;
use crate::normalize::NormalizedQuery;
use crate::render::ResultSet;

/// Runs one validated, read-only statement.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &NormalizedQuery) -> Result<ResultSet, ExecutorError>;
}
