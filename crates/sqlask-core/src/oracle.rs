//! Completion oracle seam

use async_trait::async_trait;

use crate::error::OracleError;
use crate::prompt::TranslationRequest;

/// Text-completion service that turns a prompt into one candidate SQL string.
///
/// Implementations must not retry on their own; every failure is reported
/// to the caller as an [`OracleError`].
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    async fn complete(&self, request: &TranslationRequest) -> Result<String, OracleError>;
}
