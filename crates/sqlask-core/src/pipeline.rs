//! Natural language → SQL → rendered table
//!
//! Stages run strictly in order and every stage must pass before the next
//! one starts: prompt, oracle, normalizer, safety validator, intent guard,
//! executor, renderer.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{OracleError, PipelineError};
use crate::executor::QueryExecutor;
use crate::intent::{IntentGuard, CLARIFICATION_MESSAGE};
use crate::normalize::{NormalizedQuery, Normalizer};
use crate::oracle::CompletionOracle;
use crate::prompt::{GenerationSettings, TranslationRequest};
use crate::render::render_html;
use crate::safety::{SafetyValidator, Verdict};
use crate::schema::Schema;

/// Successful answer: the statement that ran and its rendered rows
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub query: NormalizedQuery,
    pub results_html: String,
    pub row_count: usize,
}

pub struct AskPipeline {
    oracle: Arc<dyn CompletionOracle>,
    executor: Arc<dyn QueryExecutor>,
    schema: Schema,
    settings: GenerationSettings,
    normalizer: Normalizer,
    validator: SafetyValidator,
    guard: IntentGuard,
}

impl AskPipeline {
    pub fn new(
        oracle: Arc<dyn CompletionOracle>,
        executor: Arc<dyn QueryExecutor>,
        schema: Schema,
        settings: GenerationSettings,
    ) -> Self {
        let guard = IntentGuard::new(&schema);
        Self {
            oracle,
            executor,
            schema,
            settings,
            normalizer: Normalizer::new(),
            validator: SafetyValidator::new(),
            guard,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Translate `utterance` into a query that passed every gate, without running it.
    pub async fn translate(&self, utterance: &str) -> Result<NormalizedQuery, PipelineError> {
        let request = TranslationRequest::new(utterance, &self.schema, self.settings.clone())?;
        info!(utterance = request.utterance(), model = %self.settings.model, "Translating request");

        let started = Instant::now();
        let candidate = self.oracle.complete(&request).await?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            candidate = %candidate,
            "Oracle answered"
        );

        if candidate.trim().is_empty() {
            return Err(OracleError::EmptyResponse.into());
        }

        let query = self.normalizer.normalize(&candidate, request.utterance());
        debug!(query = %query, "Normalized candidate");

        match self.validator.validate(&query) {
            Verdict::Safe => {}
            Verdict::UnsafeKeyword(keyword) => {
                warn!(query = %query, keyword = ?keyword, "Rejected unsafe query");
                return Err(PipelineError::UnsafeQuery {
                    query: query.into_inner(),
                    keyword,
                });
            }
            Verdict::AmbiguousFallback(template) => {
                return Err(ambiguous(query, template));
            }
        }

        match self.guard.check(&query, request.utterance()) {
            Verdict::AmbiguousFallback(template) => {
                warn!(query = %query, "Generic fallback query without explicit intent");
                Err(ambiguous(query, template))
            }
            _ => Ok(query),
        }
    }

    /// Translate, execute and render.
    pub async fn ask(&self, utterance: &str) -> Result<AskResponse, PipelineError> {
        let query = self.translate(utterance).await?;

        let rows = self.executor.execute(&query).await.map_err(|e| {
            warn!(query = %query, error = %e, "Query execution failed");
            PipelineError::Execution(e)
        })?;
        info!(query = %query, rows = rows.len(), "Query executed");

        Ok(AskResponse {
            results_html: render_html(&rows),
            row_count: rows.len(),
            query,
        })
    }
}

fn ambiguous(query: NormalizedQuery, template: String) -> PipelineError {
    PipelineError::AmbiguousIntent {
        query: query.into_inner(),
        template,
        message: CLARIFICATION_MESSAGE.to_string(),
    }
}
