//! OpenAI-backed completion oracle

use std::time::{Duration, Instant};

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use prometheus::Histogram;
use sqlask_core::{CompletionOracle, OracleError, Role, TranslationRequest};

pub struct OpenAiOracle {
    client: Client<OpenAIConfig>,
    timeout: Duration,
    latency: Option<Histogram>,
}

impl OpenAiOracle {
    /// The client's built-in retry on rate limits is switched off: every
    /// request reaches the API at most once.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Self {
            client: Client::with_config(config).with_backoff(no_retry),
            timeout,
            latency: None,
        }
    }

    pub fn with_latency_histogram(mut self, histogram: Histogram) -> Self {
        self.latency = Some(histogram);
        self
    }
}

#[async_trait]
impl CompletionOracle for OpenAiOracle {
    async fn complete(&self, request: &TranslationRequest) -> Result<String, OracleError> {
        let settings = request.settings();
        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(settings.model.as_str())
            .messages(to_openai_messages(request)?)
            .temperature(settings.temperature)
            .max_completion_tokens(settings.max_tokens)
            .build()
            .map_err(map_openai_error)?;

        let started = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(chat_request))
            .await
            .map_err(|_| OracleError::Timeout(self.timeout.as_secs()))?
            .map_err(map_openai_error)?;

        let elapsed = started.elapsed();
        if let Some(histogram) = &self.latency {
            histogram.observe(elapsed.as_secs_f64());
        }

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or(OracleError::EmptyResponse)?;

        tracing::info!(
            model = %settings.model,
            elapsed_ms = elapsed.as_millis() as u64,
            "LLM response: {}",
            content
        );

        Ok(content.to_string())
    }
}

fn to_openai_messages(
    request: &TranslationRequest,
) -> Result<Vec<ChatCompletionRequestMessage>, OracleError> {
    request
        .messages()
        .iter()
        .map(|message| {
            let built = match message.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map(ChatCompletionRequestMessage::System),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map(ChatCompletionRequestMessage::User),
            };
            built.map_err(map_openai_error)
        })
        .collect()
}

fn map_openai_error(err: OpenAIError) -> OracleError {
    match err {
        OpenAIError::Reqwest(e) => OracleError::Transport(e.to_string()),
        OpenAIError::ApiError(api) if api.message.to_lowercase().contains("rate limit") => {
            OracleError::RateLimited(api.message)
        }
        OpenAIError::ApiError(api) => OracleError::Api(api.message),
        other => OracleError::Api(other.to_string()),
    }
}
