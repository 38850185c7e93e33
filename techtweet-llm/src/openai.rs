use crate::sse::decode_stream;
use crate::traits::{CompletionRequest, LlmClient, LlmError, TextStream};
use crate::Provider;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use techtweet_common::require_credential;
use techtweet_http::{Auth, HttpClient, RequestOpts};

/// Completion streams can take a while to drain on long posts.
const STREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Streaming client for any OpenAI-compatible `chat/completions` endpoint
/// (Groq, OpenAI, gateways).
pub struct OpenAiCompatClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [crate::traits::ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

impl OpenAiCompatClient {
    /// Create a client against `base_url`, or the provider default when `None`.
    pub fn new(
        provider: Provider,
        api_key: String,
        model: String,
        base_url: Option<&str>,
    ) -> Result<Self, LlmError> {
        let base = base_url
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(provider.default_base_url());
        let client = HttpClient::new(base)
            .map_err(|e| LlmError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(STREAM_TIMEOUT);

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    /// Groq with its hosted Llama model, the bot's default.
    pub fn groq(api_key: String) -> Result<Self, LlmError> {
        Self::new(
            Provider::Groq,
            api_key,
            Provider::Groq.default_model().to_string(),
            None,
        )
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn stream_chat(&self, request: &CompletionRequest) -> Result<TextStream, LlmError> {
        let key = require_credential("llm.api_key", &self.api_key)
            .map_err(|e| LlmError::Unauthorized(e.to_string()))?;

        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: true,
        };

        tracing::debug!(
            model = %self.model,
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            messages = request.messages.len(),
            "llm.stream.open"
        );

        let raw = self
            .client
            .post_json_stream(
                "chat/completions",
                &body,
                RequestOpts {
                    auth: Some(Auth::Bearer(key)),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    LlmError::Unauthorized(e.to_string())
                } else {
                    LlmError::Http(e)
                }
            })?;

        Ok(decode_stream(raw))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
