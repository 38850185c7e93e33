use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use techtweet_http::HttpError;

/// One chat message in an OpenAI-style conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Parameters for a single streamed completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// A request carrying one user message, which is all the bot ever sends.
    pub fn single_user(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            temperature,
            max_tokens,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("API error: {0}")]
    Api(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("completion was empty")]
    EmptyCompletion,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Finite, forward-only stream of text fragments in arrival order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Open a streamed completion. Errors before the first fragment (auth,
    /// status) come back here; later failures arrive as `Err` items.
    async fn stream_chat(&self, request: &CompletionRequest) -> Result<TextStream, LlmError>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Stream a completion and fold it into one trimmed string.
    ///
    /// A completion that is blank after trimming is an error: nothing
    /// downstream may publish an empty message.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let stream = self.stream_chat(request).await?;
        let text = collect_text(stream).await?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(trimmed.to_string())
    }
}

/// Concatenate every fragment; the first error aborts the fold.
pub async fn collect_text(mut stream: TextStream) -> Result<String, LlmError> {
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        text.push_str(&fragment?);
    }
    Ok(text)
}
