//! Streaming LLM integration for techtweet.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and one concrete
//! implementation, [`openai::OpenAiCompatClient`], which speaks the
//! OpenAI-compatible `chat/completions` streaming protocol used by Groq and
//! OpenAI alike. Responses are decoded from server-sent events into a lazy
//! fragment stream ([`traits::TextStream`]) and folded by
//! [`traits::LlmClient::complete`].
//!
//! # Examples
//! ```no_run
//! use techtweet_llm::openai::OpenAiCompatClient;
//! use techtweet_llm::traits::{CompletionRequest, LlmClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), techtweet_llm::traits::LlmError> {
//! let client = OpenAiCompatClient::groq(std::env::var("GROQ_API_KEY").unwrap_or_default())?;
//! let text = client
//!     .complete(&CompletionRequest::single_user("Say OK", 0.7, 16))
//!     .await?;
//! assert!(!text.is_empty());
//! # Ok(())
//! # }
//! ```
pub mod openai;
pub mod sse;
pub mod traits;

use serde::{Deserialize, Serialize};

/// Default model recommendations per provider
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1/";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

/// Which OpenAI-compatible host to talk to when no endpoint is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Groq,
    OpenAi,
}

impl Provider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Groq => GROQ_API_BASE,
            Provider::OpenAi => OPENAI_API_BASE,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => DEFAULT_GROQ_MODEL,
            Provider::OpenAi => DEFAULT_OPENAI_MODEL,
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = traits::LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Provider::Groq),
            "openai" => Ok(Provider::OpenAi),
            other => Err(traits::LlmError::Config(format!(
                "unknown LLM provider: {other}"
            ))),
        }
    }
}
