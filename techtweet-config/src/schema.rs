//! Strongly typed view of `techtweet.yaml`.
//!
//! Every section has defaults, so a file only needs to name what it changes.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use techtweet_common::observability::LogFormat;

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechtweetConfig {
    pub twitter: TwitterConfig,
    pub llm: LlmConfig,
    pub news: NewsConfig,
    pub pipeline: PipelineConfig,
    pub schedule: ScheduleConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// OAuth 1.0a user-context credentials plus API hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub app_key: String,
    pub app_secret: String,
    pub access_token: String,
    pub access_secret: String,
    pub api_base: String,
    pub upload_base: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            access_token: String::new(),
            access_secret: String::new(),
            api_base: "https://api.twitter.com".into(),
            upload_base: "https://upload.twitter.com".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Groq,
    OpenAi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Base URL of the OpenAI-compatible API; blank means the provider default.
    pub endpoint: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Groq,
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".into(),
            temperature: 0.7,
            max_tokens: 400,
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// `false` gives the prompt-only bot: every run takes the fallback prompt.
    pub enabled: bool,
    pub api_key: String,
    pub category: String,
    pub language: String,
    pub page_size: u32,
    pub endpoint: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            category: "technology".into(),
            language: "en".into(),
            page_size: 5,
            endpoint: "https://newsapi.org".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyleKind {
    #[default]
    Professional,
    Engaging,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub prompt_style: PromptStyleKind,
    pub cycle_days: u32,
    pub max_post_chars: usize,
    pub attach_images: bool,
    /// Empty means the built-in list.
    pub fallback_images: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            prompt_style: PromptStyleKind::Professional,
            cycle_days: 100,
            max_post_chars: 280,
            attach_images: true,
            fallback_images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    /// Explicit counter owned by the scheduler loop; resets on restart.
    #[default]
    Sequence,
    /// Derived from wall-clock days since the epoch.
    Clock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Five-field cron expression, local time.
    pub cron: String,
    pub run_on_start: bool,
    pub total_days: u32,
    pub counter: CounterKind,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: "0 9 * * *".into(),
            run_on_start: true,
            total_days: 100,
            counter: CounterKind::Sequence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub dir: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: true,
            dir: None,
            filter: "info".into(),
        }
    }
}

impl TechtweetConfig {
    /// Sanity checks that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.pipeline.cycle_days == 0 {
            return Err("pipeline.cycle_days must be at least 1".into());
        }
        if self.pipeline.max_post_chars < 4 {
            return Err("pipeline.max_post_chars must leave room for an ellipsis".into());
        }
        if self.schedule.total_days == 0 {
            return Err("schedule.total_days must be at least 1".into());
        }
        if !(1..=100).contains(&self.news.page_size) {
            return Err("news.page_size must be between 1 and 100".into());
        }
        let fields = self.schedule.cron.split_whitespace().count();
        if fields != 5 {
            return Err(format!(
                "schedule.cron must have five fields, got {fields}: {:?}",
                self.schedule.cron
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err("llm.temperature must be between 0 and 2".into());
        }
        Ok(())
    }

    /// A copy with every non-blank secret replaced, safe to print or log.
    pub fn redacted(&self) -> Self {
        fn hide(s: &mut String) {
            if !s.trim().is_empty() {
                *s = REDACTED.to_string();
            }
        }
        let mut out = self.clone();
        hide(&mut out.twitter.app_key);
        hide(&mut out.twitter.app_secret);
        hide(&mut out.twitter.access_token);
        hide(&mut out.twitter.access_secret);
        hide(&mut out.llm.api_key);
        hide(&mut out.news.api_key);
        out
    }

    /// Names of required secrets that resolved to blank values.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let checks = [
            ("twitter.app_key", &self.twitter.app_key),
            ("twitter.app_secret", &self.twitter.app_secret),
            ("twitter.access_token", &self.twitter.access_token),
            ("twitter.access_secret", &self.twitter.access_secret),
            ("llm.api_key", &self.llm.api_key),
        ];
        for (name, value) in checks {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        if self.news.enabled && self.news.api_key.trim().is_empty() {
            missing.push("news.api_key");
        }
        missing
    }
}
