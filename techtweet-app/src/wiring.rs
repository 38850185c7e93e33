use anyhow::{Context, Result};
use std::sync::Arc;
use techtweet_common::observability::LogConfig;
use techtweet_config::{
    LlmConfig, LoggingConfig, NewsConfig, PipelineConfig, PromptStyleKind, ProviderKind,
    TechtweetConfig, TwitterConfig,
};
use techtweet_http::OAuth1Credentials;
use techtweet_llm::{Provider, openai::OpenAiCompatClient, traits::LlmClient};
use techtweet_news::{
    HeadlineSource,
    newsapi::{HeadlineQuery, NewsApiClient},
};
use techtweet_pipeline::{
    DEFAULT_FALLBACK_IMAGES, HttpImageFetcher, Pipeline, PipelineSettings, PromptStyle,
};
use techtweet_social::{SocialPlatform, twitter::TwitterApi};

/// Assemble the pipeline and every client it talks to.
pub fn build_pipeline(cfg: &TechtweetConfig) -> Result<Pipeline> {
    let missing = cfg.missing_secrets();
    if !missing.is_empty() {
        tracing::warn!(missing = ?missing, "config.secrets.missing");
    }

    let social = build_social(&cfg.twitter)?;
    let llm = build_llm_client(&cfg.llm)?;
    let images = Arc::new(HttpImageFetcher::new().context("building image fetcher")?);

    let pipeline = Pipeline::new(
        social,
        llm,
        images,
        pipeline_settings(&cfg.pipeline, &cfg.llm),
    );
    Ok(match build_headlines(&cfg.news)? {
        Some(source) => pipeline.with_headlines(source),
        None => pipeline,
    })
}

pub fn build_social(cfg: &TwitterConfig) -> Result<Arc<dyn SocialPlatform>> {
    let creds = OAuth1Credentials::new(
        cfg.app_key.clone(),
        cfg.app_secret.clone(),
        cfg.access_token.clone(),
        cfg.access_secret.clone(),
    );
    let client = TwitterApi::with_endpoints(creds, &cfg.api_base, &cfg.upload_base)
        .context("building X client")?;
    Ok(Arc::new(client))
}

pub fn build_llm_client(cfg: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let provider = match cfg.provider {
        ProviderKind::Groq => Provider::Groq,
        ProviderKind::OpenAi => Provider::OpenAi,
    };
    let model = if cfg.model.trim().is_empty() {
        provider.default_model().to_string()
    } else {
        cfg.model.clone()
    };
    let client = OpenAiCompatClient::new(
        provider,
        cfg.api_key.clone(),
        model,
        cfg.endpoint.as_deref(),
    )
    .context("building completion client")?;
    Ok(Arc::new(client))
}

pub fn build_headlines(cfg: &NewsConfig) -> Result<Option<Arc<dyn HeadlineSource>>> {
    if !cfg.enabled {
        tracing::info!("news.disabled");
        return Ok(None);
    }
    let query = HeadlineQuery {
        category: cfg.category.clone(),
        language: cfg.language.clone(),
        page_size: cfg.page_size,
    };
    let client = NewsApiClient::with_endpoint(cfg.api_key.clone(), query, &cfg.endpoint)
        .context("building NewsAPI client")?;
    Ok(Some(Arc::new(client)))
}

pub fn pipeline_settings(cfg: &PipelineConfig, llm: &LlmConfig) -> PipelineSettings {
    let fallback_images = if cfg.fallback_images.is_empty() {
        DEFAULT_FALLBACK_IMAGES.iter().map(|s| s.to_string()).collect()
    } else {
        cfg.fallback_images.clone()
    };
    PipelineSettings {
        prompt_style: match cfg.prompt_style {
            PromptStyleKind::Professional => PromptStyle::Professional,
            PromptStyleKind::Engaging => PromptStyle::Engaging,
        },
        cycle_days: cfg.cycle_days,
        max_post_chars: cfg.max_post_chars,
        attach_images: cfg.attach_images,
        fallback_images,
        temperature: llm.temperature,
        max_tokens: llm.max_tokens,
    }
}

pub fn log_config(cfg: &LoggingConfig) -> LogConfig {
    LogConfig {
        log_dir: cfg.dir.clone(),
        emit_stderr: cfg.emit_stderr,
        format: cfg.format,
        default_filter: cfg.filter.clone(),
        ..LogConfig::default()
    }
}
