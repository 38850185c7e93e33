use std::sync::Arc;

use techtweet_common::TriggerMode;
use techtweet_llm::traits::{CompletionRequest, LlmClient, LlmError};
use techtweet_news::HeadlineSource;
use techtweet_social::{SocialError, SocialPlatform};
use tracing::Instrument;

use crate::headlines::fetch_headline;
use crate::images::{resolve_image, ImageFetcher, DEFAULT_FALLBACK_IMAGES};
use crate::prompt::{build_prompt, PromptStyle};
use crate::publish::{publish_post, PublishOutcome};
use crate::stage::Stage;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("account verification failed: {0}")]
    Verification(SocialError),

    #[error("text generation failed: {0}")]
    Generation(LlmError),
}

impl PipelineError {
    /// Platform or provider code worth surfacing to callers.
    pub fn code(&self) -> Option<String> {
        match self {
            PipelineError::Verification(e) => e.code(),
            PipelineError::Generation(LlmError::Http(e)) => e.code(),
            PipelineError::Generation(_) => None,
        }
    }

    /// Collapse into the same shape a failed publish reports.
    pub fn into_outcome(self) -> PublishOutcome {
        let code = self.code();
        PublishOutcome::failed(self.to_string(), code)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub prompt_style: PromptStyle,
    pub cycle_days: u32,
    pub max_post_chars: usize,
    pub attach_images: bool,
    pub fallback_images: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            prompt_style: PromptStyle::Professional,
            cycle_days: 100,
            max_post_chars: 280,
            attach_images: true,
            fallback_images: DEFAULT_FALLBACK_IMAGES.iter().map(|s| s.to_string()).collect(),
            temperature: 0.7,
            max_tokens: 400,
        }
    }
}

/// One parameterized run: verify, fetch, prompt, generate, image, publish.
///
/// Collaborators are shared behind `Arc` so a scheduler tick and an HTTP
/// request can run the same pipeline concurrently.
#[derive(Clone)]
pub struct Pipeline {
    social: Arc<dyn SocialPlatform>,
    headlines: Option<Arc<dyn HeadlineSource>>,
    llm: Arc<dyn LlmClient>,
    images: Arc<dyn ImageFetcher>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        social: Arc<dyn SocialPlatform>,
        llm: Arc<dyn LlmClient>,
        images: Arc<dyn ImageFetcher>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            social,
            headlines: None,
            llm,
            images,
            settings,
        }
    }

    /// Without a headline source every run takes the canned prompt.
    pub fn with_headlines(mut self, source: Arc<dyn HeadlineSource>) -> Self {
        self.headlines = Some(source);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Verify the account. Used on its own by the scheduler before the first tick.
    pub async fn verify(&self) -> Result<(), PipelineError> {
        match self.social.verify_account().await {
            Ok(account) => {
                tracing::info!(
                    account_id = %account.id,
                    username = %account.username,
                    "pipeline.verify.ok"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, code = ?e.code(), "pipeline.verify.failed");
                Err(PipelineError::Verification(e))
            }
        }
    }

    /// Run once for `day`. Verification and generation failures short-circuit
    /// as `Err`; everything after generation lands in the returned outcome.
    pub async fn run(&self, day: u32, trigger: TriggerMode) -> Result<PublishOutcome, PipelineError> {
        let run_id = uuid::Uuid::new_v4().simple().to_string();
        let span = tracing::info_span!("pipeline.run", run_id = %run_id, day, trigger = %trigger);
        self.run_stages(day).instrument(span).await
    }

    async fn run_stages(&self, day: u32) -> Result<PublishOutcome, PipelineError> {
        let s = &self.settings;
        tracing::info!(cycle = s.cycle_days, "pipeline.run.start");

        self.verify().await?;

        let headline_stage = fetch_headline(self.headlines.as_deref()).await;
        tracing::debug!(stage = headline_stage.label(), "pipeline.stage.headline");
        let headline = headline_stage.into_value();

        let prompt = build_prompt(day, s.cycle_days, s.prompt_style, headline.as_ref());

        let request = CompletionRequest::single_user(prompt, s.temperature, s.max_tokens);
        let generated: Stage<String, LlmError> = self.llm.complete(&request).await.into();
        let message = match generated {
            Stage::Ok(text) | Stage::Fallback(text) => text,
            Stage::Err(e) => {
                tracing::error!(error = %e, model = %self.llm.model_name(), "pipeline.generate.failed");
                return Err(PipelineError::Generation(e));
            }
        };
        tracing::info!(chars = message.chars().count(), model = %self.llm.model_name(), "pipeline.generate.ok");

        let image = if s.attach_images {
            let headline_image = headline.as_ref().and_then(|h| h.image_url.as_deref());
            let stage = resolve_image(self.images.as_ref(), headline_image, &s.fallback_images).await;
            tracing::debug!(stage = stage.label(), "pipeline.stage.image");
            stage.into_value()
        } else {
            tracing::debug!("pipeline.image.disabled");
            None
        };

        let outcome = publish_post(self.social.as_ref(), &message, image, s.max_post_chars).await;
        tracing::info!(success = outcome.success, "pipeline.run.finished");
        Ok(outcome)
    }

    /// Like [`run`](Self::run) but always yields an outcome.
    pub async fn run_to_outcome(&self, day: u32, trigger: TriggerMode) -> PublishOutcome {
        match self.run(day, trigger).await {
            Ok(outcome) => outcome,
            Err(e) => e.into_outcome(),
        }
    }
}
