//! In-memory collaborators for exercising the triggers without a network.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use techtweet_http::HttpError;
use techtweet_llm::traits::{CompletionRequest, LlmClient, LlmError, TextStream};
use techtweet_pipeline::{ImageFetcher, ImagePayload, Pipeline, PipelineSettings};
use techtweet_social::{Account, MediaRef, PublishedPost, SocialError, SocialPlatform};
use tokio::sync::oneshot;

pub struct FakeSocial {
    pub authorized: bool,
}

#[async_trait]
impl SocialPlatform for FakeSocial {
    async fn verify_account(&self) -> Result<Account, SocialError> {
        if self.authorized {
            Ok(Account {
                id: "7".into(),
                username: "bot".into(),
                name: None,
            })
        } else {
            Err(SocialError::Unauthorized {
                message: "Invalid or expired token.".into(),
                code: Some("89".into()),
            })
        }
    }

    async fn upload_media(&self, _: Bytes, _: &str) -> Result<MediaRef, SocialError> {
        Ok(MediaRef("m".into()))
    }

    async fn publish(&self, text: &str, _: &[MediaRef]) -> Result<PublishedPost, SocialError> {
        Ok(PublishedPost {
            id: "99".into(),
            text: text.to_string(),
        })
    }
}

/// Replies "Hello devs" and counts calls. Can fire a one-shot signal from
/// inside the first generation, which stands in for Ctrl-C mid-run.
#[derive(Default)]
pub struct FakeLlm {
    calls: AtomicUsize,
    on_first_call: Mutex<Option<oneshot::Sender<()>>>,
}

impl FakeLlm {
    pub fn signalling(tx: oneshot::Sender<()>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            on_first_call: Mutex::new(Some(tx)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn stream_chat(&self, _: &CompletionRequest) -> Result<TextStream, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = self.on_first_call.lock().unwrap().take() {
            let _ = tx.send(());
        }
        Ok(Box::pin(stream::iter(vec![Ok("Hello ".to_string()), Ok("devs".to_string())])))
    }

    fn model_name(&self) -> &str {
        "test"
    }
}

pub struct NoImages;

#[async_trait]
impl ImageFetcher for NoImages {
    async fn fetch(&self, _: &str) -> Result<ImagePayload, HttpError> {
        Err(HttpError::Decode("empty image body".into(), String::new()))
    }
}

pub fn pipeline(authorized: bool, llm: Arc<FakeLlm>) -> Pipeline {
    Pipeline::new(
        Arc::new(FakeSocial { authorized }),
        llm,
        Arc::new(NoImages),
        PipelineSettings::default(),
    )
}
