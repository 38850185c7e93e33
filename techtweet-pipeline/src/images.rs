//! Image resolution: headline image, then a random fallback, then nothing.
//!
//! Failures here never fail a run; they are logged and the post goes out
//! text-only.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rand::seq::SliceRandom;
use techtweet_http::{HttpClient, HttpError, RequestOpts};

use crate::stage::Stage;

/// Technology stock images used when a headline has no usable image.
pub const DEFAULT_FALLBACK_IMAGES: [&str; 5] = [
    "https://images.unsplash.com/photo-1518770660439-4636190af475?w=1200&h=630&fit=crop",
    "https://images.unsplash.com/photo-1555066931-4365d14bab8c?w=1200&h=630&fit=crop",
    "https://images.unsplash.com/photo-1517694712202-14dd9538aa97?w=1200&h=630&fit=crop",
    "https://images.unsplash.com/photo-1498050108023-c5249f4df085?w=1200&h=630&fit=crop",
    "https://images.unsplash.com/photo-1504639725590-34d0984388bd?w=1200&h=630&fit=crop",
];

const DEFAULT_MIME: &str = "image/jpeg";
const IMAGE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Bytes,
    pub mime: String,
    pub source_url: String,
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ImagePayload, HttpError>;
}

/// Plain GET of arbitrary image URLs.
pub struct HttpImageFetcher {
    http: HttpClient,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::detached()?.with_timeout(IMAGE_TIMEOUT),
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<ImagePayload, HttpError> {
        let got = self.http.get_bytes(url, RequestOpts::default()).await?;
        if got.bytes.is_empty() {
            return Err(HttpError::Decode("empty image body".into(), String::new()));
        }
        Ok(ImagePayload {
            mime: image_mime(got.content_type.as_deref()),
            bytes: got.bytes,
            source_url: url.to_string(),
        })
    }
}

/// `image/*` content types pass through (parameters stripped); anything else
/// is assumed to be JPEG.
pub fn image_mime(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| ct.starts_with("image/") && ct.len() > "image/".len())
        .unwrap_or_else(|| DEFAULT_MIME.to_string())
}

async fn try_fetch(fetcher: &dyn ImageFetcher, url: &str, which: &'static str) -> Option<ImagePayload> {
    match fetcher.fetch(url).await {
        Ok(img) => {
            tracing::debug!(which, url, bytes = img.bytes.len(), mime = %img.mime, "pipeline.image.fetched");
            Some(img)
        }
        Err(e) => {
            tracing::warn!(which, url, error = %e, "pipeline.image.fetch_failed");
            None
        }
    }
}

/// Headline image if it downloads; otherwise one uniformly chosen fallback;
/// otherwise no image.
pub async fn resolve_image(
    fetcher: &dyn ImageFetcher,
    headline_image: Option<&str>,
    fallbacks: &[String],
) -> Stage<Option<ImagePayload>> {
    if let Some(url) = headline_image {
        if let Some(img) = try_fetch(fetcher, url, "headline").await {
            return Stage::Ok(Some(img));
        }
    }

    let pick = fallbacks.choose(&mut rand::thread_rng()).cloned();
    let Some(url) = pick else {
        tracing::info!("pipeline.image.no_fallbacks");
        return Stage::Fallback(None);
    };
    let img = try_fetch(fetcher, &url, "fallback").await;
    if img.is_none() {
        tracing::info!("pipeline.image.none");
    }
    Stage::Fallback(img)
}
