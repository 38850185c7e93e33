//! Thin wrapper around the X/Twitter endpoints a posting bot needs.
//!
//! Handles OAuth 1.0a signing and the credential presence check before
//! delegating to the shared HTTP client. The v1.1 media upload lives on a
//! separate host from the v2 API, so both bases are configurable.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use techtweet_http::{Auth, HttpClient, MultipartField, OAuth1Credentials, RequestOpts};

use crate::traits::{Account, MediaRef, PublishedPost, SocialError, SocialPlatform};
use crate::twitter::types::{
    CreateTweetRequest, CreateTweetResponse, MediaUploadResponse, TweetMedia, UserResponse,
};

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_UPLOAD_BASE: &str = "https://upload.twitter.com";

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct TwitterApi {
    api: HttpClient,
    upload: HttpClient,
    creds: OAuth1Credentials,
}

impl TwitterApi {
    pub fn new(creds: OAuth1Credentials) -> Result<Self, SocialError> {
        Self::with_endpoints(creds, DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE)
    }

    pub fn with_endpoints(
        creds: OAuth1Credentials,
        api_base: &str,
        upload_base: &str,
    ) -> Result<Self, SocialError> {
        let api = HttpClient::new(api_base)?;
        let upload = HttpClient::new(upload_base)?.with_timeout(UPLOAD_TIMEOUT);
        Ok(Self { api, upload, creds })
    }

    /// Blank credentials never reach the network; they read as an auth failure.
    fn auth(&self) -> Result<Auth<'_>, SocialError> {
        if let Some(field) = self.creds.first_missing() {
            return Err(SocialError::Unauthorized {
                message: format!("missing credential: twitter.{field}"),
                code: None,
            });
        }
        Ok(Auth::OAuth1(&self.creds))
    }

    /// `GET 2/users/me`
    pub async fn verify_credentials(&self) -> Result<Account, SocialError> {
        let auth = self.auth()?;
        let resp: UserResponse = self
            .api
            .get_json(
                "2/users/me",
                RequestOpts {
                    auth: Some(auth),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(user_id = %resp.data.id, username = %resp.data.username, "twitter.verify.ok");
        Ok(Account {
            id: resp.data.id,
            username: resp.data.username,
            name: resp.data.name,
        })
    }

    /// Multipart `POST 1.1/media/upload.json` with a single `media` part.
    pub async fn upload_image(&self, bytes: Bytes, mime: &str) -> Result<MediaRef, SocialError> {
        let auth = self.auth()?;
        let size = bytes.len();
        let ext = mime.strip_prefix("image/").unwrap_or("jpg");
        let field = MultipartField::file("media", bytes, mime).with_file_name(format!("media.{ext}"));

        let resp: MediaUploadResponse = self
            .upload
            .post_multipart(
                "1.1/media/upload.json",
                vec![field],
                RequestOpts {
                    auth: Some(auth),
                    ..Default::default()
                },
            )
            .await?;

        if resp.media_id_string.trim().is_empty() {
            return Err(SocialError::Decode("upload returned an empty media id".into()));
        }
        tracing::debug!(media_id = %resp.media_id_string, size, mime, "twitter.media.uploaded");
        Ok(MediaRef(resp.media_id_string))
    }

    /// `POST 2/tweets` with optional media ids.
    pub async fn create_tweet(
        &self,
        text: &str,
        media: &[MediaRef],
    ) -> Result<PublishedPost, SocialError> {
        let auth = self.auth()?;
        let body = CreateTweetRequest {
            text: text.to_string(),
            media: (!media.is_empty()).then(|| TweetMedia {
                media_ids: media.iter().map(|m| m.0.clone()).collect(),
            }),
        };

        let resp: CreateTweetResponse = self
            .api
            .post_json(
                "2/tweets",
                &body,
                RequestOpts {
                    auth: Some(auth),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(post_id = %resp.data.id, media = media.len(), "twitter.tweet.created");
        Ok(PublishedPost {
            id: resp.data.id,
            text: resp.data.text,
        })
    }
}

#[async_trait]
impl SocialPlatform for TwitterApi {
    async fn verify_account(&self) -> Result<Account, SocialError> {
        self.verify_credentials().await
    }

    async fn upload_media(&self, bytes: Bytes, mime: &str) -> Result<MediaRef, SocialError> {
        self.upload_image(bytes, mime).await
    }

    async fn publish(&self, text: &str, media: &[MediaRef]) -> Result<PublishedPost, SocialError> {
        self.create_tweet(text, media).await
    }
}
