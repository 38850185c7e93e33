use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use techtweet_http::HttpError;

/// The account a set of credentials posts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Opaque media id returned by an upload, attached to a later post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef(pub String);

impl MediaRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: String,
    pub text: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SocialError {
    #[error("unauthorized: {message}")]
    Unauthorized {
        message: String,
        code: Option<String>,
    },

    #[error("platform error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(HttpError),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl SocialError {
    /// Platform error code when one is known, else the HTTP status.
    pub fn code(&self) -> Option<String> {
        match self {
            SocialError::Unauthorized { code, .. } => code.clone(),
            SocialError::Api { status, code, .. } => {
                Some(code.clone().unwrap_or_else(|| status.to_string()))
            }
            SocialError::Http(e) => e.code(),
            SocialError::Decode(_) => None,
        }
    }
}

impl From<HttpError> for SocialError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Api {
                status,
                message,
                code,
                ..
            } => {
                let code = code.or_else(|| Some(status.as_u16().to_string()));
                if status.as_u16() == 401 || status.as_u16() == 403 {
                    SocialError::Unauthorized { message, code }
                } else {
                    SocialError::Api {
                        status: status.as_u16(),
                        code,
                        message,
                    }
                }
            }
            HttpError::Decode(msg, snippet) => {
                SocialError::Decode(format!("{msg}, body_snippet: {snippet}"))
            }
            other => SocialError::Http(other),
        }
    }
}

/// The three platform calls a posting run needs.
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Confirm the credentials are valid and identify the posting account.
    async fn verify_account(&self) -> Result<Account, SocialError>;

    /// Upload one image and return its media reference.
    async fn upload_media(&self, bytes: Bytes, mime: &str) -> Result<MediaRef, SocialError>;

    /// Publish `text`, attaching `media` when present.
    async fn publish(&self, text: &str, media: &[MediaRef]) -> Result<PublishedPost, SocialError>;
}
