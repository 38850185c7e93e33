//! Headline discovery for techtweet.
//!
//! - [`HeadlineSource`]: the seam the pipeline pulls a batch of headlines from
//! - [`newsapi`]: NewsAPI.org `top-headlines` client
//!
//! Headlines without a usable title (missing, blank, or the `[Removed]`
//! tombstone NewsAPI substitutes for retracted articles) never leave this crate.

pub mod newsapi;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use techtweet_http::HttpError;

/// One candidate topic for a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(thiserror::Error, Debug)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("news API error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Where headline batches come from.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Fetch the current batch. May be empty.
    async fn top_headlines(&self) -> Result<Vec<Headline>, NewsError>;
}

/// Titles NewsAPI uses for retracted articles.
const REMOVED_TITLE: &str = "[Removed]";

pub(crate) fn usable_title(title: Option<&str>) -> Option<&str> {
    let t = title?.trim();
    (!t.is_empty() && t != REMOVED_TITLE).then_some(t)
}
