use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use techtweet_common::require_credential;
use techtweet_http::{Auth, HttpClient, RequestOpts};
use techtweet_http::header::{HeaderName, HeaderValue};

use super::types::{Article, TopHeadlinesResponse};
use crate::{Headline, HeadlineSource, NewsError, usable_title};

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org";

/// Which slice of top headlines to ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineQuery {
    pub category: String,
    pub language: String,
    pub page_size: u32,
}

impl Default for HeadlineQuery {
    fn default() -> Self {
        Self {
            category: "technology".to_string(),
            language: "en".to_string(),
            page_size: 5,
        }
    }
}

/// Minimal client for NewsAPI.org (`top-headlines` only).
#[derive(Clone)]
pub struct NewsApiClient {
    http: HttpClient,
    api_key: String,
    query: HeadlineQuery,
}

impl NewsApiClient {
    pub fn new(api_key: String, query: HeadlineQuery) -> Result<Self, NewsError> {
        Self::with_endpoint(api_key, query, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(
        api_key: String,
        query: HeadlineQuery,
        endpoint: &str,
    ) -> Result<Self, NewsError> {
        let http = HttpClient::new(endpoint)?;
        Ok(Self {
            http,
            api_key,
            query,
        })
    }

    pub async fn fetch(&self) -> Result<Vec<Headline>, NewsError> {
        let key = require_credential("news.api_key", &self.api_key)
            .map_err(|e| NewsError::Config(e.to_string()))?;
        let value = HeaderValue::from_str(key)
            .map_err(|e| NewsError::Config(format!("news.api_key is not a valid header: {e}")))?;

        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("category", self.query.category.as_str().into()),
            ("language", self.query.language.as_str().into()),
            ("pageSize", self.query.page_size.to_string().into()),
        ];

        let resp: TopHeadlinesResponse = self
            .http
            .get_json(
                "v2/top-headlines",
                RequestOpts {
                    auth: Some(Auth::Header {
                        name: HeaderName::from_static("x-api-key"),
                        value,
                    }),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        if resp.status != "ok" {
            let code = resp.code.unwrap_or_else(|| resp.status.clone());
            let message = resp.message.unwrap_or_default();
            return Err(NewsError::Upstream(format!("{code}: {message}")));
        }

        let fetched = resp.articles.len();
        let headlines: Vec<Headline> = resp.articles.into_iter().filter_map(to_headline).collect();
        tracing::debug!(
            target: "news.newsapi",
            fetched,
            usable = headlines.len(),
            total_results = ?resp.total_results,
            "newsapi.top_headlines"
        );
        Ok(headlines)
    }
}

fn to_headline(article: Article) -> Option<Headline> {
    let title = usable_title(article.title.as_deref())?.to_string();
    let image_url = article
        .url_to_image
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    let published_at = article
        .published_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc));
    Some(Headline {
        title,
        image_url,
        published_at,
    })
}

#[async_trait]
impl HeadlineSource for NewsApiClient {
    async fn top_headlines(&self) -> Result<Vec<Headline>, NewsError> {
        self.fetch().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: Option<&str>, image: Option<&str>, at: Option<&str>) -> Article {
        Article {
            source: None,
            author: None,
            title: title.map(str::to_string),
            description: None,
            url: None,
            url_to_image: image.map(str::to_string),
            published_at: at.map(str::to_string),
        }
    }

    #[test]
    fn maps_article_fields() {
        let h = to_headline(article(
            Some("Chipmaker unveils 2nm process"),
            Some("https://cdn.example.com/chip.jpg"),
            Some("2024-05-01T09:30:00Z"),
        ))
        .unwrap();
        assert_eq!(h.title, "Chipmaker unveils 2nm process");
        assert_eq!(h.image_url.as_deref(), Some("https://cdn.example.com/chip.jpg"));
        assert_eq!(
            h.published_at.unwrap().to_rfc3339(),
            "2024-05-01T09:30:00+00:00"
        );
    }

    #[test]
    fn bad_timestamp_and_blank_image_are_dropped() {
        let h = to_headline(article(Some("t"), Some(" "), Some("yesterday"))).unwrap();
        assert_eq!(h.image_url, None);
        assert_eq!(h.published_at, None);
    }

    #[test]
    fn removed_articles_are_skipped() {
        assert!(to_headline(article(Some("[Removed]"), None, None)).is_none());
        assert!(to_headline(article(None, None, None)).is_none());
    }
}
