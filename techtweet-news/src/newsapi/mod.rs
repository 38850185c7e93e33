//! NewsAPI.org integration: `GET v2/top-headlines` with `X-Api-Key` auth.
pub mod client;
pub mod types;

pub use client::{HeadlineQuery, NewsApiClient};
