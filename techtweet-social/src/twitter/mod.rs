//! Twitter/X API integration surface exposed to the pipeline.
//!
//! All calls use OAuth 1.0a user context: `GET 2/users/me` to verify the
//! session, the v1.1 multipart media upload, and `POST 2/tweets`.
pub mod client;
pub mod types;

pub use client::TwitterApi;
